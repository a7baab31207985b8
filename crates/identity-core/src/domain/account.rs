// ============================================================================
// Identity Core - Account Entity
// File: crates/identity-core/src/domain/account.rs
// Description: Identity user extended with personal profile fields
// ============================================================================

use chrono::NaiveDate;
use identity_shared::constants::{BIRTHDAY_DISPLAY_FORMAT, BIRTHDAY_ISO_FORMAT};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::identity_user::IdentityUser;
use super::validation::{violations_from, FieldViolation, ValidationRule};

/// Registered end user. The identity fields are embedded, the four profile
/// fields are declared here.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct Account {
    #[serde(flatten)]
    pub identity: IdentityUser,

    #[validate(length(max = 30))]
    pub first_name: Option<String>,

    #[validate(length(max = 50))]
    pub last_name: Option<String>,

    /// Personal data
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,

    /// Personal data
    pub birthday: Option<NaiveDate>,
}

/// One exported personal data value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalDataEntry {
    pub key: String,
    pub value: String,
}

impl PersonalDataEntry {
    fn new(key: &str, value: Option<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.unwrap_or_else(|| "null".to_string()),
        }
    }
}

impl Account {
    pub fn new(email: &str) -> Self {
        Self {
            identity: IdentityUser::new(email),
            first_name: None,
            last_name: None,
            phone_number: None,
            birthday: None,
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.identity.id
    }

    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            _ => self.identity.user_name.clone(),
        }
    }

    /// Birthday as `dd/MM/yyyy`.
    pub fn birthday_display(&self) -> Option<String> {
        self.birthday
            .map(|d| d.format(BIRTHDAY_DISPLAY_FORMAT).to_string())
    }

    /// Values flagged as personal data, in export order. Profile names are
    /// not personal data; the phone number and birthday are.
    pub fn personal_data(&self) -> Vec<PersonalDataEntry> {
        let identity = &self.identity;
        vec![
            PersonalDataEntry::new("Id", Some(identity.id.to_string())),
            PersonalDataEntry::new("UserName", Some(identity.user_name.clone())),
            PersonalDataEntry::new("Email", Some(identity.email.clone())),
            PersonalDataEntry::new("EmailConfirmed", Some(identity.email_confirmed.to_string())),
            PersonalDataEntry::new("PhoneNumber", self.phone_number.clone()),
            PersonalDataEntry::new(
                "PhoneNumberConfirmed",
                Some(identity.phone_number_confirmed.to_string()),
            ),
            PersonalDataEntry::new("TwoFactorEnabled", Some(identity.two_factor_enabled.to_string())),
            PersonalDataEntry::new("Birthday", self.birthday_display()),
        ]
    }
}

/// Parses a birthday typed as `dd/MM/yyyy` or `yyyy-MM-dd`. Blank is `None`.
pub fn parse_birthday(input: &str) -> Result<Option<NaiveDate>, FieldViolation> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, BIRTHDAY_DISPLAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, BIRTHDAY_ISO_FORMAT))
        .map(Some)
        .map_err(|_| {
            FieldViolation::new(
                "birthday",
                ValidationRule::InvalidDate,
                format!("The value '{}' is not valid for Birthday.", input),
            )
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Profile fields a signed-in user can edit, as typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    /// `dd/MM/yyyy` or `yyyy-MM-dd`
    pub birthday: Option<String>,
}

impl ProfileUpdate {
    /// Copies the fields onto the account. An unreadable birthday leaves the
    /// stored one untouched and is returned as a violation.
    pub fn apply_to(self, account: &mut Account) -> Vec<FieldViolation> {
        account.first_name = non_blank(self.first_name);
        account.last_name = non_blank(self.last_name);
        account.phone_number = non_blank(self.phone_number);

        match self.birthday.as_deref().map(parse_birthday).transpose() {
            Ok(birthday) => {
                account.birthday = birthday.flatten();
                Vec::new()
            }
            Err(violation) => vec![violation],
        }
    }
}

/// Registration form input.
#[derive(Clone, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "The Email field is not a valid e-mail address."))]
    pub email: String,

    #[validate(length(
        min = 6,
        max = 100,
        message = "The Password must be at least 6 and at max 100 characters long."
    ))]
    pub password: String,

    pub confirm_password: String,

    pub profile: ProfileUpdate,
}

impl RegisterInput {
    /// Form-level violations: required email, email shape, password length
    /// and password confirmation. Profile bounds are checked on the account.
    pub fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => violations_from(&errors),
        };

        if self.email.trim().is_empty() {
            violations.retain(|v| v.field != "Email");
            violations.push(FieldViolation::new(
                "email",
                ValidationRule::Required,
                "The Email field is required.",
            ));
        }
        if self.password != self.confirm_password {
            violations.push(FieldViolation::new(
                "confirm_password",
                ValidationRule::MustMatch { other: "Password".to_string() },
                "The password and confirmation password do not match.",
            ));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validate_account;

    fn account() -> Account {
        Account::new("ana.silva@example.com")
    }

    #[test]
    fn test_bounds_accept_values_at_limit() {
        let mut a = account();
        a.first_name = Some("a".repeat(30));
        a.last_name = Some("b".repeat(50));
        a.phone_number = Some("1".repeat(20));
        assert!(validate_account(&a).is_ok());
    }

    #[test]
    fn test_bounds_reject_values_over_limit() {
        let mut a = account();
        a.first_name = Some("a".repeat(31));
        a.phone_number = Some("1".repeat(21));
        let violations = validate_account(&a).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "FirstName");
        assert_eq!(violations[0].rule, ValidationRule::MaxLength { max: 30 });
        assert_eq!(violations[1].field, "PhoneNumber");
        assert_eq!(violations[1].rule, ValidationRule::MaxLength { max: 20 });
    }

    #[test]
    fn test_last_name_of_51_chars_is_length_exceeded() {
        let mut a = account();
        a.last_name = Some("x".repeat(51));
        let violations = validate_account(&a).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "LastName");
        assert_eq!(violations[0].rule, ValidationRule::MaxLength { max: 50 });
        assert!(violations[0].message.contains("maximum length of 50"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut a = account();
        a.first_name = Some("é".repeat(30));
        assert!(validate_account(&a).is_ok());
    }

    #[test]
    fn test_birthday_display_and_parse() {
        let mut a = account();
        a.birthday = Some(NaiveDate::from_ymd_opt(1990, 5, 12).unwrap());
        assert_eq!(a.birthday_display().as_deref(), Some("12/05/1990"));

        assert_eq!(parse_birthday("12/05/1990").unwrap(), a.birthday);
        assert_eq!(parse_birthday("1990-05-12").unwrap(), a.birthday);
        assert_eq!(parse_birthday("  ").unwrap(), None);
        let err = parse_birthday("31/02/1990").unwrap_err();
        assert_eq!(err.field, "Birthday");
        assert_eq!(err.rule, ValidationRule::InvalidDate);
    }

    #[test]
    fn test_personal_data_includes_phone_and_birthday() {
        let mut a = account();
        a.first_name = Some("Ana".to_string());
        a.last_name = Some("Silva".to_string());
        a.phone_number = Some("+351912345678".to_string());
        a.birthday = Some(NaiveDate::from_ymd_opt(1990, 5, 12).unwrap());

        let data = a.personal_data();
        let value = |key: &str| data.iter().find(|e| e.key == key).map(|e| e.value.clone());
        assert_eq!(value("PhoneNumber").as_deref(), Some("+351912345678"));
        assert_eq!(value("Birthday").as_deref(), Some("12/05/1990"));
        assert_eq!(value("Id"), Some(a.id().to_string()));
        assert!(value("FirstName").is_none());
        assert!(value("LastName").is_none());
    }

    #[test]
    fn test_personal_data_renders_null() {
        let data = account().personal_data();
        let phone = data.iter().find(|e| e.key == "PhoneNumber").unwrap();
        assert_eq!(phone.value, "null");
    }

    #[test]
    fn test_profile_update_blanks_become_none() {
        let mut a = account();
        a.first_name = Some("Ana".to_string());
        ProfileUpdate {
            first_name: Some("  ".to_string()),
            last_name: Some(" Silva ".to_string()),
            phone_number: None,
            birthday: None,
        }
        .apply_to(&mut a);
        assert_eq!(a.first_name, None);
        assert_eq!(a.last_name.as_deref(), Some("Silva"));
    }

    #[test]
    fn test_profile_update_parses_typed_birthday() {
        let mut a = account();
        let violations = ProfileUpdate {
            birthday: Some("12/05/1990".to_string()),
            ..ProfileUpdate::default()
        }
        .apply_to(&mut a);
        assert!(violations.is_empty());
        assert_eq!(a.birthday, NaiveDate::from_ymd_opt(1990, 5, 12));
    }

    #[test]
    fn test_profile_update_reports_bad_birthday() {
        let mut a = account();
        a.birthday = NaiveDate::from_ymd_opt(1990, 5, 12);
        let violations = ProfileUpdate {
            birthday: Some("1990/13/45".to_string()),
            ..ProfileUpdate::default()
        }
        .apply_to(&mut a);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "Birthday");
        assert_eq!(a.birthday, NaiveDate::from_ymd_opt(1990, 5, 12));
    }

    #[test]
    fn test_register_input_violations() {
        let input = RegisterInput {
            email: "not-an-email".to_string(),
            password: "Ana#1".to_string(),
            confirm_password: "Ana#2".to_string(),
            profile: ProfileUpdate::default(),
        };
        let fields: Vec<String> = input.violations().into_iter().map(|v| v.field).collect();
        assert!(fields.contains(&"Email".to_string()));
        assert!(fields.contains(&"Password".to_string()));
        assert!(fields.contains(&"ConfirmPassword".to_string()));
    }

    #[test]
    fn test_register_input_requires_email() {
        let input = RegisterInput {
            email: String::new(),
            password: "Ana#1990".to_string(),
            confirm_password: "Ana#1990".to_string(),
            profile: ProfileUpdate::default(),
        };
        let violations = input.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, ValidationRule::Required);
    }
}
