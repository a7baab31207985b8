// ============================================================================
// Identity Core - Account Service
// File: crates/identity-core/src/services/account_service.rs
// ============================================================================
//! Registration, email confirmation, sign-in, profile management and
//! personal data handling for accounts.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use identity_security::{PasswordPolicy, PasswordPolicyViolation, PasswordService, TokenPurpose, TokenService};
use identity_shared::constants::{DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_FAILED_ACCESS_ATTEMPTS};
use identity_shared::utils::{mask_email, normalize_key};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::{
    validate_account, Account, ExternalLogin, FieldViolation, PersonalDataEntry, ProfileUpdate,
    RegisterInput, Role, ValidationRule,
};
use crate::error::DomainError;
use crate::repositories::{AccountRepository, RoleRepository};

/// Sign-in and lockout behaviour of the identity layer.
#[derive(Debug, Clone)]
pub struct IdentityOptions {
    pub require_confirmed_account: bool,
    pub max_failed_access_attempts: i32,
    pub lockout: Duration,
    pub password: PasswordPolicy,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            require_confirmed_account: true,
            max_failed_access_attempts: DEFAULT_MAX_FAILED_ACCESS_ATTEMPTS,
            lockout: Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
            password: PasswordPolicy::default(),
        }
    }
}

/// Account service bound to an account store and a role store
pub struct AccountService<A: AccountRepository + ?Sized, R: RoleRepository + ?Sized> {
    accounts: Arc<A>,
    roles: Arc<R>,
    tokens: TokenService,
    options: IdentityOptions,
}

impl<A: AccountRepository + ?Sized, R: RoleRepository + ?Sized> AccountService<A, R> {
    pub fn new(accounts: Arc<A>, roles: Arc<R>, tokens: TokenService, options: IdentityOptions) -> Self {
        Self {
            accounts,
            roles,
            tokens,
            options,
        }
    }

    /// Register a new account with a password
    pub async fn register(&self, input: RegisterInput) -> Result<RegisterResult, DomainError> {
        info!("Registration attempt for email: {}", mask_email(&input.email));

        // 1. Form, password policy and profile bounds
        let mut violations = input.violations();
        violations.extend(password_violations(&self.options.password, &input.password));

        let mut account = Account::new(&input.email);
        violations.extend(input.profile.apply_to(&mut account));
        if let Err(profile_violations) = validate_account(&account) {
            violations.extend(profile_violations);
        }
        if !violations.is_empty() {
            warn!("Registration failed: {} validation error(s)", violations.len());
            return Err(DomainError::Validation(violations));
        }

        // 2. User name and email must be free
        self.ensure_unique(&account).await?;

        // 3. Hash password
        let password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        account.identity.password_hash = Some(password_hash);

        // 4. Save and issue the confirmation code
        let created = self.accounts.create(&account).await?;
        let confirmation_code = self.confirmation_code(&created)?;

        info!("User created a new account with password: {}", created.id());

        Ok(RegisterResult {
            account: AccountProfile::from(&created),
            confirmation_code,
            requires_confirmation: self.options.require_confirmed_account,
        })
    }

    /// First external login creates a confirmed, password-less account linked
    /// to the provider key. Later calls return the linked account.
    pub async fn register_external(
        &self,
        login_provider: &str,
        provider_key: &str,
        email: &str,
    ) -> Result<AccountProfile, DomainError> {
        info!("External registration via {} for email: {}", login_provider, mask_email(email));

        if let Some(existing) = self.accounts.find_by_login(login_provider, provider_key).await? {
            return Ok(AccountProfile::from(&existing));
        }

        let email = email.trim().to_string();
        if !email.validate_email() {
            return Err(DomainError::Validation(vec![FieldViolation::new(
                "email",
                ValidationRule::Email,
                "The Email field is not a valid e-mail address.",
            )]));
        }

        let mut account = Account::new(&email);
        account.identity.email_confirmed = true;
        self.ensure_unique(&account).await?;

        let created = self.accounts.create(&account).await?;
        self.accounts
            .add_login(&ExternalLogin::new(login_provider, provider_key, created.id()))
            .await?;

        info!("User created an account using {} provider: {}", login_provider, created.id());
        Ok(AccountProfile::from(&created))
    }

    /// Confirm email with the code issued at registration
    pub async fn confirm_email(&self, user_id: &Uuid, code: &str) -> Result<(), DomainError> {
        let mut account = self.find(user_id).await?;

        let claims = self
            .tokens
            .validate_token(code, TokenPurpose::EmailConfirmation)
            .map_err(|e| DomainError::InvalidToken(e.to_string()))?;
        if claims.sub != user_id.to_string() || claims.stamp != account.identity.security_stamp {
            warn!("Email confirmation rejected for user: {}", user_id);
            return Err(DomainError::InvalidToken("Invalid token.".to_string()));
        }

        if account.identity.email_confirmed {
            return Ok(());
        }
        account.identity.email_confirmed = true;
        self.save(account).await?;

        info!("Email confirmed for user: {}", user_id);
        Ok(())
    }

    /// Password sign-in. Failed attempts count towards lockout.
    pub async fn sign_in(&self, user_name: &str, password: &str) -> Result<SignInResult, DomainError> {
        info!("Login attempt for: {}", mask_email(user_name));
        let now = Utc::now();

        let mut account = self
            .accounts
            .find_by_normalized_user_name(&normalize_key(user_name))
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown user: {}", mask_email(user_name));
                DomainError::InvalidCredentials
            })?;

        self.pre_sign_in_check(&account, now)?;

        let password_valid = match account.identity.password_hash.as_deref() {
            Some(hash) => PasswordService::verify(password, hash)
                .map_err(|_e| DomainError::InvalidCredentials)?,
            None => return Err(DomainError::InvalidCredentials),
        };

        if !password_valid {
            account.identity.record_access_failure(
                now,
                self.options.max_failed_access_attempts,
                self.options.lockout,
            );
            let locked_until = account
                .identity
                .lockout_end
                .filter(|_| account.identity.is_locked_out(now));
            self.save(account).await?;

            return Err(match locked_until {
                Some(until) => {
                    warn!("User account locked out.");
                    DomainError::LockedOut(until)
                }
                None => {
                    warn!("Login failed: invalid password for: {}", mask_email(user_name));
                    DomainError::InvalidCredentials
                }
            });
        }

        if account.identity.access_failed_count > 0 || account.identity.lockout_end.is_some() {
            account.identity.reset_access_failures();
            account = self.save(account).await?;
        }

        info!("User logged in: {}", account.id());
        self.signed_in(&account)
    }

    /// Sign-in through an already linked external provider key
    pub async fn external_sign_in(&self, login_provider: &str, provider_key: &str) -> Result<SignInResult, DomainError> {
        let account = self
            .accounts
            .find_by_login(login_provider, provider_key)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        self.pre_sign_in_check(&account, Utc::now())?;

        info!("User logged in with {} provider: {}", login_provider, account.id());
        self.signed_in(&account)
    }

    /// Invalidates every access token issued so far
    pub async fn sign_out(&self, user_id: &Uuid) -> Result<(), DomainError> {
        let mut account = self.find(user_id).await?;
        account.identity.rotate_security_stamp();
        self.save(account).await?;
        info!("User logged out: {}", user_id);
        Ok(())
    }

    /// Resolves the account behind an access token
    pub async fn authenticate(&self, access_token: &str) -> Result<Account, DomainError> {
        let claims = self
            .tokens
            .validate_token(access_token, TokenPurpose::Access)
            .map_err(|e| DomainError::InvalidToken(e.to_string()))?;
        let user_id = claims
            .user_id()
            .map_err(|e| DomainError::InvalidToken(e.to_string()))?;

        let account = self
            .accounts
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| DomainError::InvalidToken("Account no longer exists".to_string()))?;

        if account.identity.security_stamp != claims.stamp {
            return Err(DomainError::InvalidToken("Security stamp changed".to_string()));
        }
        Ok(account)
    }

    pub async fn profile(&self, user_id: &Uuid) -> Result<AccountProfile, DomainError> {
        let account = self.find(user_id).await?;
        Ok(AccountProfile::from(&account))
    }

    /// Update the editable profile fields
    pub async fn update_profile(&self, user_id: &Uuid, update: ProfileUpdate) -> Result<AccountProfile, DomainError> {
        let mut account = self.find(user_id).await?;
        let mut violations = update.apply_to(&mut account);
        if let Err(profile_violations) = validate_account(&account) {
            violations.extend(profile_violations);
        }
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        let saved = self.save(account).await?;
        info!("User updated their profile: {}", user_id);
        Ok(AccountProfile::from(&saved))
    }

    /// Personal data export, external login keys included
    pub async fn personal_data(&self, user_id: &Uuid) -> Result<Vec<PersonalDataEntry>, DomainError> {
        let account = self.find(user_id).await?;
        info!("User asked for their personal data: {}", user_id);

        let mut data = account.personal_data();
        for login in self.accounts.logins(user_id).await? {
            data.push(PersonalDataEntry {
                key: login.personal_data_key(),
                value: login.provider_key,
            });
        }
        Ok(data)
    }

    /// Erases the account. Accounts with a password must confirm it.
    pub async fn delete_personal_data(&self, user_id: &Uuid, password: Option<&str>) -> Result<(), DomainError> {
        let account = self.find(user_id).await?;

        if let Some(hash) = account.identity.password_hash.as_deref() {
            let password = password
                .filter(|p| !p.is_empty())
                .ok_or(DomainError::PasswordRequired)?;
            let valid = PasswordService::verify(password, hash)
                .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
            if !valid {
                warn!("Personal data deletion rejected: incorrect password for {}", user_id);
                return Err(DomainError::InvalidCredentials);
            }
        }

        self.accounts.delete(user_id).await.map_err(|e| {
            error!("Unexpected error occurred deleting user {}: {}", user_id, e);
            e
        })?;

        info!("User with ID '{}' deleted themselves.", user_id);
        Ok(())
    }

    /// Adds the account to a role, creating the role on first use
    pub async fn add_to_role(&self, user_id: &Uuid, role_name: &str) -> Result<(), DomainError> {
        self.find(user_id).await?;
        let normalized = normalize_key(role_name);

        let role = match self.roles.find_by_normalized_name(&normalized).await? {
            Some(role) => role,
            None => self.roles.create(&Role::new(role_name)).await?,
        };

        let current = self.roles.roles_for_user(user_id).await?;
        if current.iter().any(|name| normalize_key(name) == normalized) {
            return Ok(());
        }
        self.roles.add_user_to_role(user_id, &role.id).await
    }

    pub async fn roles(&self, user_id: &Uuid) -> Result<Vec<String>, DomainError> {
        self.roles.roles_for_user(user_id).await
    }

    async fn find(&self, user_id: &Uuid) -> Result<Account, DomainError> {
        self.accounts
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)
    }

    /// Both the user name and the email must be unused
    async fn ensure_unique(&self, account: &Account) -> Result<(), DomainError> {
        let identity = &account.identity;
        if self
            .accounts
            .find_by_normalized_user_name(&identity.normalized_user_name)
            .await?
            .is_some()
        {
            warn!("Registration failed: user name taken: {}", mask_email(&identity.user_name));
            return Err(DomainError::DuplicateUserName(identity.user_name.clone()));
        }
        if self
            .accounts
            .find_by_normalized_email(&identity.normalized_email)
            .await?
            .is_some()
        {
            warn!("Registration failed: email taken: {}", mask_email(&identity.email));
            return Err(DomainError::DuplicateEmail(identity.email.clone()));
        }
        Ok(())
    }

    /// Every write goes through here so the concurrency stamp is checked and renewed.
    async fn save(&self, mut account: Account) -> Result<Account, DomainError> {
        let expected = account.identity.rotate_concurrency_stamp();
        self.accounts.update(&account, &expected).await
    }

    fn pre_sign_in_check(&self, account: &Account, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.options.require_confirmed_account && !account.identity.email_confirmed {
            warn!("User cannot sign in without a confirmed email: {}", account.id());
            return Err(DomainError::NotAllowed);
        }
        if account.identity.is_locked_out(now) {
            if let Some(until) = account.identity.lockout_end {
                warn!("User is currently locked out: {}", account.id());
                return Err(DomainError::LockedOut(until));
            }
        }
        Ok(())
    }

    fn confirmation_code(&self, account: &Account) -> Result<String, DomainError> {
        self.tokens
            .generate_confirmation_token(&account.id(), &account.identity.security_stamp)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }

    fn signed_in(&self, account: &Account) -> Result<SignInResult, DomainError> {
        let access_token = self
            .tokens
            .generate_access_token(&account.id(), &account.identity.security_stamp)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;
        Ok(SignInResult {
            account: AccountProfile::from(account),
            access_token,
        })
    }
}

/// Password policy failures as field violations. Length is already
/// reported by form validation.
fn password_violations(policy: &PasswordPolicy, password: &str) -> Vec<FieldViolation> {
    policy
        .check(password)
        .into_iter()
        .filter(|v| {
            !matches!(
                v,
                PasswordPolicyViolation::TooShort { .. } | PasswordPolicyViolation::TooLong { .. }
            )
        })
        .map(|v| {
            FieldViolation::new(
                "password",
                ValidationRule::Password { code: v.code().to_string() },
                v.description(),
            )
        })
        .collect()
}

/// Result of successful registration
#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub account: AccountProfile,
    pub confirmation_code: String,
    pub requires_confirmation: bool,
}

/// Result of successful sign-in
#[derive(Debug, Clone)]
pub struct SignInResult {
    pub account: AccountProfile,
    pub access_token: String,
}

/// Account view returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub email_confirmed: bool,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    /// `dd/MM/yyyy`
    pub birthday: Option<String>,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id(),
            user_name: account.identity.user_name.clone(),
            email: account.identity.email.clone(),
            email_confirmed: account.identity.email_confirmed,
            full_name: account.full_name(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            phone_number: account.phone_number.clone(),
            birthday: account.birthday_display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockAccountRepository, MockRoleRepository};

    fn tokens() -> TokenService {
        TokenService::new("test-secret".to_string(), 3600, 3600)
    }

    fn service(accounts: MockAccountRepository, roles: MockRoleRepository) -> AccountService<MockAccountRepository, MockRoleRepository> {
        AccountService::new(Arc::new(accounts), Arc::new(roles), tokens(), IdentityOptions::default())
    }

    fn input(last_name: &str) -> RegisterInput {
        RegisterInput {
            email: "ana.silva@example.com".to_string(),
            password: "Ana#1990".to_string(),
            confirm_password: "Ana#1990".to_string(),
            profile: ProfileUpdate {
                first_name: Some("Ana".to_string()),
                last_name: Some(last_name.to_string()),
                phone_number: Some("+351912345678".to_string()),
                birthday: None,
            },
        }
    }

    #[tokio::test]
    async fn test_register_rejects_long_last_name_before_touching_store() {
        let service = service(MockAccountRepository::new(), MockRoleRepository::new());

        let err = service.register(input(&"x".repeat(51))).await.unwrap_err();
        match err {
            DomainError::Validation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "LastName");
                assert_eq!(violations[0].rule, ValidationRule::MaxLength { max: 50 });
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_reports_bad_birthday_with_other_violations() {
        let service = service(MockAccountRepository::new(), MockRoleRepository::new());
        let mut bad = input(&"x".repeat(51));
        bad.profile.birthday = Some("31/02/1990".to_string());

        let err = service.register(bad).await.unwrap_err();
        match err {
            DomainError::Validation(violations) => {
                let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(violations.len(), 2);
                assert!(fields.contains(&"LastName"));
                assert!(fields.contains(&"Birthday"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_reports_password_policy() {
        let service = service(MockAccountRepository::new(), MockRoleRepository::new());
        let mut weak = input("Silva");
        weak.password = "password".to_string();
        weak.confirm_password = "password".to_string();

        let err = service.register(weak).await.unwrap_err();
        let DomainError::Validation(violations) = err else {
            panic!("expected validation error");
        };
        let codes: Vec<_> = violations.iter().map(|v| v.rule.clone()).collect();
        assert!(codes.contains(&ValidationRule::Password { code: "PasswordRequiresDigit".to_string() }));
        assert!(codes.contains(&ValidationRule::Password { code: "PasswordRequiresUpper".to_string() }));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_user_name() {
        let mut accounts = MockAccountRepository::new();
        let existing = Account::new("ana.silva@example.com");
        accounts
            .expect_find_by_normalized_user_name()
            .returning(move |_| Ok(Some(existing.clone())));

        let err = service(accounts, MockRoleRepository::new())
            .register(input("Silva"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateUserName(ref name) if name == "ana.silva@example.com"));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let mut accounts = MockAccountRepository::new();
        let existing = Account::new("ana.silva@example.com");
        accounts
            .expect_find_by_normalized_user_name()
            .returning(|_| Ok(None));
        accounts
            .expect_find_by_normalized_email()
            .returning(move |_| Ok(Some(existing.clone())));

        let err = service(accounts, MockRoleRepository::new())
            .register(input("Silva"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_unconfirmed_account_cannot_sign_in() {
        let mut accounts = MockAccountRepository::new();
        let account = Account::new("ana.silva@example.com");
        accounts
            .expect_find_by_normalized_user_name()
            .returning(move |_| Ok(Some(account.clone())));

        let err = service(accounts, MockRoleRepository::new())
            .sign_in("ana.silva@example.com", "Ana#1990")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotAllowed));
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_credentials() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_normalized_user_name()
            .returning(|_| Ok(None));

        let err = service(accounts, MockRoleRepository::new())
            .sign_in("nobody@example.com", "Ana#1990")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_confirm_email_rejects_stale_stamp() {
        let account = Account::new("ana.silva@example.com");
        let user_id = account.id();
        let code = tokens()
            .generate_confirmation_token(&user_id, "OLD-STAMP")
            .unwrap();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        accounts.expect_update().never();

        let err = service(accounts, MockRoleRepository::new())
            .confirm_email(&user_id, &code)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_changed_security_stamp() {
        let account = Account::new("ana.silva@example.com");
        let user_id = account.id();
        let token = tokens().generate_access_token(&user_id, "OLD-STAMP").unwrap();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));

        let err = service(accounts, MockRoleRepository::new())
            .authenticate(&token)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidToken(ref msg) if msg == "Security stamp changed"));
    }

    #[tokio::test]
    async fn test_add_to_role_creates_missing_role() {
        let account = Account::new("ana.silva@example.com");
        let user_id = account.id();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));

        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_normalized_name().returning(|_| Ok(None));
        roles
            .expect_create()
            .times(1)
            .returning(|role| Ok(role.clone()));
        roles.expect_roles_for_user().returning(|_| Ok(Vec::new()));
        roles
            .expect_add_user_to_role()
            .times(1)
            .returning(|_, _| Ok(()));

        service(accounts, roles)
            .add_to_role(&user_id, "Admin")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_personal_data_requires_password() {
        let mut account = Account::new("ana.silva@example.com");
        account.identity.password_hash = Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA".to_string());
        let user_id = account.id();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        accounts.expect_delete().never();

        let err = service(accounts, MockRoleRepository::new())
            .delete_personal_data(&user_id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PasswordRequired));
    }
}
