//! Utility functions

/// Lookup normalization used for user names, emails and role names.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let keep = local.chars().take(if local.chars().count() <= 2 { 1 } else { 2 });
        format!("{}***{}", keep.collect::<String>(), domain)
    } else {
        "***".to_string()
    }
}
