//! Application-wide constants

pub const DEFAULT_CONNECTION_NAME: &str = "DefaultConnection";

/// Display and edit format of a birthday (`dd/MM/yyyy`)
pub const BIRTHDAY_DISPLAY_FORMAT: &str = "%d/%m/%Y";
pub const BIRTHDAY_ISO_FORMAT: &str = "%Y-%m-%d";

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 100;

pub const DEFAULT_MAX_FAILED_ACCESS_ATTEMPTS: i32 = 5;
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 5;

/// Signing key used when none is configured. Accepted in development only.
pub const DEVELOPMENT_SIGNING_KEY: &str = "development-signing-key-change-me";

pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 3600;
pub const DEFAULT_CONFIRMATION_TOKEN_EXPIRY: i64 = 86400;

pub const PERSONAL_DATA_FILE_NAME: &str = "PersonalData.json";
pub const MICROSOFT_PROVIDER: &str = "Microsoft";
