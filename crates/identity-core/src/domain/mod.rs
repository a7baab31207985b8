//! # Identity Core - Domain Module
//! 
//! The identity base record, the extended account and the inherited
//! identity entities (roles, external logins).

pub mod identity_user;
pub mod account;
pub mod validation;
pub mod external_login;
pub mod role;

pub use identity_user::IdentityUser;
pub use account::{parse_birthday, Account, PersonalDataEntry, ProfileUpdate, RegisterInput};
pub use validation::{validate_account, FieldViolation, ValidationRule};
pub use external_login::ExternalLogin;
pub use role::Role;
