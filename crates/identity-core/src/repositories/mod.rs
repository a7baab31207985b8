//! Repository traits (ports)

pub mod account_repository;
pub mod role_repository;

pub use account_repository::AccountRepository;
pub use role_repository::RoleRepository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use role_repository::MockRoleRepository;
