mod common;

use chrono::NaiveDate;
use identity_core::domain::{validate_account, Account, ExternalLogin};
use identity_core::error::DomainError;
use identity_core::repositories::{AccountRepository, RoleRepository};
use identity_core::Role;

use common::{ana_silva, create_test_context};

#[tokio::test]
async fn test_ana_silva_persists_profile_fields() {
    let context = create_test_context().await;
    let accounts = context.accounts();

    let account = ana_silva();
    let created = accounts.create(&account).await.unwrap();
    let other = accounts.create(&Account::new("joao@example.com")).await.unwrap();
    assert_ne!(created.id(), other.id());

    let stored = accounts.find_by_id(&created.id()).await.unwrap().unwrap();
    assert_eq!(stored, account);
    assert_eq!(stored.first_name.as_deref(), Some("Ana"));
    assert_eq!(stored.last_name.as_deref(), Some("Silva"));
    assert_eq!(stored.phone_number.as_deref(), Some("+351912345678"));
    assert_eq!(stored.birthday_display().as_deref(), Some("12/05/1990"));
}

#[tokio::test]
async fn test_birthday_round_trips_as_date() {
    let context = create_test_context().await;
    let accounts = context.accounts();

    let mut account = Account::new("leap@example.com");
    account.birthday = NaiveDate::from_ymd_opt(2000, 2, 29);
    accounts.create(&account).await.unwrap();

    let stored = accounts
        .find_by_normalized_email("LEAP@EXAMPLE.COM")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.birthday, NaiveDate::from_ymd_opt(2000, 2, 29));

    let (raw,): (String,) = sqlx::query_as("SELECT Birthday FROM AspNetUsers WHERE Id = ?")
        .bind(account.id().to_string())
        .fetch_one(context.pool())
        .await
        .unwrap();
    assert_eq!(raw, "2000-02-29");
}

#[tokio::test]
async fn test_duplicate_user_name_is_rejected() {
    let context = create_test_context().await;
    let accounts = context.accounts();

    accounts.create(&ana_silva()).await.unwrap();
    let err = accounts
        .create(&Account::new("ANA.SILVA@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateUserName(_)));
}

#[tokio::test]
async fn test_update_with_stale_concurrency_stamp_fails() {
    let context = create_test_context().await;
    let accounts = context.accounts();
    let created = accounts.create(&ana_silva()).await.unwrap();

    let mut first = created.clone();
    let expected = first.identity.rotate_concurrency_stamp();
    first.first_name = Some("Anabela".to_string());
    accounts.update(&first, &expected).await.unwrap();

    let mut second = created.clone();
    let stale = second.identity.rotate_concurrency_stamp();
    second.last_name = Some("Sousa".to_string());
    let err = accounts.update(&second, &stale).await.unwrap_err();
    assert!(matches!(err, DomainError::ConcurrencyFailure));

    let stored = accounts.find_by_id(&created.id()).await.unwrap().unwrap();
    assert_eq!(stored.first_name.as_deref(), Some("Anabela"));
    assert_eq!(stored.last_name.as_deref(), Some("Silva"));
}

#[tokio::test]
async fn test_length_bounds_belong_to_validation_not_storage() {
    let context = create_test_context().await;
    let accounts = context.accounts();

    let mut account = ana_silva();
    account.last_name = Some("x".repeat(51));
    account.phone_number = Some("1".repeat(21));
    assert!(validate_account(&account).is_err());

    let created = accounts.create(&account).await.unwrap();
    let stored = accounts.find_by_id(&created.id()).await.unwrap().unwrap();
    assert_eq!(stored.last_name.map(|n| n.chars().count()), Some(51));
    assert_eq!(stored.phone_number.map(|p| p.len()), Some(21));
}

#[tokio::test]
async fn test_external_login_lookup_and_cascade_delete() {
    let context = create_test_context().await;
    let accounts = context.accounts();
    let created = accounts.create(&ana_silva()).await.unwrap();

    accounts
        .add_login(&ExternalLogin::new("Microsoft", "ms-key-1", created.id()))
        .await
        .unwrap();
    let err = accounts
        .add_login(&ExternalLogin::new("Microsoft", "ms-key-1", created.id()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateLogin(_)));

    let found = accounts.find_by_login("Microsoft", "ms-key-1").await.unwrap().unwrap();
    assert_eq!(found.id(), created.id());
    assert_eq!(accounts.logins(&created.id()).await.unwrap().len(), 1);

    accounts.delete(&created.id()).await.unwrap();
    assert!(accounts.find_by_id(&created.id()).await.unwrap().is_none());
    assert!(accounts.logins(&created.id()).await.unwrap().is_empty());
    assert!(matches!(
        accounts.delete(&created.id()).await.unwrap_err(),
        DomainError::UserNotFound
    ));
}

#[tokio::test]
async fn test_roles_for_user() {
    let context = create_test_context().await;
    let accounts = context.accounts();
    let roles = context.roles();
    let created = accounts.create(&ana_silva()).await.unwrap();

    let admin = roles.create(&Role::new("Admin")).await.unwrap();
    roles.add_user_to_role(&created.id(), &admin.id).await.unwrap();
    roles.add_user_to_role(&created.id(), &admin.id).await.unwrap();

    assert_eq!(roles.roles_for_user(&created.id()).await.unwrap(), vec!["Admin".to_string()]);
    assert!(roles.find_by_normalized_name("ADMIN").await.unwrap().is_some());
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let context = create_test_context().await;
    assert_eq!(context.migrate().await.unwrap(), 0);
}
