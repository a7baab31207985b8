mod common;

use identity_core::domain::{ProfileUpdate, RegisterInput};
use identity_core::error::DomainError;
use identity_core::repositories::AccountRepository;

use common::{create_test_context, create_test_service, SqliteAccountService};

const PASSWORD: &str = "Ana#1990";

fn register_input() -> RegisterInput {
    RegisterInput {
        email: "ana.silva@example.com".to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        profile: ProfileUpdate {
            first_name: Some("Ana".to_string()),
            last_name: Some("Silva".to_string()),
            phone_number: Some("+351912345678".to_string()),
            birthday: Some("12/05/1990".to_string()),
        },
    }
}

/// Registers Ana Silva and confirms her email
async fn registered(service: &SqliteAccountService) -> uuid::Uuid {
    let result = service.register(register_input()).await.unwrap();
    service
        .confirm_email(&result.account.id, &result.confirmation_code)
        .await
        .unwrap();
    result.account.id
}

#[tokio::test]
async fn test_register_confirm_and_sign_in() {
    let context = create_test_context().await;
    let service = create_test_service(&context);

    let result = service.register(register_input()).await.unwrap();
    assert!(result.requires_confirmation);
    assert_eq!(result.account.full_name, "Ana Silva");
    assert_eq!(result.account.birthday.as_deref(), Some("12/05/1990"));

    let err = service.sign_in("ana.silva@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, DomainError::NotAllowed));

    service
        .confirm_email(&result.account.id, &result.confirmation_code)
        .await
        .unwrap();

    let signed_in = service.sign_in("Ana.Silva@Example.com", PASSWORD).await.unwrap();
    let account = service.authenticate(&signed_in.access_token).await.unwrap();
    assert_eq!(account.id(), result.account.id);
    assert_eq!(account.phone_number.as_deref(), Some("+351912345678"));
    assert!(account.identity.email_confirmed);
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let context = create_test_context().await;
    let service = create_test_service(&context);

    service.register(register_input()).await.unwrap();
    let err = service.register(register_input()).await.unwrap_err();
    assert!(matches!(err, DomainError::DuplicateUserName(_)));
}

#[tokio::test]
async fn test_lockout_after_five_failures() {
    let context = create_test_context().await;
    let service = create_test_service(&context);
    let user_id = registered(&service).await;

    for _ in 0..4 {
        let err = service.sign_in("ana.silva@example.com", "Wrong#123").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }
    let err = service.sign_in("ana.silva@example.com", "Wrong#123").await.unwrap_err();
    assert!(matches!(err, DomainError::LockedOut(_)));

    let err = service.sign_in("ana.silva@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, DomainError::LockedOut(_)));

    let stored = context.accounts().find_by_id(&user_id).await.unwrap().unwrap();
    assert!(stored.identity.lockout_end.is_some());
}

#[tokio::test]
async fn test_successful_sign_in_resets_failures() {
    let context = create_test_context().await;
    let service = create_test_service(&context);
    let user_id = registered(&service).await;

    service.sign_in("ana.silva@example.com", "Wrong#123").await.unwrap_err();
    service.sign_in("ana.silva@example.com", PASSWORD).await.unwrap();

    let stored = context.accounts().find_by_id(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.identity.access_failed_count, 0);
}

#[tokio::test]
async fn test_sign_out_revokes_access_token() {
    let context = create_test_context().await;
    let service = create_test_service(&context);
    let user_id = registered(&service).await;

    let signed_in = service.sign_in("ana.silva@example.com", PASSWORD).await.unwrap();
    service.sign_out(&user_id).await.unwrap();

    let err = service.authenticate(&signed_in.access_token).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidToken(_)));
}

#[tokio::test]
async fn test_update_profile_validates_and_persists() {
    let context = create_test_context().await;
    let service = create_test_service(&context);
    let user_id = registered(&service).await;

    let err = service
        .update_profile(
            &user_id,
            ProfileUpdate {
                last_name: Some("x".repeat(51)),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref v) if v[0].field == "LastName"));

    let profile = service
        .update_profile(
            &user_id,
            ProfileUpdate {
                first_name: Some("Ana".to_string()),
                last_name: Some("Sousa".to_string()),
                phone_number: None,
                birthday: Some("1991-01-02".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.last_name.as_deref(), Some("Sousa"));
    assert_eq!(profile.phone_number, None);
    assert_eq!(profile.birthday.as_deref(), Some("02/01/1991"));

    let stored = context.accounts().find_by_id(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.last_name.as_deref(), Some("Sousa"));
}

#[tokio::test]
async fn test_external_registration_and_personal_data() {
    let context = create_test_context().await;
    let service = create_test_service(&context);

    let profile = service
        .register_external("Microsoft", "ms-key-42", "ana.silva@example.com")
        .await
        .unwrap();
    assert!(profile.email_confirmed);

    let again = service
        .register_external("Microsoft", "ms-key-42", "ana.silva@example.com")
        .await
        .unwrap();
    assert_eq!(again.id, profile.id);

    let signed_in = service.external_sign_in("Microsoft", "ms-key-42").await.unwrap();
    assert_eq!(signed_in.account.id, profile.id);

    let data = service.personal_data(&profile.id).await.unwrap();
    let entry = data
        .iter()
        .find(|e| e.key == "Microsoft external login provider key")
        .unwrap();
    assert_eq!(entry.value, "ms-key-42");
    assert!(data.iter().any(|e| e.key == "Birthday" && e.value == "null"));

    // No password: deletion needs no confirmation
    service.delete_personal_data(&profile.id, None).await.unwrap();
    assert!(context.accounts().find_by_id(&profile.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_personal_data_checks_password() {
    let context = create_test_context().await;
    let service = create_test_service(&context);
    let user_id = registered(&service).await;

    let err = service
        .delete_personal_data(&user_id, Some("Wrong#123"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidCredentials));

    service.delete_personal_data(&user_id, Some(PASSWORD)).await.unwrap();
    assert!(context.accounts().find_by_id(&user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_add_to_role_is_idempotent() {
    let context = create_test_context().await;
    let service = create_test_service(&context);
    let user_id = registered(&service).await;

    service.add_to_role(&user_id, "Admin").await.unwrap();
    service.add_to_role(&user_id, "admin").await.unwrap();
    assert_eq!(service.roles(&user_id).await.unwrap(), vec!["Admin".to_string()]);
}
