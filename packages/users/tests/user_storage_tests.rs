// ABOUTME: Integration tests for member storage
// ABOUTME: Covers social account linking, token encryption at rest, and withdrawal

use laundrylens_core::SocialProvider;
use laundrylens_security::TokenCipher;
use laundrylens_storage::{connect_in_memory, StorageError};
use laundrylens_users::{CreateUserInput, ProviderTokens, UpdateUserInput, UserStorage};
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;

async fn setup() -> (UserStorage, SqlitePool) {
    let pool = connect_in_memory().await.unwrap();
    let cipher = TokenCipher::from_secret("test-secret").unwrap();
    (UserStorage::new(pool.clone(), cipher), pool)
}

fn tokens(access: &str) -> ProviderTokens {
    ProviderTokens {
        access_token: Some(access.to_string()),
        refresh_token: Some(format!("{}-refresh", access)),
    }
}

fn input(email: Option<&str>, nickname: &str) -> CreateUserInput {
    CreateUserInput {
        email: email.map(str::to_string),
        nickname: nickname.to_string(),
        profile_image: None,
    }
}

#[tokio::test]
async fn test_create_and_find_by_social_account() {
    let (storage, _pool) = setup().await;

    let user = storage
        .create_with_social_account(
            input(Some("a@example.com"), "Alice"),
            SocialProvider::Kakao,
            "12345",
            &tokens("kakao-token"),
        )
        .await
        .unwrap();

    assert_eq!(user.nickname, "Alice");
    assert!(!user.is_premium);
    assert!(user.deleted_at.is_none());

    let found = storage
        .find_by_social_account(SocialProvider::Kakao, "12345")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);

    // Same provider id under another provider is a different identity
    assert!(storage
        .find_by_social_account(SocialProvider::Google, "12345")
        .await
        .unwrap()
        .is_none());

    let by_email = storage.find_by_email("a@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn test_tokens_are_encrypted_at_rest() {
    let (storage, pool) = setup().await;

    let user = storage
        .create_with_social_account(
            input(None, "Bob"),
            SocialProvider::Google,
            "g-1",
            &tokens("google-access"),
        )
        .await
        .unwrap();

    let raw: Option<String> =
        sqlx::query_scalar("SELECT access_token FROM social_accounts WHERE user_id = ?")
            .bind(&user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    let raw = raw.unwrap();
    assert_ne!(raw, "google-access");
    assert!(!raw.contains("google-access"));

    let account = storage
        .get_social_account(&user.id, SocialProvider::Google)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.provider_id, "g-1");
    assert_eq!(account.tokens, tokens("google-access"));
}

#[tokio::test]
async fn test_update_tokens_keeps_missing_refresh_token() {
    let (storage, _pool) = setup().await;

    let user = storage
        .create_with_social_account(
            input(None, "Carol"),
            SocialProvider::Kakao,
            "777",
            &tokens("first"),
        )
        .await
        .unwrap();

    storage
        .update_social_account_tokens(
            SocialProvider::Kakao,
            "777",
            &ProviderTokens {
                access_token: Some("second".to_string()),
                refresh_token: None,
            },
        )
        .await
        .unwrap();

    let account = storage
        .get_social_account(&user.id, SocialProvider::Kakao)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.tokens.access_token.as_deref(), Some("second"));
    assert_eq!(account.tokens.refresh_token.as_deref(), Some("first-refresh"));

    let missing = storage
        .update_social_account_tokens(SocialProvider::Kakao, "nope", &tokens("x"))
        .await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn test_link_second_provider() {
    let (storage, _pool) = setup().await;

    let user = storage
        .create_with_social_account(
            input(Some("d@example.com"), "Dave"),
            SocialProvider::Kakao,
            "k-1",
            &tokens("k"),
        )
        .await
        .unwrap();

    storage
        .link_social_account(&user.id, SocialProvider::Google, "g-1", &tokens("g"))
        .await
        .unwrap();

    let accounts = storage.list_social_accounts(&user.id).await.unwrap();
    assert_eq!(accounts.len(), 2);

    let via_google = storage
        .find_by_social_account(SocialProvider::Google, "g-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(via_google.id, user.id);

    // The same identity cannot be linked twice
    let duplicate = storage
        .link_social_account(&user.id, SocialProvider::Google, "g-1", &tokens("g"))
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_update_profile_and_premium() {
    let (storage, _pool) = setup().await;

    let user = storage
        .create_with_social_account(input(None, "Eve"), SocialProvider::Kakao, "e", &tokens("t"))
        .await
        .unwrap();

    let updated = storage
        .update(
            &user.id,
            UpdateUserInput {
                nickname: Some("Eve2".to_string()),
                profile_image: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.nickname, "Eve2");
    assert_eq!(updated.profile_image, None);

    storage.set_premium(&user.id, true).await.unwrap();
    assert!(storage.get_user(&user.id).await.unwrap().is_premium);

    let missing = storage.update("missing", UpdateUserInput::default()).await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn test_soft_delete_hides_user() {
    let (storage, _pool) = setup().await;

    let user = storage
        .create_with_social_account(input(None, "Frank"), SocialProvider::Kakao, "f", &tokens("t"))
        .await
        .unwrap();

    storage.soft_delete(&user.id).await.unwrap();

    assert!(storage.find_by_id(&user.id).await.unwrap().is_none());
    assert!(storage
        .find_by_social_account(SocialProvider::Kakao, "f")
        .await
        .unwrap()
        .is_none());
    assert!(matches!(
        storage.soft_delete(&user.id).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn test_unlink_social_accounts() {
    let (storage, _pool) = setup().await;

    let user = storage
        .create_with_social_account(input(None, "Heidi"), SocialProvider::Kakao, "h", &tokens("t"))
        .await
        .unwrap();
    storage
        .link_social_account(&user.id, SocialProvider::Google, "h-g", &tokens("g"))
        .await
        .unwrap();

    assert_eq!(storage.unlink_social_accounts(&user.id).await.unwrap(), 2);
    assert!(storage.list_social_accounts(&user.id).await.unwrap().is_empty());
    // The member itself stays live
    assert!(storage.find_by_id(&user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_withdrawn_member_can_sign_up_again() {
    let (storage, _pool) = setup().await;

    let first = storage
        .create_with_social_account(
            input(Some("g@example.com"), "Grace"),
            SocialProvider::Google,
            "grace",
            &tokens("t"),
        )
        .await
        .unwrap();

    storage.withdraw(&first.id).await.unwrap();

    assert!(storage.find_by_email("g@example.com").await.unwrap().is_none());
    assert!(storage.list_social_accounts(&first.id).await.unwrap().is_empty());

    let second = storage
        .create_with_social_account(
            input(Some("g@example.com"), "Grace"),
            SocialProvider::Google,
            "grace",
            &tokens("t2"),
        )
        .await
        .unwrap();

    assert_ne!(second.id, first.id);
    assert!(matches!(
        storage.withdraw(&first.id).await,
        Err(StorageError::NotFound)
    ));
}
