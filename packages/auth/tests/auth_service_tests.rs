// ABOUTME: Integration tests for the member authentication service
// ABOUTME: Covers identity reconciliation, session refresh, token lookup, and account deletion

use std::sync::Arc;
use std::time::Duration;

use laundrylens_auth::{
    AuthError, AuthService, GoogleClient, JwtService, KakaoClient, OAuthUser, TokenType,
};
use laundrylens_config::OAuthClientConfig;
use laundrylens_core::SocialProvider;
use laundrylens_security::TokenCipher;
use laundrylens_storage::connect_in_memory;
use laundrylens_users::UserStorage;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    auth: AuthService,
    users: UserStorage,
    server: MockServer,
}

async fn setup() -> Harness {
    let pool = connect_in_memory().await.unwrap();
    let users = UserStorage::new(pool, TokenCipher::from_secret("secret").unwrap());
    let server = MockServer::start().await;

    let kakao = KakaoClient::new(OAuthClientConfig::default())
        .unwrap()
        .with_base_urls(server.uri(), server.uri());
    let google = GoogleClient::new(OAuthClientConfig::default())
        .unwrap()
        .with_base_urls(server.uri(), server.uri(), server.uri());

    let auth = AuthService::new(
        users.clone(),
        JwtService::new(
            "jwt-secret",
            Duration::from_secs(3600),
            Duration::from_secs(7200),
        ),
        Arc::new(kakao),
        Arc::new(google),
    );

    Harness {
        auth,
        users,
        server,
    }
}

fn oauth_user(provider: SocialProvider, id: &str, email: Option<&str>) -> OAuthUser {
    OAuthUser {
        provider,
        provider_id: id.to_string(),
        email: email.map(str::to_string),
        nickname: format!("nick-{}", id),
        profile_image: None,
        access_token: format!("{}-access", id),
        refresh_token: Some(format!("{}-refresh", id)),
    }
}

#[tokio::test]
async fn test_new_identity_creates_member() {
    let h = setup().await;

    let user = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Kakao, "k1", Some("a@x.com")))
        .await
        .unwrap();

    assert_eq!(user.nickname, "nick-k1");
    assert_eq!(user.email.as_deref(), Some("a@x.com"));
    assert_eq!(h.users.list_social_accounts(&user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_known_identity_refreshes_tokens() {
    let h = setup().await;

    let first = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Kakao, "k1", None))
        .await
        .unwrap();

    let mut again = oauth_user(SocialProvider::Kakao, "k1", None);
    again.access_token = "rotated".to_string();
    let second = h.auth.validate_oauth_user(again).await.unwrap();

    assert_eq!(first.id, second.id);
    let account = h
        .users
        .get_social_account(&first.id, SocialProvider::Kakao)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.tokens.access_token.as_deref(), Some("rotated"));
}

#[tokio::test]
async fn test_matching_email_links_second_provider() {
    let h = setup().await;

    let kakao_user = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Kakao, "k1", Some("same@x.com")))
        .await
        .unwrap();
    let google_user = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Google, "g1", Some("same@x.com")))
        .await
        .unwrap();

    assert_eq!(kakao_user.id, google_user.id);
    assert_eq!(
        h.users.list_social_accounts(&kakao_user.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_identity_without_email_never_links() {
    let h = setup().await;

    let a = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Kakao, "k1", None))
        .await
        .unwrap();
    let b = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Google, "g1", None))
        .await
        .unwrap();

    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_token_response_and_lookup() {
    let h = setup().await;
    let user = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Google, "g1", Some("g@x.com")))
        .await
        .unwrap();

    let response = h.auth.create_token_response(&user).unwrap();
    assert_eq!(response.user.id, user.id);
    assert!(!response.user.is_premium);

    let claims = h
        .auth
        .validate_token(&response.access_token, TokenType::Access)
        .unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email.as_deref(), Some("g@x.com"));

    let me = h.auth.user_from_token(&response.access_token).await.unwrap();
    assert_eq!(me.id, user.id);

    // A refresh token is not accepted as an access token
    let wrong = h.auth.user_from_token(&response.refresh_token).await;
    assert!(matches!(wrong, Err(AuthError::Unauthorized(_))));
}

#[tokio::test]
async fn test_refresh_tokens() {
    let h = setup().await;
    let user = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Kakao, "k1", None))
        .await
        .unwrap();
    let response = h.auth.create_token_response(&user).unwrap();

    let refreshed = h.auth.refresh_tokens(&response.refresh_token).await.unwrap();
    assert_eq!(refreshed.user.id, user.id);

    assert!(matches!(
        h.auth.refresh_tokens(&response.access_token).await,
        Err(AuthError::Unauthorized(_))
    ));
    assert!(matches!(
        h.auth.refresh_tokens("garbage").await,
        Err(AuthError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_delete_account_disconnects_providers_and_withdraws() {
    let h = setup().await;

    let user = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Kakao, "k1", Some("d@x.com")))
        .await
        .unwrap();
    h.auth
        .validate_oauth_user(oauth_user(SocialProvider::Google, "g1", Some("d@x.com")))
        .await
        .unwrap();
    let session = h.auth.create_token_response(&user).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/user/unlink"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&h.server)
        .await;
    // Google refusing the revoke must not block withdrawal
    Mock::given(method("POST"))
        .and(path("/revoke"))
        .and(query_param("token", "g1-access"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&h.server)
        .await;

    h.auth.delete_account(&user.id).await.unwrap();

    assert!(h.users.find_by_id(&user.id).await.unwrap().is_none());
    assert!(h.users.list_social_accounts(&user.id).await.unwrap().is_empty());
    assert!(matches!(
        h.auth.user_from_token(&session.access_token).await,
        Err(AuthError::Unauthorized(_))
    ));

    // The same Kakao identity signs up as a new member
    let again = h
        .auth
        .validate_oauth_user(oauth_user(SocialProvider::Kakao, "k1", Some("d@x.com")))
        .await
        .unwrap();
    assert_ne!(again.id, user.id);

    assert!(matches!(
        h.auth.delete_account(&user.id).await,
        Err(AuthError::UserNotFound)
    ));
}
