// ABOUTME: Integration tests for the analyze flow against a mocked OpenAI API
// ABOUTME: Checks quota gating, catalog linking, credit spending, and history

use laundrylens_ai::{
    AIServiceError, AnalysisHistoryStorage, AnalyzeError, AnalyzeService, VisionService,
};
use laundrylens_billing::{SubscriptionService, SubscriptionStorage, UsageLogStorage};
use laundrylens_catalog::{seed_catalog, SymbolStorage};
use laundrylens_config::OpenAiConfig;
use laundrylens_core::{PlanType, QuotaClock, SocialProvider, UsageIdentity};
use laundrylens_security::TokenCipher;
use laundrylens_storage::connect_in_memory;
use laundrylens_users::{CreateUserInput, ProviderTokens, UserStorage};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMAGE: &[u8] = b"\x89PNG fake label photo";

struct Fixture {
    users: UserStorage,
    subscriptions: SubscriptionService,
    service: AnalyzeService,
}

async fn setup(server: &MockServer) -> Fixture {
    let pool = connect_in_memory().await.unwrap();
    seed_catalog(&pool).await.unwrap();

    let users = UserStorage::new(pool.clone(), TokenCipher::from_secret("test-secret").unwrap());
    let usage = UsageLogStorage::new(pool.clone());
    let subscriptions = SubscriptionService::new(
        SubscriptionStorage::new(pool.clone()),
        usage.clone(),
        users.clone(),
        QuotaClock::default(),
    );
    let vision = VisionService::new(&OpenAiConfig {
        api_key: Some("sk-test".to_string()),
        model: "gpt-4o-mini".to_string(),
        base_url: server.uri(),
    })
    .unwrap();

    let service = AnalyzeService::new(
        vision,
        SymbolStorage::new(pool.clone()),
        AnalysisHistoryStorage::new(pool),
        usage,
        subscriptions.clone(),
    );

    Fixture {
        users,
        subscriptions,
        service,
    }
}

async fn member(users: &UserStorage) -> String {
    users
        .create_with_social_account(
            CreateUserInput {
                email: Some("member@example.com".to_string()),
                nickname: "member".to_string(),
                profile_image: None,
            },
            SocialProvider::Kakao,
            "42",
            &ProviderTokens::default(),
        )
        .await
        .unwrap()
        .id
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    }))
}

async fn mount_symbols(server: &MockServer) {
    let content = json!({
        "symbols": [
            { "code": "WASH_30", "confidence": 0.95 },
            { "code": "MYSTERY_MARK", "confidence": 0.9 },
            { "code": "IRON_LOW", "confidence": 0.4 }
        ],
        "careTips": "Wash with similar colors."
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 1000,
            "response_format": { "type": "json_object" }
        })))
        .respond_with(completion(&content))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_guest_analysis_links_catalog_symbols() {
    let server = MockServer::start().await;
    mount_symbols(&server).await;
    let f = setup(&server).await;
    let guest = UsageIdentity::Guest("guest-abc".to_string());

    let result = f
        .service
        .analyze_image(IMAGE, "image/png", &guest)
        .await
        .unwrap();

    let codes: Vec<&str> = result.detected_symbols.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, vec!["WASH_30", "MYSTERY_MARK"]);
    assert!(result.detected_symbols[0].symbol_id.is_some());
    assert!(result.detected_symbols[1].symbol_id.is_none());
    assert_eq!(result.care_tips.as_deref(), Some("Wash with similar colors."));
    assert!(result.image_url.starts_with("data:image/png;base64,"));
    assert!(result.image_url.ends_with("..."));

    let remaining = f.service.remaining_analyses(&guest).await.unwrap();
    assert_eq!(remaining.remaining, 2);
    assert!(!remaining.unlimited);
}

#[tokio::test]
async fn test_guest_blocked_after_daily_limit() {
    let server = MockServer::start().await;
    let f = setup(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(r#"{"symbols": []}"#))
        .expect(3)
        .mount(&server)
        .await;

    let guest = UsageIdentity::Guest("guest-abc".to_string());
    for _ in 0..3 {
        f.service
            .analyze_image(IMAGE, "image/jpeg", &guest)
            .await
            .unwrap();
    }

    match f.service.analyze_image(IMAGE, "image/jpeg", &guest).await {
        Err(AnalyzeError::QuotaExceeded(message)) => {
            assert_eq!(message, "daily analysis limit exceeded")
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.detected_symbols)),
    }
}

#[tokio::test]
async fn test_credit_plan_spends_one_credit_per_analysis() {
    let server = MockServer::start().await;
    mount_symbols(&server).await;
    let f = setup(&server).await;
    let user_id = member(&f.users).await;
    let identity = UsageIdentity::Member(user_id.clone());

    f.subscriptions
        .create_subscription(&user_id, PlanType::Credits, 1)
        .await
        .unwrap();

    f.service
        .analyze_image(IMAGE, "image/png", &identity)
        .await
        .unwrap();

    let summary = f.service.remaining_analyses(&identity).await.unwrap();
    assert_eq!(summary.credits_remaining, Some(0));

    match f.service.analyze_image(IMAGE, "image/png", &identity).await {
        Err(AnalyzeError::QuotaExceeded(message)) => assert_eq!(message, "no credits remaining"),
        other => panic!("unexpected result: {:?}", other.map(|r| r.detected_symbols)),
    }
}

#[tokio::test]
async fn test_vision_failure_is_not_counted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;
    let f = setup(&server).await;
    let guest = UsageIdentity::Guest("guest-abc".to_string());

    match f.service.analyze_image(IMAGE, "image/png", &guest).await {
        Err(AnalyzeError::Vision(AIServiceError::ApiError(message))) => {
            assert!(message.contains("500"));
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.detected_symbols)),
    }

    assert_eq!(f.service.remaining_analyses(&guest).await.unwrap().remaining, 3);
}

#[tokio::test]
async fn test_empty_completion_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(""))
        .mount(&server)
        .await;
    let f = setup(&server).await;

    let result = f
        .service
        .analyze_image(IMAGE, "image/png", &UsageIdentity::Guest("g".to_string()))
        .await;
    assert!(matches!(
        result,
        Err(AnalyzeError::Vision(AIServiceError::InvalidResponse))
    ));
}

#[tokio::test]
async fn test_member_history_newest_first() {
    let server = MockServer::start().await;
    let f = setup(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("```json\n{\"symbols\": [{\"code\": \"DRY_FLAT\", \"confidence\": 0.8}]}\n```"))
        .mount(&server)
        .await;

    let user_id = member(&f.users).await;
    let identity = UsageIdentity::Member(user_id.clone());

    f.service
        .analyze_image(IMAGE, "image/png", &identity)
        .await
        .unwrap();
    f.service
        .analyze_image(IMAGE, "image/webp", &identity)
        .await
        .unwrap();
    f.service
        .analyze_image(IMAGE, "image/png", &UsageIdentity::Guest("g".to_string()))
        .await
        .unwrap();

    let history = f.service.history(&user_id).await.unwrap();
    assert_eq!(history.total, 2);
    assert!(history.analyses[0].image_url.starts_with("data:image/webp"));
    assert_eq!(history.analyses[0].result[0].code, "DRY_FLAT");
    assert!(history.analyses[0].result[0].symbol_id.is_some());
    assert_eq!(history.analyses[0].user_id.as_deref(), Some(user_id.as_str()));
}

#[tokio::test]
async fn test_premium_member_without_plan_gets_daily_limit() {
    let server = MockServer::start().await;
    let f = setup(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(r#"{"symbols": []}"#))
        .expect(3)
        .mount(&server)
        .await;

    let user_id = member(&f.users).await;
    f.users.set_premium(&user_id, true).await.unwrap();
    let identity = UsageIdentity::Member(user_id);

    for _ in 0..3 {
        f.service
            .analyze_image(IMAGE, "image/png", &identity)
            .await
            .unwrap();
    }

    match f.service.analyze_image(IMAGE, "image/png", &identity).await {
        Err(AnalyzeError::QuotaExceeded(message)) => {
            assert_eq!(message, "daily analysis limit exceeded")
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.detected_symbols)),
    }
}
