// ABOUTME: Integration tests for the checkout flow against a mocked Toss API
// ABOUTME: Covers preparation, confirmation guards, plan activation, and cancellation

use laundrylens_billing::{
    BillingError, ConfirmPaymentInput, CreatePaymentInput, Payment, PaymentService, PaymentStorage,
    SubscriptionService, SubscriptionStorage, TossClient, UsageLogStorage,
};
use laundrylens_config::TossConfig;
use laundrylens_core::{
    PaymentStatus, PlanType, QuotaClock, SocialProvider, SubscriptionStatus,
};
use laundrylens_security::TokenCipher;
use laundrylens_storage::connect_in_memory;
use laundrylens_users::{CreateUserInput, ProviderTokens, UserStorage};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET_KEY: &str = "test_sk";
// base64("test_sk:")
const BASIC_AUTH: &str = "Basic dGVzdF9zazo=";

struct Fixture {
    users: UserStorage,
    subscriptions: SubscriptionService,
    payments: PaymentService,
}

async fn setup(server: &MockServer, secret_key: Option<&str>) -> Fixture {
    let pool = connect_in_memory().await.unwrap();
    let users = UserStorage::new(pool.clone(), TokenCipher::from_secret("test-secret").unwrap());
    let subscriptions = SubscriptionService::new(
        SubscriptionStorage::new(pool.clone()),
        UsageLogStorage::new(pool.clone()),
        users.clone(),
        QuotaClock::default(),
    );
    let toss = TossClient::new(&TossConfig {
        client_key: None,
        secret_key: secret_key.map(str::to_string),
        api_url: server.uri(),
    })
    .unwrap();
    let payments = PaymentService::new(
        PaymentStorage::new(pool),
        toss,
        10,
    );

    Fixture {
        users,
        subscriptions,
        payments,
    }
}

async fn member(users: &UserStorage, provider_id: &str) -> String {
    users
        .create_with_social_account(
            CreateUserInput {
                email: None,
                nickname: format!("member-{}", provider_id),
                profile_image: None,
            },
            SocialProvider::Google,
            provider_id,
            &ProviderTokens::default(),
        )
        .await
        .unwrap()
        .id
}

fn toss_payment(payment_key: &str, order_id: &str, status: &str) -> serde_json::Value {
    json!({
        "paymentKey": payment_key,
        "orderId": order_id,
        "status": status,
        "totalAmount": 9900,
        "method": "카드",
        "approvedAt": "2024-01-01T12:00:00+09:00"
    })
}

fn confirm(order_id: &str, payment_key: &str, amount: i64) -> ConfirmPaymentInput {
    ConfirmPaymentInput {
        order_id: order_id.to_string(),
        payment_key: payment_key.to_string(),
        amount,
    }
}

#[tokio::test]
async fn test_create_payment() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;

    let payment = f
        .payments
        .create_payment(
            &user_id,
            CreatePaymentInput {
                amount: 9900,
                plan_type: PlanType::Monthly,
            },
        )
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(payment.order_id.starts_with("order_"));
    assert!(payment.payment_key.is_none());

    assert!(matches!(
        f.payments
            .create_payment(
                &user_id,
                CreatePaymentInput {
                    amount: 0,
                    plan_type: PlanType::Monthly,
                },
            )
            .await,
        Err(BillingError::InvalidAmount(0))
    ));
}

#[tokio::test]
async fn test_confirm_activates_monthly_plan() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;

    let payment = f
        .payments
        .create_payment(
            &user_id,
            CreatePaymentInput {
                amount: 9900,
                plan_type: PlanType::Monthly,
            },
        )
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/payments/confirm"))
        .and(header("authorization", BASIC_AUTH))
        .and(body_json(json!({
            "paymentKey": "pk_1",
            "orderId": payment.order_id,
            "amount": 9900
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(toss_payment("pk_1", &payment.order_id, "DONE")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let confirmed = f
        .payments
        .confirm_payment(&user_id, confirm(&payment.order_id, "pk_1", 9900))
        .await
        .unwrap();
    assert_eq!(confirmed.status, PaymentStatus::Completed);
    assert_eq!(confirmed.payment_key.as_deref(), Some("pk_1"));

    let current = f
        .subscriptions
        .current_subscription(&user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.plan_type, PlanType::Monthly);
    assert!(f.users.get_user(&user_id).await.unwrap().is_premium);

    // Second confirmation never reaches Toss
    assert!(matches!(
        f.payments
            .confirm_payment(&user_id, confirm(&payment.order_id, "pk_1", 9900))
            .await,
        Err(BillingError::AlreadyCompleted)
    ));
}

#[tokio::test]
async fn test_confirm_credit_plan_grants_pack() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;

    let payment = f
        .payments
        .create_payment(
            &user_id,
            CreatePaymentInput {
                amount: 4900,
                plan_type: PlanType::Credits,
            },
        )
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/payments/confirm"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(toss_payment("pk_2", &payment.order_id, "DONE")),
        )
        .mount(&server)
        .await;

    f.payments
        .confirm_payment(&user_id, confirm(&payment.order_id, "pk_2", 4900))
        .await
        .unwrap();

    let status = f.subscriptions.subscription_status(&user_id).await.unwrap();
    assert_eq!(status.credits_remaining, Some(10));
}

#[tokio::test]
async fn test_confirm_guards() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let owner = member(&f.users, "1").await;
    let stranger = member(&f.users, "2").await;

    let payment = f
        .payments
        .create_payment(
            &owner,
            CreatePaymentInput {
                amount: 9900,
                plan_type: PlanType::Monthly,
            },
        )
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/payments/confirm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        f.payments
            .confirm_payment(&owner, confirm("order_missing", "pk", 9900))
            .await,
        Err(BillingError::PaymentNotFound)
    ));
    assert!(matches!(
        f.payments
            .confirm_payment(&stranger, confirm(&payment.order_id, "pk", 9900))
            .await,
        Err(BillingError::PaymentNotFound)
    ));
    assert!(matches!(
        f.payments
            .confirm_payment(&owner, confirm(&payment.order_id, "pk", 100))
            .await,
        Err(BillingError::AmountMismatch)
    ));
}

#[tokio::test]
async fn test_gateway_rejection_keeps_order_pending() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;

    let payment = f
        .payments
        .create_payment(
            &user_id,
            CreatePaymentInput {
                amount: 9900,
                plan_type: PlanType::Monthly,
            },
        )
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/payments/confirm"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "INVALID_CARD_NUMBER",
            "message": "카드번호를 다시 확인해주세요."
        })))
        .mount(&server)
        .await;

    let err = f
        .payments
        .confirm_payment(&user_id, confirm(&payment.order_id, "pk_1", 9900))
        .await
        .unwrap_err();
    match err {
        BillingError::Gateway(message) => assert_eq!(message, "카드번호를 다시 확인해주세요."),
        other => panic!("unexpected error: {:?}", other),
    }

    let stored = f.payments.payment_by_id(&user_id, &payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
    assert!(f.subscriptions.current_subscription(&user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_confirm_without_secret_key() {
    let server = MockServer::start().await;
    let f = setup(&server, None).await;
    let user_id = member(&f.users, "1").await;

    let payment = f
        .payments
        .create_payment(
            &user_id,
            CreatePaymentInput {
                amount: 9900,
                plan_type: PlanType::Monthly,
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        f.payments
            .confirm_payment(&user_id, confirm(&payment.order_id, "pk_1", 9900))
            .await,
        Err(BillingError::GatewayNotConfigured)
    ));
}

#[tokio::test]
async fn test_cancel_payment_ends_subscription() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;

    let payment = f
        .payments
        .create_payment(
            &user_id,
            CreatePaymentInput {
                amount: 9900,
                plan_type: PlanType::Monthly,
            },
        )
        .await
        .unwrap();

    // Pending orders cannot be refunded
    assert!(matches!(
        f.payments.cancel_payment(&user_id, &payment.id, None).await,
        Err(BillingError::InvalidPaymentState(_))
    ));

    Mock::given(method("POST"))
        .and(path("/payments/confirm"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(toss_payment("pk_9", &payment.order_id, "DONE")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/pk_9/cancel"))
        .and(header("authorization", BASIC_AUTH))
        .and(body_json(json!({ "cancelReason": "changed my mind" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(toss_payment("pk_9", &payment.order_id, "CANCELED")),
        )
        .expect(1)
        .mount(&server)
        .await;

    f.payments
        .confirm_payment(&user_id, confirm(&payment.order_id, "pk_9", 9900))
        .await
        .unwrap();

    let cancelled = f
        .payments
        .cancel_payment(&user_id, &payment.id, Some("changed my mind"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, PaymentStatus::Cancelled);

    assert!(!f.users.get_user(&user_id).await.unwrap().is_premium);
    let history = f.subscriptions.subscription_history(&user_id).await.unwrap();
    assert_eq!(history.subscriptions[0].status, SubscriptionStatus::Cancelled);
}

#[tokio::test]
async fn test_payment_history_is_per_user() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let alice = member(&f.users, "1").await;
    let bob = member(&f.users, "2").await;

    for amount in [1000, 2000] {
        f.payments
            .create_payment(
                &alice,
                CreatePaymentInput {
                    amount,
                    plan_type: PlanType::Credits,
                },
            )
            .await
            .unwrap();
    }

    let history = f.payments.payment_history(&alice).await.unwrap();
    assert_eq!(history.total, 2);
    assert_eq!(history.payments[0].amount, 2000);

    assert_eq!(f.payments.payment_history(&bob).await.unwrap().total, 0);
    assert!(matches!(
        f.payments
            .payment_by_id(&bob, &history.payments[0].id)
            .await,
        Err(BillingError::PaymentNotFound)
    ));
}

async fn mount_confirm(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/payments/confirm"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(toss_payment("pk", "order", "DONE")),
        )
        .mount(server)
        .await;
}

async fn paid(
    f: &Fixture,
    user_id: &str,
    plan_type: PlanType,
    amount: i64,
    payment_key: &str,
) -> Payment {
    let payment = f
        .payments
        .create_payment(user_id, CreatePaymentInput { amount, plan_type })
        .await
        .unwrap();
    f.payments
        .confirm_payment(user_id, confirm(&payment.order_id, payment_key, amount))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_refund_only_ends_the_plan_it_bought() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;
    mount_confirm(&server).await;
    for key in ["pk_old", "pk_new"] {
        Mock::given(method("POST"))
            .and(path(format!("/payments/{}/cancel", key)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(toss_payment(key, "order", "CANCELED")),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let old = paid(&f, &user_id, PlanType::Credits, 4900, "pk_old").await;
    let new = paid(&f, &user_id, PlanType::Monthly, 9900, "pk_new").await;

    let refunded = f
        .payments
        .cancel_payment(&user_id, &old.id, None)
        .await
        .unwrap();
    assert_eq!(refunded.status, PaymentStatus::Cancelled);

    // The monthly plan was paid separately and survives
    let current = f
        .subscriptions
        .current_subscription(&user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.plan_type, PlanType::Monthly);
    assert_eq!(current.payment_id.as_deref(), Some(new.id.as_str()));
    assert!(f.users.get_user(&user_id).await.unwrap().is_premium);

    f.payments
        .cancel_payment(&user_id, &new.id, None)
        .await
        .unwrap();
    assert!(f.subscriptions.current_subscription(&user_id).await.unwrap().is_none());
    assert!(!f.users.get_user(&user_id).await.unwrap().is_premium);
}

#[tokio::test]
async fn test_gateway_cancel_failure_keeps_payment_and_plan() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;
    mount_confirm(&server).await;
    Mock::given(method("POST"))
        .and(path("/payments/pk_7/cancel"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "NOT_CANCELABLE_PAYMENT",
            "message": "취소할 수 없는 결제입니다."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payment = paid(&f, &user_id, PlanType::Monthly, 9900, "pk_7").await;

    match f.payments.cancel_payment(&user_id, &payment.id, None).await {
        Err(BillingError::Gateway(message)) => assert_eq!(message, "취소할 수 없는 결제입니다."),
        other => panic!("unexpected result: {:?}", other),
    }

    let stored = f.payments.payment_by_id(&user_id, &payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Completed);
    assert!(f.subscriptions.current_subscription(&user_id).await.unwrap().is_some());
    assert!(f.users.get_user(&user_id).await.unwrap().is_premium);
}

#[tokio::test]
async fn test_failed_activation_leaves_order_pending() {
    let server = MockServer::start().await;
    let f = setup(&server, Some(SECRET_KEY)).await;
    let user_id = member(&f.users, "1").await;
    mount_confirm(&server).await;

    let payment = f
        .payments
        .create_payment(
            &user_id,
            CreatePaymentInput {
                amount: 9900,
                plan_type: PlanType::Monthly,
            },
        )
        .await
        .unwrap();
    f.users.soft_delete(&user_id).await.unwrap();

    assert!(matches!(
        f.payments
            .confirm_payment(&user_id, confirm(&payment.order_id, "pk_1", 9900))
            .await,
        Err(BillingError::UserNotFound)
    ));

    let stored = f.payments.payment_by_id(&user_id, &payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
    assert!(stored.payment_key.is_none());
    assert_eq!(
        f.subscriptions.subscription_history(&user_id).await.unwrap().total,
        0
    );
}
