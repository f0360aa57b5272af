// ABOUTME: Shared application state handed to every router
// ABOUTME: Wires storages, domain services, and outbound clients from configuration

use std::sync::Arc;

use laundrylens_ai::{AIServiceError, AnalysisHistoryStorage, AnalyzeService, VisionService};
use laundrylens_auth::{AuthError, AuthService, GoogleClient, JwtService, KakaoClient};
use laundrylens_billing::{
    BillingError, PaymentService, PaymentStorage, SubscriptionService, SubscriptionStorage,
    TossClient, UsageLogStorage,
};
use laundrylens_catalog::{MaterialService, MaterialStorage, SymbolService, SymbolStorage};
use laundrylens_config::Config;
use laundrylens_core::{QuotaClock, QuotaClockError};
use laundrylens_security::{EncryptionError, TokenCipher};
use laundrylens_users::UserStorage;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Token encryption setup failed: {0}")]
    Encryption(#[from] EncryptionError),
    #[error("Social login setup failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Vision client setup failed: {0}")]
    Vision(#[from] AIServiceError),
    #[error("Payment client setup failed: {0}")]
    Billing(#[from] BillingError),
    #[error("Invalid quota clock: {0}")]
    QuotaClock(#[from] QuotaClockError),
}

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub symbols: SymbolService,
    pub materials: MaterialService,
    pub subscriptions: SubscriptionService,
    pub payments: PaymentService,
    pub analyze: AnalyzeService,
    /// Browser app that receives the OAuth callback redirect
    pub frontend_url: String,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Result<Self, StateError> {
        let cipher = TokenCipher::from_secret(&config.token_encryption_key)?;
        let users = UserStorage::new(pool.clone(), cipher);

        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_ttl,
            config.jwt.refresh_ttl,
        );
        let kakao = KakaoClient::new(config.kakao.clone())?;
        let google = GoogleClient::new(config.google.clone())?;
        let auth = AuthService::new(users.clone(), jwt, Arc::new(kakao), Arc::new(google));

        let usage = UsageLogStorage::new(pool.clone());
        let clock = QuotaClock::from_utc_offset_hours(config.billing.quota_utc_offset_hours)?;
        let subscriptions = SubscriptionService::new(
            SubscriptionStorage::new(pool.clone()),
            usage.clone(),
            users,
            clock,
        );

        let payments = PaymentService::new(
            PaymentStorage::new(pool.clone()),
            TossClient::new(&config.toss)?,
            config.billing.credit_pack_size,
        );

        let symbol_storage = SymbolStorage::new(pool.clone());
        let vision = VisionService::new(&config.openai)?;
        info!("Vision model: {}", vision.model());
        let analyze = AnalyzeService::new(
            vision,
            symbol_storage.clone(),
            AnalysisHistoryStorage::new(pool.clone()),
            usage,
            subscriptions.clone(),
        );

        Ok(Self {
            auth,
            symbols: SymbolService::new(symbol_storage),
            materials: MaterialService::new(MaterialStorage::new(pool)),
            subscriptions,
            payments,
            analyze,
            frontend_url: config.server.frontend_url.clone(),
        })
    }
}
