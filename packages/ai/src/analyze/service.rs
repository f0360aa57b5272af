// ABOUTME: Quota-gated label analysis
// ABOUTME: Checks the allowance, runs the vision model, links catalog symbols, and records usage

use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine};
use laundrylens_billing::{Allowance, BillingError, SubscriptionService, UsageLogStorage, UsageSummary};
use laundrylens_catalog::SymbolStorage;
use laundrylens_core::constants::{ANALYSIS_HISTORY_LIMIT, IMAGE_REFERENCE_PREVIEW_CHARS};
use laundrylens_core::{truncate, UsageAction, UsageIdentity};
use tracing::{info, warn};

use super::error::{AnalyzeError, AnalyzeServiceResult};
use super::types::{AnalyzeResult, DetectedSymbol, HistoryList};
use crate::history::AnalysisHistoryStorage;
use crate::vision::VisionService;

const DAILY_LIMIT_MESSAGE: &str = "daily analysis limit exceeded";
const NO_CREDITS_MESSAGE: &str = "no credits remaining";

#[derive(Clone)]
pub struct AnalyzeService {
    vision: VisionService,
    symbols: SymbolStorage,
    history: AnalysisHistoryStorage,
    usage: UsageLogStorage,
    subscriptions: SubscriptionService,
}

impl AnalyzeService {
    pub fn new(
        vision: VisionService,
        symbols: SymbolStorage,
        history: AnalysisHistoryStorage,
        usage: UsageLogStorage,
        subscriptions: SubscriptionService,
    ) -> Self {
        Self {
            vision,
            symbols,
            history,
            usage,
            subscriptions,
        }
    }

    pub async fn analyze_image(
        &self,
        image: &[u8],
        mime: &str,
        identity: &UsageIdentity,
    ) -> AnalyzeServiceResult<AnalyzeResult> {
        let allowance = self.subscriptions.allowance(identity).await?;
        if !allowance.permits_analysis() {
            let message = match allowance {
                Allowance::Credits { .. } => NO_CREDITS_MESSAGE,
                _ => DAILY_LIMIT_MESSAGE,
            };
            info!("Analysis denied for {}: {}", identity, message);
            return Err(AnalyzeError::QuotaExceeded(message.to_string()));
        }

        let encoded = STANDARD.encode(image);

        let started = Instant::now();
        let analysis = self.vision.analyze_encoded(&encoded, mime).await?;
        let processing_time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let codes: Vec<String> = analysis.symbols.iter().map(|s| s.code.clone()).collect();
        let known = self.symbols.ids_for_codes(&codes).await?;
        let detected_symbols: Vec<DetectedSymbol> = analysis
            .symbols
            .into_iter()
            .map(|s| DetectedSymbol {
                symbol_id: known.get(&s.code).cloned(),
                code: s.code,
                confidence: s.confidence,
            })
            .collect();

        let image_url = format!(
            "data:{};base64,{}...",
            mime,
            truncate(&encoded, IMAGE_REFERENCE_PREVIEW_CHARS)
        );
        let record = self
            .history
            .create(
                identity,
                &image_url,
                &detected_symbols,
                analysis.care_tips.as_deref(),
            )
            .await?;

        self.usage.record(identity, UsageAction::Analyze).await?;

        if let (Allowance::Credits { .. }, UsageIdentity::Member(user_id)) = (allowance, identity) {
            match self.subscriptions.use_credits(user_id, 1).await {
                Ok(usage) => info!(
                    "User {} has {} credits left",
                    user_id, usage.remaining_credits
                ),
                Err(BillingError::InsufficientCredits) | Err(BillingError::NoActiveSubscription) => {
                    warn!("Credit for analysis {} could not be deducted", record.id)
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            "Analysis {} for {} found {} symbols in {}ms",
            record.id,
            identity,
            detected_symbols.len(),
            processing_time
        );

        Ok(AnalyzeResult {
            detected_symbols,
            image_url: record.image_url,
            care_tips: analysis.care_tips,
            processing_time,
        })
    }

    pub async fn remaining_analyses(&self, identity: &UsageIdentity) -> AnalyzeServiceResult<UsageSummary> {
        Ok(self.subscriptions.usage_summary(identity).await?)
    }

    /// Newest analyses of a member
    pub async fn history(&self, user_id: &str) -> AnalyzeServiceResult<HistoryList> {
        let analyses = self
            .history
            .list_for_user(user_id, ANALYSIS_HISTORY_LIMIT)
            .await?;
        Ok(HistoryList {
            total: analyses.len(),
            analyses,
        })
    }
}
