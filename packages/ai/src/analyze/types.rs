// ABOUTME: Analyze results and stored analysis records
// ABOUTME: Serialized in camelCase for the HTTP layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A detected symbol, linked to the catalog when its code is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSymbol {
    pub code: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub detected_symbols: Vec<DetectedSymbol>,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_tips: Option<String>,
    /// Milliseconds spent in the vision call
    pub processing_time: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub guest_id: Option<String>,
    pub image_url: String,
    pub result: Vec<DetectedSymbol>,
    pub care_tips: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryList {
    pub analyses: Vec<AnalysisRecord>,
    pub total: usize,
}
