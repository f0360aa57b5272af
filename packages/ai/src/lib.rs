// ABOUTME: Laundry label analysis for LaundryLens
// ABOUTME: OpenAI vision client, analysis history, and the quota-gated analyze flow

pub mod analyze;
pub mod history;
pub mod vision;

// Re-export vision types
pub use vision::{AIServiceError, AIServiceResult, VisionAnalysis, VisionService, VisionSymbol};

// Re-export history storage
pub use history::AnalysisHistoryStorage;

// Re-export analyze flow
pub use analyze::{
    AnalysisRecord, AnalyzeError, AnalyzeResult, AnalyzeService, AnalyzeServiceResult,
    DetectedSymbol, HistoryList,
};
