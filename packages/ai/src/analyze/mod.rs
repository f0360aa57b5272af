pub mod error;
pub mod service;
pub mod types;

pub use error::{AnalyzeError, AnalyzeServiceResult};
pub use service::AnalyzeService;
pub use types::{AnalysisRecord, AnalyzeResult, DetectedSymbol, HistoryList};
