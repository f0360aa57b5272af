// ABOUTME: Business constants shared by the quota, catalog, and analyze layers
// ABOUTME: Limits, defaults, and supported languages

/// Analyses per day for guests and free members
pub const FREE_ANALYSIS_LIMIT: u32 = 3;

/// Length of a subscription period in days
pub const MONTHLY_PLAN_DAYS: i64 = 30;

/// Credits granted by one CREDITS plan purchase unless configured otherwise
pub const DEFAULT_CREDIT_PACK_SIZE: i64 = 10;

/// Quota days roll over at local midnight in this offset (KST)
pub const DEFAULT_QUOTA_UTC_OFFSET_HOURS: i32 = 9;

/// Language used for symbol translations when the caller does not pick one
pub const DEFAULT_LANGUAGE: &str = "ko";

/// Languages with seeded symbol translations
pub const SUPPORTED_LANGUAGES: &[&str] = &["ko", "en", "jp"];

/// Largest accepted label photo
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Detections below this confidence are discarded
pub const MIN_SYMBOL_CONFIDENCE: f64 = 0.7;

/// Upper bound on a client supplied guest identifier
pub const GUEST_ID_MAX_LEN: usize = 128;

/// Upper bound on a material search term
pub const MATERIAL_SEARCH_MAX_LEN: usize = 100;

/// Number of analyses returned by the history endpoint
pub const ANALYSIS_HISTORY_LIMIT: i64 = 20;

/// Characters of the encoded image kept in the stored image reference
pub const IMAGE_REFERENCE_PREVIEW_CHARS: usize = 100;
