// ABOUTME: Core types, constants, and utilities for LaundryLens
// ABOUTME: Foundational package providing shared enums and quota-day arithmetic across all packages

pub mod constants;
pub mod quota;
pub mod types;
pub mod utils;

// Re-export main types
pub use types::{
    Frequency, ParseEnumError, PaymentStatus, PlanType, SocialProvider, SubscriptionStatus,
    SymbolCategory, UsageAction, UsageIdentity,
};

// Re-export quota clock
pub use quota::{QuotaClock, QuotaClockError};

// Re-export utilities
pub use utils::{generate_id, generate_order_id, normalize_language, truncate};
