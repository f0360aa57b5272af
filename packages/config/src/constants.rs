// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across LaundryLens

// Server Configuration
pub const PORT: &str = "PORT";
pub const APP_ENV: &str = "APP_ENV";
pub const NODE_ENV: &str = "NODE_ENV"; // Legacy
pub const CORS_ORIGIN: &str = "CORS_ORIGIN";
pub const FRONTEND_URL: &str = "FRONTEND_URL";

// Database
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";

// JWT Sessions
pub const JWT_SECRET: &str = "JWT_SECRET";
pub const JWT_EXPIRES_IN: &str = "JWT_EXPIRES_IN";
pub const JWT_ACCESS_EXPIRES_IN: &str = "JWT_ACCESS_EXPIRES_IN"; // Legacy
pub const JWT_REFRESH_EXPIRES_IN: &str = "JWT_REFRESH_EXPIRES_IN";

// Kakao OAuth
pub const KAKAO_CLIENT_ID: &str = "KAKAO_CLIENT_ID";
pub const KAKAO_CLIENT_SECRET: &str = "KAKAO_CLIENT_SECRET";
pub const KAKAO_CALLBACK_URL: &str = "KAKAO_CALLBACK_URL";
pub const KAKAO_REDIRECT_URI: &str = "KAKAO_REDIRECT_URI"; // Legacy

// Google OAuth
pub const GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const GOOGLE_CALLBACK_URL: &str = "GOOGLE_CALLBACK_URL";
pub const GOOGLE_REDIRECT_URI: &str = "GOOGLE_REDIRECT_URI"; // Legacy

// OpenAI Vision
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

// Toss Payments
pub const TOSS_CLIENT_KEY: &str = "TOSS_CLIENT_KEY";
pub const TOSS_SECRET_KEY: &str = "TOSS_SECRET_KEY";
pub const TOSS_API_URL: &str = "TOSS_API_URL";

// Billing and Quota
pub const QUOTA_UTC_OFFSET_HOURS: &str = "QUOTA_UTC_OFFSET_HOURS";
pub const CREDIT_PACK_SIZE: &str = "CREDIT_PACK_SIZE";

// Security
pub const TOKEN_ENCRYPTION_KEY: &str = "TOKEN_ENCRYPTION_KEY";

// Defaults
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_JWT_EXPIRES_IN: &str = "7d";
pub const DEFAULT_JWT_REFRESH_EXPIRES_IN: &str = "30d";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TOSS_API_URL: &str = "https://api.tosspayments.com/v1";
