// ABOUTME: LaundryLens authentication library providing Kakao and Google social login
// ABOUTME: Issues and verifies member session tokens and reconciles provider identities with members

pub mod error;
pub mod jwt;
pub mod oauth;
pub mod service;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, JwtService, TokenPair, TokenType};
pub use oauth::{GoogleClient, KakaoClient, OAuthUser, SocialLoginClient};
pub use service::{AuthService, TokenResponse, UserSummary};
