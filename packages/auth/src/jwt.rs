// ABOUTME: HS256 session tokens for members
// ABOUTME: Issues access/refresh pairs and verifies signature, expiry, and token type

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Member id
    pub sub: String,
    pub email: Option<String>,
    pub typ: TokenType,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn generate_tokens(&self, user_id: &str, email: Option<&str>) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(user_id, email, TokenType::Access)?,
            refresh_token: self.issue(user_id, email, TokenType::Refresh)?,
        })
    }

    pub fn issue(&self, user_id: &str, email: Option<&str>, typ: TokenType) -> AuthResult<String> {
        let ttl = match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            typ,
            iat,
            exp: iat.saturating_add(ttl.as_secs() as i64),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, then require the expected token type
    pub fn verify(&self, token: &str, expected: TokenType) -> AuthResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.typ != expected {
            return Err(AuthError::InvalidToken(format!(
                "expected {:?} token",
                expected
            )));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(
            "test-secret",
            Duration::from_secs(7 * 24 * 3600),
            Duration::from_secs(30 * 24 * 3600),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = service();
        let pair = jwt.generate_tokens("user-1", Some("a@example.com")).unwrap();

        let claims = jwt.verify(&pair.access_token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);

        let refresh = jwt.verify(&pair.refresh_token, TokenType::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 30 * 24 * 3600);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let jwt = service();
        let pair = jwt.generate_tokens("user-1", None).unwrap();

        assert!(jwt.verify(&pair.refresh_token, TokenType::Access).is_err());
        assert!(jwt.verify(&pair.access_token, TokenType::Refresh).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue("user-1", None, TokenType::Access).unwrap();
        let other = JwtService::new("other", Duration::from_secs(60), Duration::from_secs(60));
        assert!(matches!(
            other.verify(&token, TokenType::Access),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: None,
            typ: TokenType::Access,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service().verify(&token, TokenType::Access).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(service().verify("not.a.jwt", TokenType::Access).is_err());
        assert!(service().verify("", TokenType::Access).is_err());
    }
}
