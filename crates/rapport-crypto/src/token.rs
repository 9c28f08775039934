use std::time::Duration;

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;

use rapport_types::api::Claims;

/// Session lifetime.
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

/// Signs and verifies session tokens with a shared server secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, TOKEN_TTL)
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now as usize,
            exp: (now + self.ttl.as_secs() as i64) as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Fails closed: bad signature, missing or non-numeric `sub`, and an
    /// `exp` in the past are all rejections.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn sign(claims: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue(42).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[test]
    fn expiry_is_one_day_out() {
        let issuer = TokenIssuer::new(SECRET);
        let claims = issuer.verify(&issuer.issue(1).unwrap()).unwrap();

        assert_eq!(claims.exp - claims.iat, 86_400);
        assert!((claims.iat as i64 - now()).abs() <= 5);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = TokenIssuer::new("other-secret").issue(1).unwrap();
        assert_eq!(TokenIssuer::new(SECRET).verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_token_rejected() {
        let token = sign(
            &serde_json::json!({ "sub": 1, "iat": now() - 7200, "exp": now() - 3600 }),
            SECRET,
        );
        assert_eq!(TokenIssuer::new(SECRET).verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn missing_user_id_rejected() {
        let token = sign(&serde_json::json!({ "iat": now(), "exp": now() + 3600 }), SECRET);
        assert_eq!(TokenIssuer::new(SECRET).verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn missing_expiry_rejected() {
        let token = sign(&serde_json::json!({ "sub": 1, "iat": now() }), SECRET);
        assert_eq!(TokenIssuer::new(SECRET).verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        assert_eq!(issuer.verify("not.a.token"), Err(TokenError::Invalid));
        assert_eq!(issuer.verify(""), Err(TokenError::Invalid));
    }
}
