//! Session token verification
//!
//! Sessions are issued by the auth backend as HS256 JWTs; this service only
//! verifies them.

use jsonwebtoken::{decode, errors::Error as JwtError, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID issued by the auth backend
    pub sub: String,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

/// Verifies HS256 session tokens against a shared secret
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    /// Creates a verifier from the shared session secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verifies a session token and returns its claims
    ///
    /// # Errors
    ///
    /// Returns a `jsonwebtoken` error if the token is malformed, has an
    /// invalid signature, or is expired
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(secret: &str, sub: &str, exp: i64) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token encoding succeeds")
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = SessionVerifier::new("test-secret");
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = mint("test-secret", "user-1", exp);

        let claims = verifier.verify(&token).expect("token verifies");
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = SessionVerifier::new("test-secret");
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = mint("other-secret", "user-1", exp);

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let verifier = SessionVerifier::new("test-secret");
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = mint("test-secret", "user-1", exp);

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let verifier = SessionVerifier::new("test-secret");
        assert!(verifier.verify("not-a-token").is_err());
    }
}
