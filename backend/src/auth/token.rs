//! Signed identity tokens.
//!
//! Tokens are HS256-signed with a shared secret. Verification accepts the HMAC family only,
//! so a token whose header names an asymmetric algorithm (or `none`) is rejected before its
//! signature is even looked at.

use super::AuthError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Owner identity (the username).
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], issuer: &str, expiry: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: issuer.to_string(),
            expiry,
        }
    }

    /// Sign a token naming `subject` as owner.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.expiry)
                .ok_or(AuthError::ExpiryOutOfRange)?
                .timestamp(),
            iss: self.issuer.clone(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Check signature, algorithm, issuer and expiry, and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", "clinic-backend", Duration::minutes(5))
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = service();
        let token = svc.issue("clinic-a").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "clinic-a");
        assert_eq!(claims.iss, "clinic-backend");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue("clinic-a").unwrap();
        let other = TokenService::new(b"other-secret", "clinic-backend", Duration::minutes(5));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = service().issue("clinic-a").unwrap();
        let other = TokenService::new(b"test-secret", "someone-else", Duration::minutes(5));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_rejected() {
        let svc = TokenService::new(b"test-secret", "clinic-backend", Duration::seconds(-10));
        let token = svc.issue("clinic-a").unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn test_other_hmac_variant_accepted() {
        let svc = service();
        let claims = Claims {
            sub: "clinic-a".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(1)).timestamp(),
            iss: "clinic-backend".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(svc.verify(&token).unwrap().sub, "clinic-a");
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let svc = TokenService::new(b"test-secret", "clinic-backend", Duration::days(1_000_000_000));
        assert!(matches!(svc.issue("clinic-a"), Err(AuthError::ExpiryOutOfRange)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(service().verify("not.a.token").is_err());
        assert!(service().verify("").is_err());
    }
}
