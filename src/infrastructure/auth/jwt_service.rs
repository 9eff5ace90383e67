use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tolerated clock skew between the identity provider and this server
const CLOCK_LEEWAY_SECS: u64 = 30;

/// Bearer token claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Verifies HS256 bearer tokens. Signing is kept for the identity provider
/// side and for tests; the server itself never issues tokens.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        let mut validation = Validation::default();
        validation.leeway = CLOCK_LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: chrono::Duration::days(7),
        }
    }

    pub fn sign(&self, user_id: &str, username: &str) -> Result<String, JwtError> {
        let issued = chrono::Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            exp: (issued + self.ttl).timestamp(),
            iat: issued.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Sign(e.to_string()))
    }

    /// Resolve a bearer token to the caller's identity
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.user_id.is_empty() {
            return Err(JwtError::Invalid);
        }
        Ok(data.claims)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    Sign(String),
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Failed to verify token: {0}")]
    Verify(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidToken | ErrorKind::InvalidSignature | ErrorKind::Base64(_) => {
                JwtError::Invalid
            }
            _ => JwtError::Verify(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let service = JwtService::new("secret".to_string());
        let token = service.sign("user-1", "alice").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let issuer = JwtService::new("other-secret".to_string());
        let token = issuer.sign("user-1", "alice").unwrap();

        let service = JwtService::new("secret".to_string());
        assert!(matches!(service.verify(&token), Err(JwtError::Invalid)));
        assert!(service.verify("not-a-token").is_err());
    }
}
