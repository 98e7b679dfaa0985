//! HS256 session tokens in JWT compact form.
//!
//! `base64url(header).base64url(claims).base64url(hmac_sha256(secret, signing_input))`

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretSlice};
use sha2::Sha256;

use hogwarts_core::service::auth::TokenIssuer;
use hogwarts_types::error::AuthError;
use hogwarts_types::user::{TokenClaims, UserId};

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

pub struct Hs256TokenIssuer {
    secret: SecretSlice<u8>,
    issuer: String,
    ttl: chrono::Duration,
}

impl Hs256TokenIssuer {
    pub fn new(secret: impl Into<Vec<u8>>, issuer: impl Into<String>, ttl: chrono::Duration) -> Self {
        Self {
            secret: SecretSlice::from(secret.into()),
            issuer: issuer.into(),
            ttl,
        }
    }

    /// A random 32-byte secret. Tokens signed with it die with the process.
    pub fn random_secret() -> Vec<u8> {
        let mut secret = vec![0u8; 32];
        OsRng.fill_bytes(&mut secret);
        secret
    }

    fn sign(&self, signing_input: &str) -> Result<Vec<u8>, AuthError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret())
            .map_err(|_| AuthError::InvalidSignature)?;
        mac.update(signing_input.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn issue_at(&self, user_id: &UserId, now: i64) -> Result<String, AuthError> {
        let claims = TokenClaims {
            user_id: *user_id,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| AuthError::Malformed)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.sign(&signing_input)?;
        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::Malformed);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Malformed)?;
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret())
            .map_err(|_| AuthError::InvalidSignature)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let header = URL_SAFE_NO_PAD.decode(header).map_err(|_| AuthError::Malformed)?;
        if header != HEADER.as_bytes() {
            return Err(AuthError::Malformed);
        }
        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| AuthError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;

        if claims.iss != self.issuer {
            return Err(AuthError::InvalidSignature);
        }
        if claims.exp <= now {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

impl TokenIssuer for Hs256TokenIssuer {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.issue_at(user_id, chrono::Utc::now().timestamp())
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }
}
