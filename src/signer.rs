//! Assertion signing: builds the signed JWT exchanged for an access token.

use jiff::Timestamp;
use pkcs8::DecodePrivateKey as _;
use rsa::pkcs1::{DecodeRsaPrivateKey as _, EncodeRsaPrivateKey as _};
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::Error;

/// Static inputs for one signed assertion, derived from the client identity.
#[derive(Clone)]
pub struct AssertionConfig {
    pub client_id: String,
    pub audience_url: String,
    pub key_alias: String,
    pub private_key: Option<String>,
    pub private_key_path: Option<String>,
    pub private_key_passphrase: Option<String>,
    pub scope: String,
    pub assertion_ttl_secs: u64,
    pub issued_at_offset_secs: i64,
}

impl AssertionConfig {
    pub fn from_client(config: &ClientConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            audience_url: config.audience_url.clone(),
            key_alias: config.key_alias.clone(),
            private_key: config.private_key.clone(),
            private_key_path: config.private_key_path.clone(),
            private_key_passphrase: config.private_key_passphrase.clone(),
            scope: config.scope.clone(),
            assertion_ttl_secs: config.assertion_ttl_secs,
            issued_at_offset_secs: config.issued_at_offset_secs,
        }
    }

    fn private_key_pem(&self) -> Result<String, Error> {
        if let Some(pem) = self.private_key.as_ref() {
            return Ok(pem.clone());
        }
        let path = self
            .private_key_path
            .as_ref()
            .ok_or_else(|| Error::Config("neither private_key nor private_key_path set".into()))?;
        std::fs::read_to_string(path)
            .map_err(|e| Error::Key(format!("private key file '{path}' unreadable: {e}")))
    }
}

/// Produces a signed assertion string from static client properties.
///
/// Signing failures are surfaced as-is and never retried here; the refresh
/// gate treats them like any other refresh failure.
pub trait AssertionSigner: Send + Sync {
    fn sign(&self, config: &AssertionConfig) -> Result<String, Error>;
}

/// RS256 signer backed by a PEM private key (encrypted PKCS#8 with
/// passphrase, plain PKCS#8, or PKCS#1).
#[derive(Clone, Copy, Debug, Default)]
pub struct PemAssertionSigner;

impl AssertionSigner for PemAssertionSigner {
    fn sign(&self, config: &AssertionConfig) -> Result<String, Error> {
        let pem = config.private_key_pem()?;
        let key = load_rsa_private_key(&pem, config.private_key_passphrase.as_deref())?;

        let now = Timestamp::now().as_second();

        #[derive(Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            sub: &'a str,
            aud: &'a str,
            exp: i64,
            iat: i64,
            scope: &'a str,
        }
        let claims = Claims {
            iss: &config.client_id,
            sub: &config.client_id,
            aud: &config.audience_url,
            exp: now + config.assertion_ttl_secs as i64,
            iat: now + config.issued_at_offset_secs,
            scope: &config.scope,
        };

        let pkcs1 = key
            .to_pkcs1_der()
            .map_err(|e| Error::Key(format!("PKCS#1 DER encode failed: {e}")))?;
        let enc_key = jsonwebtoken::EncodingKey::from_rsa_der(pkcs1.as_bytes());
        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        header.kid = Some(config.key_alias.clone());
        let assertion = jsonwebtoken::encode(&header, &claims, &enc_key)
            .map_err(|e| Error::JwtSign(format!("JWT signing failed: {e}")))?;
        debug!(client_id = %config.client_id, "assertion signed");
        Ok(assertion)
    }
}

fn load_rsa_private_key(
    pem_str: &str,
    passphrase: Option<&str>,
) -> Result<rsa::RsaPrivateKey, Error> {
    if let Ok(blocks) = pem::parse_many(pem_str.as_bytes()) {
        for block in &blocks {
            match block.tag() {
                "ENCRYPTED PRIVATE KEY" => {
                    let pass = passphrase.ok_or_else(|| {
                        Error::Key("encrypted private key provided but no passphrase set".into())
                    })?;
                    return rsa::RsaPrivateKey::from_pkcs8_encrypted_der(block.contents(), pass)
                        .map_err(|e| Error::Key(format!("PKCS#8 decryption failed: {e}")));
                }
                "PRIVATE KEY" => {
                    return rsa::RsaPrivateKey::from_pkcs8_der(block.contents())
                        .map_err(|e| Error::Key(format!("PKCS#8 parse failed: {e}")));
                }
                "RSA PRIVATE KEY" => {
                    return rsa::RsaPrivateKey::from_pkcs1_der(block.contents())
                        .map_err(|e| Error::Key(format!("PKCS#1 parse failed: {e}")));
                }
                _ => continue,
            }
        }
    }

    if let Some(pass) = passphrase
        && let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_encrypted_pem(pem_str, pass)
    {
        return Ok(key);
    }
    if let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_pem(pem_str) {
        return Ok(key);
    }
    if let Ok(key) = rsa::RsaPrivateKey::from_pkcs1_pem(pem_str) {
        return Ok(key);
    }

    Err(Error::Key(
        "invalid RSA private key: unsupported format or incorrect passphrase".into(),
    ))
}
