//! Webhook request signature check
//!
//! The platform signs the raw request body with HMAC-SHA256 keyed by the
//! channel secret and sends the base64 digest in `x-line-signature`.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Constant-time comparison of `signature` against the body digest.
pub fn verify(channel_secret: &str, body: &[u8], signature: Option<&str>) -> Result<()> {
    let signature = signature.ok_or(Error::MissingSignature)?;
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| Error::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| Error::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| Error::InvalidSignature)
}
