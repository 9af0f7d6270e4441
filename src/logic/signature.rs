//! Webhook signature verification
//!
//! Vercel signs each delivery with `x-vercel-signature`, the hex-encoded
//! HMAC-SHA1 of the exact raw request body under the shared drain secret.
//! Verification must run against the bytes as received on the wire; a
//! re-serialized body will not reproduce the digest.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Verify a webhook signature against the raw body.
///
/// Returns false when the signature is absent or not valid hex; the caller
/// decides whether absence itself is tolerated. The digest comparison is
/// constant-time.
pub fn verify(raw_body: &[u8], signature: Option<&str>, secret: &str) -> bool {
    let Some(signature) = signature else {
        return false;
    };

    let Ok(provided) = hex::decode(signature) else {
        return false;
    };

    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);
    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
pub(crate) fn sign(raw_body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);
    hex::encode(mac.finalize().into_bytes())
}
