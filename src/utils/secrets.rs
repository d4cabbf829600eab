use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::consts::order_const::PORTAL_TOKEN_LEN;

/// Opaque per-order portal secret. Possession of this string is the only
/// authorization a customer ever presents, so it comes straight from the
/// thread CSPRNG and never from any customer-supplied value.
pub fn generate_portal_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PORTAL_TOKEN_LEN)
        .map(char::from)
        .collect::<String>()
}

/// Cheap structural pre-check so obviously malformed tokens never reach the
/// database. Failing this is indistinguishable from an unknown token.
pub fn portal_token_shape_ok(token: &str) -> bool {
    token.len() == PORTAL_TOKEN_LEN && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// The admin session token is a deterministic one-way hash of the shared
/// secret: any previously issued cookie stays valid until the secret rotates.
pub fn admin_session_token(admin_password: &str) -> String {
    sha256_hex(admin_password)
}

pub fn sha256_hex(val: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(val.as_bytes());

    format!("{:x}", hasher.finalize())
}

/// Constant-time equality for secret comparison. Length is not secret here
/// (both token formats are fixed width), so an early length mismatch is fine.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
