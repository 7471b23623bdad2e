//! Entropy source used for random identifiers, clock-sequence seeding, and
//! the random node-id fallback.

use rand::Rng;

/// Fills `buf` with bytes from the thread-local CSPRNG.
///
/// Identifier generation must never proceed with partial entropy; a failing
/// random source aborts the process instead of returning weak bytes.
pub(crate) fn fill_random(buf: &mut [u8]) {
    rand::rng().fill_bytes(buf);
}

/// Two entropy bytes as a `u16`, for clock-sequence seeding.
pub(crate) fn random_u16() -> u16 {
    let mut b = [0u8; 2];
    fill_random(&mut b);
    u16::from_be_bytes(b)
}
