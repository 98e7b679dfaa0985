//! OS-backed dice for game stats.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;

/// Uniform-enough roll in `[0, n)`; `n == 0` yields 0.
pub fn roll_below(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    OsRng.next_u32() % n
}
