//! Wall-clock-seeded monotonic nonce generation.
//!
//! The RMP path requires the 64-bit nonce supplied to each call to be
//! strictly monotonic per (signer, account, vault-scope) tuple.
//! [`NonceGenerator`] gives callers a lock-free way to satisfy that without
//! tracking the last value themselves.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Produces nonces satisfying `next > previous`, seeded from wall-clock time
/// so a freshly constructed generator's first nonce is close to "now".
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub fn new() -> NonceGenerator {
        NonceGenerator { last: AtomicU64::new(now_millis()) }
    }

    /// Returns `max(previous + 1, now_millis())`, updating the internal
    /// counter atomically so concurrent callers never observe a repeat.
    pub fn next(&self) -> u64 {
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = previous.saturating_add(1).max(now_millis());
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => {
                    if observed == u64::MAX {
                        log::warn!("nonce generator reached u64::MAX, wrapping is not possible");
                    }
                    previous = observed;
                }
            }
        }
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        NonceGenerator::new()
    }
}

fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_are_strictly_increasing() {
        let generator = NonceGenerator::new();
        let mut previous = generator.next();
        for _ in 0..1000 {
            let next = generator.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn first_nonce_is_close_to_wall_clock() {
        let generator = NonceGenerator::new();
        let nonce = generator.next();
        let now = now_millis();
        assert!(nonce <= now + 1000);
    }
}
