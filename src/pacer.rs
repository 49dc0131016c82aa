use std::num::NonZeroU32;
use std::thread;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;

pub const DEFAULT_REQUESTS_PER_SEC: u32 = 10;

/// Token-bucket gate in front of every remote call. The upstream policy
/// for development credentials is 20 requests per second; the default
/// here stays under it.
pub struct Pacer {
    limiter: DefaultDirectRateLimiter,
    clock: DefaultClock,
}

impl Pacer {
    pub fn new(requests_per_sec: u32) -> Self {
        let per_sec = NonZeroU32::new(requests_per_sec).unwrap_or(nonzero!(1u32));
        Self {
            limiter: RateLimiter::direct(Quota::per_second(per_sec)),
            clock: DefaultClock::default(),
        }
    }

    /// Blocks the calling thread until a request slot is available.
    pub fn acquire(&self) {
        while let Err(not_until) = self.limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_SEC)
    }
}
