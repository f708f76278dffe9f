use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};
use std::hash::Hash;
use std::num::NonZeroU32;
use std::time::Duration;

#[derive(Debug)]
pub enum RateLimitResult {
    Allowed,
    Disallowed { retry_after: Duration },
}

/// Keyed limiter; a zero rate turns it into a pass-through.
pub struct RateLimiterController<K: Hash + Eq + Clone> {
    limiter: Option<RateLimiter<K, DashMapStateStore<K>, DefaultClock>>,
    retry_time: Duration,
}

impl<K> RateLimiterController<K>
where
    K: Hash + Eq + Clone + Send + Sync,
{
    pub fn new(requests_per_second: u32, retry_time: Duration) -> Self {
        let limiter = NonZeroU32::new(requests_per_second)
            .map(|rate| RateLimiter::keyed(Quota::per_second(rate)));
        RateLimiterController {
            limiter,
            retry_time,
        }
    }

    pub fn check(&self, key: &K) -> RateLimitResult {
        let Some(limiter) = &self.limiter else {
            return RateLimitResult::Allowed;
        };
        match limiter.check_key(key) {
            Ok(_) => RateLimitResult::Allowed,
            Err(negative) => {
                let calculated_retry = negative.wait_time_from(DefaultClock::default().now());
                let retry_after = calculated_retry.max(self.retry_time);
                RateLimitResult::Disallowed { retry_after }
            }
        }
    }

    /// Drops state for keys whose quota has fully replenished.
    pub fn prune(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }
}
