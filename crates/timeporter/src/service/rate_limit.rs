use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use super::types::ToolName;

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default rate limits per service (requests per second).
pub mod rate_limits {
    /// Toggl throttles aggressively on its reports endpoints; 2/sec keeps
    /// a full workspace fetch under the limit with headroom.
    pub const TOGGL_DEFAULT_RPS: u32 = 2;
    /// Clockify tolerates a higher create rate; 4/sec.
    pub const CLOCKIFY_DEFAULT_RPS: u32 = 4;
}

/// Get the default rate limit for a service.
#[must_use]
pub fn default_rps_for_tool(tool: ToolName) -> u32 {
    match tool {
        ToolName::Toggl => rate_limits::TOGGL_DEFAULT_RPS,
        ToolName::Clockify => rate_limits::CLOCKIFY_DEFAULT_RPS,
    }
}

/// A token-bucket API rate limiter using the governor crate.
///
/// One limiter is constructed per service per sync run and injected into the
/// client for that service; the fetch and create paths go through the same
/// bucket. Waiters are admitted in FIFO order; no other fairness guarantee.
///
/// # Example
///
/// ```ignore
/// use timeporter::service::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(2); // 2 requests per second
///
/// // Before each API call:
/// limiter.wait().await;
/// client.some_api_call().await?;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter with the specified requests per second.
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum requests per second (must be > 0,
    ///   defaults to 1 if 0)
    #[must_use]
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        Self {
            inner: Arc::new(rate_limiter),
        }
    }

    /// Create a limiter with the default rate for a service.
    #[must_use]
    pub fn for_tool(tool: ToolName) -> Self {
        Self::new(default_rps_for_tool(tool))
    }

    /// Wait until a request is allowed by the rate limiter.
    ///
    /// This method will block (asynchronously) until the rate limit allows
    /// another request to proceed. Clones share the same bucket, so waiting
    /// on any clone counts against the shared ceiling.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn first_acquisitions_within_burst_are_immediate() {
        let limiter = ApiRateLimiter::new(10);

        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;

        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn acquisitions_beyond_the_ceiling_are_paced() {
        // Quota of 2/sec: the third acquisition has to wait for a refill,
        // roughly half a second after the burst is spent.
        let limiter = ApiRateLimiter::new(2);

        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn clones_share_the_same_bucket() {
        let limiter = ApiRateLimiter::new(2);
        let clone = limiter.clone();

        let start = Instant::now();
        limiter.wait().await;
        clone.wait().await;
        limiter.wait().await;

        // Third wait paid the refill delay even though it alternated clones.
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[test]
    fn zero_rps_falls_back_to_one() {
        // Must not panic; quota of 0 is nonsensical and clamps to 1.
        let _limiter = ApiRateLimiter::new(0);
    }

    #[test]
    fn default_rps_per_tool() {
        assert_eq!(
            default_rps_for_tool(ToolName::Toggl),
            rate_limits::TOGGL_DEFAULT_RPS
        );
        assert_eq!(
            default_rps_for_tool(ToolName::Clockify),
            rate_limits::CLOCKIFY_DEFAULT_RPS
        );
    }
}
