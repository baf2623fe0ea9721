//! Per-caller rate budgets.
//!
//! Two counters guard the upstream APIs: `route-polyline:<caller>` is checked
//! by the request layer once per enrichment, and
//! `nearby-restaurants:<caller>` is checked once per nearby lookup. Both use
//! fixed windows: the first hit opens the window and the count resets when it
//! expires.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::coordinate::{Coordinate, RestaurantCandidate};
use crate::error::EnrichError;
use crate::traits::{Clock, NearbyPlaceProvider, RateLimiter};

/// Number of attempts allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub max_attempts: u32,
    pub window: Duration,
}

impl RateBudget {
    /// Nearby-place lookups per caller.
    pub const NEARBY_RESTAURANTS: RateBudget = RateBudget::per_minute(30);

    /// Route enrichment requests per caller.
    pub const ROUTE_POLYLINE: RateBudget = RateBudget::per_minute(2);

    pub const fn per_minute(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            window: Duration::from_secs(60),
        }
    }
}

pub fn nearby_key(caller_id: &str) -> String {
    format!("nearby-restaurants:{caller_id}")
}

pub fn route_key(caller_id: &str) -> String {
    format!("route-polyline:{caller_id}")
}

/// Spends one unit of `caller_id`'s route request budget.
///
/// Called by the request layer before it invokes the enricher.
pub fn check_route_budget(
    limiter: &dyn RateLimiter,
    caller_id: &str,
    budget: RateBudget,
) -> Result<(), EnrichError> {
    spend(limiter, route_key(caller_id), budget)
}

fn spend(limiter: &dyn RateLimiter, key: String, budget: RateBudget) -> Result<(), EnrichError> {
    if limiter.attempt(&key, budget.max_attempts, budget.window) {
        return Ok(());
    }
    debug!(key = %key, max_attempts = budget.max_attempts, "rate budget exhausted");
    Err(EnrichError::RateLimited {
        key,
        max_attempts: budget.max_attempts,
    })
}

/// Wall-clock backed [`Clock`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A [`Clock`] that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give another
/// to the limiter.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    hits: u32,
    expires_at: Instant,
}

/// Process-local [`RateLimiter`] keyed by string.
#[derive(Debug, Default)]
pub struct InMemoryRateLimiter<C: Clock = SystemClock> {
    clock: C,
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> InMemoryRateLimiter<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Hits recorded for `key` in its active window.
    pub fn attempts(&self, key: &str) -> u32 {
        let now = self.clock.now();
        let mut windows = lock(&self.windows);
        active_window(&mut windows, key, now).map_or(0, |window| window.hits)
    }

    pub fn clear(&self, key: &str) {
        lock(&self.windows).remove(key);
    }

    fn record_hit(windows: &mut HashMap<String, Window>, key: &str, window: Duration, now: Instant) -> u32 {
        match active_window(windows, key, now) {
            Some(active) => {
                active.hits += 1;
                active.hits
            }
            None => {
                windows.insert(
                    key.to_string(),
                    Window {
                        hits: 1,
                        expires_at: now + window,
                    },
                );
                1
            }
        }
    }
}

impl<C: Clock> RateLimiter for InMemoryRateLimiter<C> {
    fn too_many_attempts(&self, key: &str, max_attempts: u32) -> bool {
        let now = self.clock.now();
        let mut windows = lock(&self.windows);
        active_window(&mut windows, key, now).is_some_and(|window| window.hits >= max_attempts)
    }

    fn hit(&self, key: &str, window: Duration) -> u32 {
        let now = self.clock.now();
        let mut windows = lock(&self.windows);
        Self::record_hit(&mut windows, key, window, now)
    }

    fn attempt(&self, key: &str, max_attempts: u32, window: Duration) -> bool {
        let now = self.clock.now();
        let mut windows = lock(&self.windows);
        let exhausted = active_window(&mut windows, key, now)
            .is_some_and(|active| active.hits >= max_attempts);
        if exhausted {
            return false;
        }
        Self::record_hit(&mut windows, key, window, now);
        true
    }
}

/// Returns the unexpired window for `key`, dropping an expired one.
fn active_window<'a>(
    windows: &'a mut HashMap<String, Window>,
    key: &str,
    now: Instant,
) -> Option<&'a mut Window> {
    if windows.get(key).is_some_and(|window| now >= window.expires_at) {
        windows.remove(key);
    }
    windows.get_mut(key)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Counters stay consistent even if a holder panicked mid-update.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Wraps a [`NearbyPlaceProvider`] with the per-caller nearby budget.
///
/// Lookups without a caller id are not metered.
pub struct RateLimitedNearby<N> {
    inner: N,
    limiter: Arc<dyn RateLimiter>,
    budget: RateBudget,
}

impl<N> RateLimitedNearby<N> {
    pub fn new(inner: N, limiter: Arc<dyn RateLimiter>, budget: RateBudget) -> Self {
        Self {
            inner,
            limiter,
            budget,
        }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

impl<N: NearbyPlaceProvider> NearbyPlaceProvider for RateLimitedNearby<N> {
    fn find_nearby_restaurants(
        &self,
        point: Coordinate,
        caller_id: Option<&str>,
    ) -> Result<Vec<RestaurantCandidate>, EnrichError> {
        if let Some(caller) = caller_id {
            spend(self.limiter.as_ref(), nearby_key(caller), self.budget)?;
        }
        self.inner.find_nearby_restaurants(point, caller_id)
    }
}
