//! Per-client vote limiter using token buckets.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Bucket count above which refilled buckets are dropped
const PRUNE_THRESHOLD: usize = 10_000;

/// Token bucket rate limiter keyed by client address
#[derive(Clone)]
pub struct VoteLimiter {
    state: Arc<Mutex<HashMap<String, Bucket>>>,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

struct Bucket {
    tokens: f64,
    last_update: Instant,
}

impl VoteLimiter {
    /// Create a limiter allowing `votes_per_hour` votes per client, with
    /// the full allowance available as a burst
    pub fn new(votes_per_hour: u32) -> Self {
        let max_tokens = votes_per_hour as f64;

        Self {
            state: Arc::new(Mutex::new(HashMap::new())),
            max_tokens,
            refill_rate: max_tokens / 3600.0,
        }
    }

    /// Take a token for `client`; returns false when the client is limited
    pub async fn try_acquire(&self, client: &str) -> bool {
        let mut buckets = self.state.lock().await;
        let now = Instant::now();

        if buckets.len() > PRUNE_THRESHOLD {
            let (max_tokens, refill_rate) = (self.max_tokens, self.refill_rate);
            buckets.retain(|_, b| {
                let elapsed = now.duration_since(b.last_update).as_secs_f64();
                b.tokens + elapsed * refill_rate < max_tokens
            });
        }

        let bucket = buckets.entry(client.to_string()).or_insert(Bucket {
            tokens: self.max_tokens,
            last_update: now,
        });

        // Refill tokens
        let elapsed = now.duration_since(bucket.last_update).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        bucket.last_update = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
