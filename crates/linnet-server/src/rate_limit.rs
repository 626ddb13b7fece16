use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::warn;

const LOG_INTERVAL: Duration = Duration::from_secs(60);
const STALE_AFTER: Duration = Duration::from_secs(600);

/// Per-client token-bucket limiter.
///
/// Clients are keyed by the first `x-forwarded-for` entry; requests without
/// the header are not limited (direct access, health checks).
#[derive(Clone)]
pub struct RateLimiterLayer {
    rate_per_sec: f64,
    burst: f64,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            rate_per_sec: rate_per_sec as f64,
            burst: burst as f64,
        }
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            buckets: Arc::new(DashMap::new()),
            dropped_since_log: Arc::new(AtomicU64::new(0)),
            last_log: Arc::new(Mutex::new(Instant::now())),
            rate_per_sec: self.rate_per_sec,
            burst: self.burst,
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    buckets: Arc<DashMap<String, Bucket>>,
    dropped_since_log: Arc<AtomicU64>,
    last_log: Arc<Mutex<Instant>>,
    rate_per_sec: f64,
    burst: f64,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimiter<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        self.sweep_if_due();
        if let Some(client) = client_id(&req)
            && !self.check_and_consume(&client)
        {
            self.dropped_since_log.fetch_add(1, Ordering::Relaxed);
            return Box::pin(async move {
                Ok(Response::builder()
                    .status(StatusCode::TOO_MANY_REQUESTS)
                    .body(Body::from("rate limited"))
                    .unwrap())
            });
        }

        let fut = self.inner.call(req);
        Box::pin(fut)
    }
}

impl<S> RateLimiter<S> {
    fn check_and_consume(&self, client: &str) -> bool {
        let mut bucket = self.buckets.entry(client.to_string()).or_insert(Bucket {
            tokens: self.burst,
            last_refill: Instant::now(),
        });
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            bucket.tokens = (bucket.tokens + elapsed * self.rate_per_sec).min(self.burst);
            bucket.last_refill = now;
        }
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Once per interval: report dropped requests and evict buckets whose
    /// clients have gone quiet. A bucket idle past [`STALE_AFTER`] has long
    /// refilled to burst, so rebuilding it on the next request is identical.
    fn sweep_if_due(&self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&self, now: Instant) {
        let mut last = self.last_log.lock().unwrap();
        if now.saturating_duration_since(*last) < LOG_INTERVAL {
            return;
        }
        *last = now;
        drop(last);

        let dropped = self.dropped_since_log.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("rate limiter dropped {dropped} requests in the last minute");
        }
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < STALE_AFTER);
    }
}

fn client_id<B>(req: &Request<B>) -> Option<String> {
    // First hop in x-forwarded-for is the original client.
    req.headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter<()> {
        RateLimiterLayer::new(5, 10).layer(())
    }

    #[test]
    fn sweep_evicts_idle_buckets_and_keeps_active_ones() {
        let limiter = limiter();
        assert!(limiter.check_and_consume("10.0.0.1"));
        assert!(limiter.check_and_consume("10.0.0.2"));
        assert_eq!(limiter.buckets.len(), 2);

        let later = Instant::now() + STALE_AFTER + LOG_INTERVAL;
        limiter.buckets.get_mut("10.0.0.2").unwrap().last_refill = later;

        limiter.sweep_at(later);
        assert!(limiter.buckets.get("10.0.0.1").is_none());
        assert!(limiter.buckets.get("10.0.0.2").is_some());
    }

    #[test]
    fn sweep_waits_for_the_log_interval() {
        let limiter = limiter();
        assert!(limiter.check_and_consume("10.0.0.1"));

        *limiter.last_log.lock().unwrap() = Instant::now() + STALE_AFTER;
        limiter.sweep_at(Instant::now() + STALE_AFTER + LOG_INTERVAL / 2);
        assert_eq!(limiter.buckets.len(), 1);
    }
}
