//! Fixed-window request limiting per client IP for the `/api/` routes.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;

use crate::status_messages::{new_status, Status as StatusMessage};

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        RateLimiter {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request from `ip` at `now`.
    pub fn check(&self, ip: IpAddr, now: Instant) -> RateDecision {
        let mut windows = match self.windows.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        let window = self.window;
        windows.retain(|_, (start, _)| now.duration_since(*start) < window);

        let (start, count) = windows.entry(ip).or_insert((now, 0));
        *count = count.saturating_add(1);
        RateDecision {
            allowed: *count <= self.max,
            limit: self.max,
            remaining: self.max.saturating_sub(*count),
            reset_after: self.window.saturating_sub(now.duration_since(*start)),
        }
    }
}

/// Request guard that counts the request against the client's window.
///
/// The decision is cached on the request so response fairings can report it.
#[derive(Debug, Clone, Copy)]
pub struct ApiRateLimit(pub RateDecision);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiRateLimit {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let limiter = match req.rocket().state::<RateLimiter>() {
            Some(l) => l,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };
        let ip = req
            .client_ip()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let cached = req.local_cache(|| Some(limiter.check(ip, Instant::now())));
        match cached {
            Some(decision) if decision.allowed => Outcome::Success(ApiRateLimit(*decision)),
            Some(_) => {
                log::warn!("Rate limit exceeded for {}", ip);
                Outcome::Error((Status::TooManyRequests, ()))
            }
            None => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

#[catch(429)]
pub fn too_many_requests() -> Json<StatusMessage> {
    new_status(RATE_LIMIT_MESSAGE)
}
