use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{ContentType, Header};
use rocket::{Request, Response};

use crate::rate_limit::RateDecision;

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' 'unsafe-inline' https://rpc-mainnet.supra.com; \
style-src 'self' 'unsafe-inline'; \
img-src 'self' data: https:; \
connect-src 'self' https://rpc-mainnet.supra.com https://prod-kline-rest.supra.com; \
font-src 'self' https://r2cdn.perplexity.ai; \
object-src 'none'; \
media-src 'self'; \
frame-src 'none'";

pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains; preload";

const FIXED_HEADERS: [(&str, &str); 5] = [
    ("Content-Security-Policy", CONTENT_SECURITY_POLICY),
    ("Strict-Transport-Security", STRICT_TRANSPORT_SECURITY),
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("Referrer-Policy", "no-referrer"),
];

/// Adds security headers to every response, rate limit headers to limited
/// routes, and long cache headers to static assets in production.
pub struct SecurityHeaders {
    pub long_static_cache: bool,
}

#[rocket::async_trait]
impl Fairing for SecurityHeaders {
    fn info(&self) -> Info {
        Info {
            name: "Security headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        for (name, value) in FIXED_HEADERS {
            res.set_header(Header::new(name, value));
        }

        if let Some(decision) = req.local_cache(|| None::<RateDecision>) {
            res.set_header(Header::new("RateLimit-Limit", decision.limit.to_string()));
            res.set_header(Header::new(
                "RateLimit-Remaining",
                decision.remaining.to_string(),
            ));
            res.set_header(Header::new(
                "RateLimit-Reset",
                decision.reset_after.as_secs().to_string(),
            ));
        }

        let is_asset = !req.uri().path().starts_with("/api/")
            && res.content_type() != Some(ContentType::JSON);
        if is_asset {
            let cache = if self.long_static_cache {
                "public, max-age=31536000"
            } else {
                "public, max-age=0"
            };
            res.set_header(Header::new("Cache-Control", cache));
        }
    }
}
