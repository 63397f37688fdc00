//! IP geolocation client
//!
//! Resolves device IP addresses to country/region fields through the
//! ip-api.com JSON endpoint. The free tier allows 45 requests per minute,
//! so requests are serialized through a rate limiter. Lookup failures are
//! never fatal: the session keeps blank geolocation fields and the run
//! continues.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("collection-report/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geolocation fields for one IP address. All fields stay `None` when the
/// lookup failed or the address could not be located.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoMeta {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub region_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    status: String,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    region: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

pub struct GeoIpClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl GeoIpClient {
    pub fn new(endpoint: &str, min_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(min_interval),
        })
    }

    /// Look up geolocation fields for one IP address.
    ///
    /// Returns a blank [`GeoMeta`] on any failure: network errors, malformed
    /// responses, and addresses the service cannot locate (private ranges
    /// report `status: fail`).
    pub async fn lookup(&self, ip: &str) -> GeoMeta {
        self.rate_limiter.wait().await;

        let url = format!("{}/{}", self.base_url, ip);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(ip = %ip, error = %e, "Geolocation request failed");
                return GeoMeta::default();
            }
        };

        let body: GeoResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(ip = %ip, error = %e, "Geolocation response was not valid JSON");
                return GeoMeta::default();
            }
        };

        if body.status != "success" {
            debug!(ip = %ip, status = %body.status, "Address could not be located");
            return GeoMeta::default();
        }

        GeoMeta {
            country: body.country,
            country_code: body.country_code,
            region: body.region,
            region_name: body.region_name,
        }
    }
}
