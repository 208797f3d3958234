//! OpenAQ measurements client
//!
//! FRAMEWORK PATTERN: Async Side Effects
//! - `ReadingFetch` makes the reducer emit `Effect::FetchReading`
//! - The effect handler spawns `fetch_reading` as a task
//! - The task resolves to `ReadingDidLoad` / `ReadingDidError`

use serde::Deserialize;
use thiserror::Error;

use crate::geo::Coordinate;
use crate::state::Reading;

pub const MEASUREMENTS_ENDPOINT: &str = "https://api.openaq.org/v1/measurements";

/// Search radius around the coordinate, in the API's distance units (meters)
pub const SEARCH_RADIUS: u32 = 5000;

const PARAMETER: &str = "pm25";
const REDACTED: &str = "***";

#[derive(Debug, Error)]
pub enum AqiError {
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to parse measurements response")]
    Parse(#[from] serde_json::Error),

    #[error("no PM2.5 measurements near {0}")]
    NoData(Coordinate),
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Deserialize)]
struct MeasurementsResponse {
    results: Option<Vec<Measurement>>,
}

#[derive(Debug, Deserialize)]
struct Measurement {
    city: Option<String>,
    location: Option<String>,
    value: Option<f64>,
    unit: Option<String>,
    date: Option<MeasurementDate>,
}

#[derive(Debug, Deserialize)]
struct MeasurementDate {
    utc: Option<String>,
}

/// Map the first result of a measurements body to a [`Reading`].
///
/// `city`, `location` and `value` are copied as-is. An empty or missing
/// `results` array is [`AqiError::NoData`].
pub fn parse_measurements(body: &str, coordinate: Coordinate) -> Result<Reading, AqiError> {
    let response: MeasurementsResponse = serde_json::from_str(body)?;

    let first = response
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or(AqiError::NoData(coordinate))?;

    Ok(Reading {
        city: first.city,
        station: first.location,
        pm25: first.value,
        unit: first.unit,
        observed_at: first.date.and_then(|d| d.utc),
    })
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone, Debug)]
pub struct AqiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl AqiClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Query parameters for one lookup, newest observation first
    pub fn query(&self, coordinate: Coordinate) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("coordinates", coordinate.to_query()),
            ("parameter", PARAMETER.to_string()),
            ("radius", SEARCH_RADIUS.to_string()),
            ("limit", "1".to_string()),
            ("order_by", "datetime".to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    pub fn build_request(&self, coordinate: Coordinate) -> Result<reqwest::Request, reqwest::Error> {
        self.http
            .get(&self.endpoint)
            .query(&self.query(coordinate))
            .build()
    }

    /// Fetch the nearest PM2.5 reading. One round trip, no caching.
    pub async fn fetch_reading(&self, coordinate: Coordinate) -> Result<Reading, AqiError> {
        let request = self
            .build_request(coordinate)
            .map_err(|source| AqiError::Network {
                url: self.endpoint.clone(),
                source,
            })?;
        let url = redact_api_key(request.url());
        tracing::info!(%url, "fetching PM2.5 reading");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| AqiError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AqiError::HttpStatus { url, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| AqiError::Network { url, source })?;
        parse_measurements(&body, coordinate)
    }
}

/// URL as a string with the `api_key` value masked, for logs and errors
pub fn redact_api_key(url: &reqwest::Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api_key") {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" {
                REDACTED.to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
