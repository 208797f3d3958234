//! Where the user is
//!
//! A terminal has no geolocation prompt, so the position comes from one of
//! three places: coordinates given on the command line, an IP geolocation
//! lookup, or nowhere at all (the user opted out, which behaves like a
//! denied permission prompt).

use serde::Deserialize;
use thiserror::Error;

use crate::geo::Coordinate;

pub const IP_LOOKUP_ENDPOINT: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),

    #[error("location lookup timed out")]
    Timeout,
}

impl From<reqwest::Error> for LocationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LocationError::Timeout
        } else {
            LocationError::Unavailable(e.to_string())
        }
    }
}

/// One-shot source of the user's position
#[derive(Clone, Debug, PartialEq)]
pub enum LocationProvider {
    /// Coordinates supplied up front
    Fixed(Coordinate),
    /// Approximate position from the public IP address
    IpLookup { endpoint: String },
    /// Geolocation switched off
    Disabled,
}

impl LocationProvider {
    pub fn ip_lookup() -> Self {
        LocationProvider::IpLookup {
            endpoint: IP_LOOKUP_ENDPOINT.into(),
        }
    }

    /// Resolve the current position. Single attempt, nothing cached.
    pub async fn current_location(
        &self,
        http: &reqwest::Client,
    ) -> Result<Coordinate, LocationError> {
        match self {
            LocationProvider::Fixed(coordinate) => Ok(*coordinate),
            LocationProvider::Disabled => Err(LocationError::PermissionDenied),
            LocationProvider::IpLookup { endpoint } => {
                tracing::debug!(%endpoint, "looking up location by IP");
                let body = http.get(endpoint).send().await?.text().await?;
                parse_ip_lookup(&body)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Parse an ip-api.com style body: `{"status":"success","lat":..,"lon":..}`
pub fn parse_ip_lookup(body: &str) -> Result<Coordinate, LocationError> {
    let response: IpLookupResponse =
        serde_json::from_str(body).map_err(|e| LocationError::Unavailable(e.to_string()))?;

    if response.status != "success" {
        let reason = response.message.unwrap_or(response.status);
        return Err(LocationError::Unavailable(reason));
    }

    match (response.lat, response.lon) {
        (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
        _ => Err(LocationError::Unavailable("response has no coordinates".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = r#"{"status":"success","lat":37.0,"lon":-122.0}"#;
        assert_eq!(parse_ip_lookup(body), Ok(Coordinate::new(37.0, -122.0)));
    }

    #[test]
    fn test_parse_failure_uses_message() {
        let body = r#"{"status":"fail","message":"reserved range"}"#;
        assert_eq!(
            parse_ip_lookup(body),
            Err(LocationError::Unavailable("reserved range".into()))
        );
    }

    #[test]
    fn test_parse_missing_coordinates() {
        let body = r#"{"status":"success"}"#;
        assert!(matches!(
            parse_ip_lookup(body),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_ip_lookup("<html>"),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_fixed_and_disabled_providers() {
        let http = reqwest::Client::new();
        let here = Coordinate::new(10.0, 10.0);

        let fixed = LocationProvider::Fixed(here);
        assert_eq!(fixed.current_location(&http).await, Ok(here));

        let disabled = LocationProvider::Disabled;
        assert_eq!(
            disabled.current_location(&http).await,
            Err(LocationError::PermissionDenied)
        );
    }
}
