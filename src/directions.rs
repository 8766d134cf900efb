//! Directions HTTP adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::coordinate::{Coordinate, TravelMode};
use crate::traits::DirectionsProvider;

const DIRECTIONS_PATH: &str = "/route/v2/directions/json";

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Append `&mode=<travel mode>` to the request. The service routes by
    /// car when the parameter is absent.
    pub include_mode: bool,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dev.maps.track-asia.com".to_string(),
            timeout_secs: 10,
            include_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectionsError {
    /// Connection failure, non-success status, or empty body.
    #[error("network failure: {0}")]
    Network(String),

    /// A body that is not the expected JSON document.
    #[error("unparseable directions response: {0}")]
    Parse(String),

    #[error("{0}")]
    InvalidUrl(String),

    #[error("{which} coordinate {coordinate} is out of range")]
    InvalidCoordinate {
        which: &'static str,
        coordinate: Coordinate,
    },
}

impl From<reqwest::Error> for DirectionsError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the credential.
        DirectionsError::Network(err.without_url().to_string())
    }
}

/// Parsed directions response. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResult {
    pub routes: Vec<Route>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

impl DirectionsResult {
    /// First leg of the first route, the source of travel estimates.
    pub fn first_leg(&self) -> Option<&Leg> {
        self.routes.first().and_then(|route| route.legs.first())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub overview_polyline: Option<EncodedPolyline>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub legs: Vec<Leg>,
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
}

/// A measurement with the service's localized rendering of it.
///
/// `value` is authoritative (meters or seconds); `text` is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub text: String,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    client: reqwest::Client,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    /// Builds the GET URL for a directions request.
    pub fn request_url(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        credential: &str,
    ) -> Result<Url, DirectionsError> {
        for (which, coordinate) in [("origin", origin), ("destination", destination)] {
            if !coordinate.is_valid() {
                return Err(DirectionsError::InvalidCoordinate { which, coordinate });
            }
        }

        let base = self.config.base_url.trim_end_matches('/');
        let mut url: Url = format!(
            "{}{}?origin={}&destination={}",
            base, DIRECTIONS_PATH, origin, destination
        )
        .parse()
        .map_err(|err| DirectionsError::InvalidUrl(format!("{} is not a valid url: {}", base, err)))?;

        {
            let mut query = url.query_pairs_mut();
            if self.config.include_mode {
                query.append_pair("mode", mode.as_str());
            }
            query.append_pair("key", credential);
        }

        Ok(url)
    }

    pub async fn fetch_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        credential: &str,
    ) -> Result<DirectionsResult, DirectionsError> {
        let url = self.request_url(origin, destination, mode, credential)?;
        debug!(%origin, %destination, %mode, "requesting directions");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "directions request rejected");
            return Err(DirectionsError::Network(format!(
                "unexpected status {}",
                status
            )));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(DirectionsError::Network("empty response body".to_string()));
        }

        let result: DirectionsResult = serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, "directions response did not parse");
            DirectionsError::Parse(err.to_string())
        })?;
        debug!(
            status = %result.status,
            routes = result.routes.len(),
            "directions received"
        );

        Ok(result)
    }
}

#[async_trait]
impl DirectionsProvider for DirectionsClient {
    async fn fetch_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        credential: &str,
    ) -> Result<DirectionsResult, DirectionsError> {
        DirectionsClient::fetch_directions(self, origin, destination, mode, credential).await
    }
}
