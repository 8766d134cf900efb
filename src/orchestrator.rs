//! Fetch, decode, draw and track routes in one call.

use thiserror::Error;
use tracing::{debug, warn};

use crate::coordinate::{Coordinate, TravelMode};
use crate::directions::{DirectionsError, DirectionsResult, TextValue};
use crate::polyline::DecodeError;
use crate::render::{RenderConfig, RouteRenderer};
use crate::traits::{DirectionsProvider, MapSurface};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("fetching directions failed: {0}")]
    Fetch(#[from] DirectionsError),

    #[error("decoding route geometry failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("no travel estimate available (status {status:?}): {reason}")]
    EstimationUnavailable {
        status: String,
        reason: &'static str,
    },
}

/// Where the most recent `draw_route` cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Fetching,
    Rendered,
    Failed,
}

/// Distance and duration of the first leg of the first route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    pub distance: Option<TextValue>,
    pub duration: Option<TextValue>,
}

impl Estimate {
    pub fn from_result(result: &DirectionsResult) -> Result<Self, RouteError> {
        let unavailable = |reason: &'static str| RouteError::EstimationUnavailable {
            status: result.status.clone(),
            reason,
        };

        let route = result
            .routes
            .first()
            .ok_or_else(|| unavailable("response contains no routes"))?;
        let leg = route
            .legs
            .first()
            .ok_or_else(|| unavailable("first route has no legs"))?;

        Ok(Self {
            distance: leg.distance.clone(),
            duration: leg.duration.clone(),
        })
    }

    pub fn distance_meters(&self) -> Option<i64> {
        self.distance.as_ref().map(|distance| distance.value)
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.duration.as_ref().map(|duration| duration.value)
    }

    pub fn duration_text(&self) -> Option<&str> {
        self.duration.as_ref().map(|duration| duration.text.as_str())
    }
}

/// Draws routes between two points on a map surface and removes them again.
///
/// Construct it once the map surface is ready. Drawing and removal take
/// `&mut self`, so calls on one orchestrator are always serialized.
pub struct RouteOrchestrator<P, M: MapSurface> {
    provider: P,
    renderer: RouteRenderer<M>,
    config: RenderConfig,
    credential: String,
    state: DrawState,
}

impl<P, M> RouteOrchestrator<P, M>
where
    P: DirectionsProvider,
    M: MapSurface,
{
    pub fn new(provider: P, surface: M, config: RenderConfig, credential: impl Into<String>) -> Self {
        Self {
            provider,
            renderer: RouteRenderer::new(surface),
            config,
            credential: credential.into(),
            state: DrawState::Idle,
        }
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn renderer(&self) -> &RouteRenderer<M> {
        &self.renderer
    }

    pub fn surface(&self) -> &M {
        self.renderer.surface()
    }

    /// Fetches directions and draws every returned route.
    ///
    /// Makes exactly one directions request. Nothing is drawn unless the
    /// response yields an estimate and every polyline decodes.
    pub async fn draw_route(
        &mut self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Estimate, RouteError> {
        self.state = DrawState::Fetching;
        let outcome = self.fetch_and_draw(origin, destination, mode).await;
        self.state = match &outcome {
            Ok(_) => DrawState::Rendered,
            Err(err) => {
                warn!(error = %err, "drawing route failed");
                DrawState::Failed
            }
        };
        outcome
    }

    /// Callback flavour of [`Self::draw_route`]: exactly one of `on_estimates`
    /// or `on_error` runs.
    pub async fn draw_route_with<E, F>(
        &mut self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        on_estimates: E,
        on_error: F,
    ) where
        E: FnOnce(Estimate),
        F: FnOnce(RouteError),
    {
        match self.draw_route(origin, destination, mode).await {
            Ok(estimate) => on_estimates(estimate),
            Err(err) => on_error(err),
        }
    }

    /// Fetches directions and returns the estimate without drawing.
    pub async fn get_travel_estimations(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Estimate, RouteError> {
        let result = self
            .provider
            .fetch_directions(origin, destination, mode, &self.credential)
            .await?;
        Estimate::from_result(&result)
    }

    pub async fn get_travel_estimations_with<E, F>(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        on_estimates: E,
        on_error: F,
    ) where
        E: FnOnce(Estimate),
        F: FnOnce(RouteError),
    {
        match self.get_travel_estimations(origin, destination, mode).await {
            Ok(estimate) => on_estimates(estimate),
            Err(err) => on_error(err),
        }
    }

    /// Removes every route this orchestrator has drawn. Returns how many
    /// overlays were removed.
    pub fn remove_paths(&mut self) -> usize {
        let removed = self.renderer.remove_all();
        self.state = DrawState::Idle;
        removed
    }

    pub fn move_viewport(&mut self, center: Coordinate) {
        self.renderer.surface_mut().move_viewport(center);
    }

    /// Drops a marker using the configured marker icon.
    pub fn add_marker(&mut self, position: Coordinate, title: &str) {
        let icon = self.config.marker_icon();
        self.renderer.surface_mut().add_marker(position, icon, title);
    }

    async fn fetch_and_draw(
        &mut self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Estimate, RouteError> {
        let result = self
            .provider
            .fetch_directions(origin, destination, mode, &self.credential)
            .await?;
        let estimate = Estimate::from_result(&result)?;

        let added = self.renderer.draw(&result.routes, &self.config)?.len();
        debug!(routes = result.routes.len(), added, "route drawn");

        Ok(estimate)
    }
}
