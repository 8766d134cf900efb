//! Seams to the collaborators the core does not implement.
//!
//! The directions backend and the map surface are both supplied by the host
//! application. Tests plug in stubs through the same traits.

use async_trait::async_trait;

use crate::coordinate::{Coordinate, TravelMode};
use crate::directions::{DirectionsError, DirectionsResult};
use crate::render::{LineOverlay, MarkerIcon};

/// Fetches directions between two points.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn fetch_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        credential: &str,
    ) -> Result<DirectionsResult, DirectionsError>;
}

/// A drawing target that can show line overlays and markers.
pub trait MapSurface {
    /// Opaque reference to a drawn line, only used to remove it again.
    type Handle;

    fn add_line_overlay(&mut self, overlay: &LineOverlay) -> Self::Handle;

    fn remove_overlay(&mut self, handle: Self::Handle);

    /// Centers the visible area on `center`.
    fn move_viewport(&mut self, center: Coordinate);

    fn add_marker(&mut self, position: Coordinate, icon: &MarkerIcon, title: &str);
}
