//! draw-route core
//!
//! Fetches a route from a directions service, decodes its polyline and
//! draws it on a map surface, tracking drawn overlays for removal.

pub mod coordinate;
pub mod directions;
pub mod orchestrator;
pub mod polyline;
pub mod render;
pub mod traits;

pub use coordinate::{Coordinate, TravelMode};
pub use directions::{DirectionsClient, DirectionsConfig, DirectionsError, DirectionsResult};
pub use orchestrator::{DrawState, Estimate, RouteError, RouteOrchestrator};
pub use polyline::{DecodeError, Polyline};
pub use render::{RenderConfig, RouteRenderer};
pub use traits::{DirectionsProvider, MapSurface};
