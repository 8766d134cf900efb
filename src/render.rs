//! Route overlay rendering.
//!
//! `RouteRenderer` owns the map surface and every overlay handle it has
//! put on it. Handles leave the renderer only when their overlay is removed.

use tracing::{info, warn};

use crate::coordinate::Coordinate;
use crate::directions::Route;
use crate::polyline::{DecodeError, Polyline};
use crate::traits::MapSurface;

const DEFAULT_PATH_WIDTH: u32 = 5;
const DEFAULT_ALPHA: f32 = 1.0;

/// Hue of the stock azure map pin, in degrees.
pub const HUE_AZURE: f32 = 210.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argb {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Argb {
    pub const fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// Packs into `0xAARRGGBB`.
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.alpha, self.red, self.green, self.blue])
    }
}

/// Applies `alpha` (clamped to [0, 1]) to `color`.
pub fn blend(color: Rgb, alpha: f32) -> Argb {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Argb::new(alpha, color.red, color.green, color.blue)
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerIcon {
    /// The surface's stock pin tinted with `hue` degrees.
    DefaultPin { hue: f32 },
    /// An icon the surface knows by name.
    Named(String),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        MarkerIcon::DefaultPin { hue: HUE_AZURE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Immutable rendering settings, see [`RenderConfig::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    width: u32,
    color: Rgb,
    alpha: f32,
    style: LineStyle,
    marker_icon: MarkerIcon,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfigBuilder::default().build()
    }
}

impl RenderConfig {
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    pub fn marker_icon(&self) -> &MarkerIcon {
        &self.marker_icon
    }

    /// Line color with alpha applied.
    pub fn line_color(&self) -> Argb {
        blend(self.color, self.alpha)
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfigBuilder {
    width: u32,
    color: Rgb,
    alpha: f32,
    style: LineStyle,
    marker_icon: MarkerIcon,
}

impl Default for RenderConfigBuilder {
    fn default() -> Self {
        Self {
            width: DEFAULT_PATH_WIDTH,
            color: Rgb::RED,
            alpha: DEFAULT_ALPHA,
            style: LineStyle::default(),
            marker_icon: MarkerIcon::default(),
        }
    }
}

impl RenderConfigBuilder {
    /// Line width in pixels; zero is raised to one.
    pub fn width(mut self, width: u32) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Opacity in [0, 1]; out-of-range values are clamped.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = if alpha.is_nan() {
            DEFAULT_ALPHA
        } else {
            alpha.clamp(0.0, 1.0)
        };
        self
    }

    pub fn style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn marker_icon(mut self, icon: MarkerIcon) -> Self {
        self.marker_icon = icon;
        self
    }

    pub fn build(self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            color: self.color,
            alpha: self.alpha,
            style: self.style,
            marker_icon: self.marker_icon,
        }
    }
}

/// Description of one line handed to the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOverlay {
    pub points: Vec<Coordinate>,
    pub width: u32,
    pub color: Argb,
    pub style: LineStyle,
}

pub struct RouteRenderer<M: MapSurface> {
    surface: M,
    overlays: Vec<M::Handle>,
}

impl<M: MapSurface> RouteRenderer<M> {
    pub fn new(surface: M) -> Self {
        Self {
            surface,
            overlays: Vec::new(),
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }

    /// Handles of every overlay currently on the surface, in draw order.
    pub fn overlays(&self) -> &[M::Handle] {
        &self.overlays
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Draws the overview polyline of every route and returns the handles
    /// added by this call.
    ///
    /// Routes without an overview polyline are skipped. All polylines are
    /// decoded before anything is drawn, so one malformed polyline fails the
    /// whole call and leaves the surface untouched.
    pub fn draw(
        &mut self,
        routes: &[Route],
        config: &RenderConfig,
    ) -> Result<&[M::Handle], DecodeError> {
        let mut paths = Vec::with_capacity(routes.len());
        for (index, route) in routes.iter().enumerate() {
            let Some(encoded) = &route.overview_polyline else {
                warn!(route = index, "route has no overview polyline, skipping");
                continue;
            };
            paths.push(Polyline::decode(&encoded.points)?);
        }

        let start = self.overlays.len();
        for path in paths {
            let overlay = LineOverlay {
                points: path.into_points(),
                width: config.width(),
                color: config.line_color(),
                style: config.style(),
            };
            let handle = self.surface.add_line_overlay(&overlay);
            self.overlays.push(handle);
        }

        info!(
            added = self.overlays.len() - start,
            total = self.overlays.len(),
            "route overlays drawn"
        );
        Ok(&self.overlays[start..])
    }

    /// Removes every tracked overlay from the surface. Returns how many were
    /// removed; calling it with nothing drawn is a no-op.
    pub fn remove_all(&mut self) -> usize {
        let removed = self.overlays.len();
        for handle in self.overlays.drain(..) {
            self.surface.remove_overlay(handle);
        }
        if removed > 0 {
            info!(removed, "route overlays removed");
        }
        removed
    }
}
