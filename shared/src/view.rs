use serde::{Deserialize, Serialize};

use crate::names::DisplayMode;
use crate::projection::{self, Projection};

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 8.0;
/// Factor applied per zoom-button press.
pub const ZOOM_STEP: f64 = 1.5;
pub const ROTATION_MIN: f64 = -180.0;
pub const ROTATION_MAX: f64 = 180.0;

fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Zoom factor and geographic center of the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    zoom: f64,
    center: [f64; 2],
}

impl ViewState {
    pub fn new(zoom: f64, center: [f64; 2]) -> Self {
        let mut view = Self {
            zoom: MIN_ZOOM,
            center: [0.0, 0.0],
        };
        view.set_zoom(zoom);
        view.set_center(center[0], center[1]);
        view
    }

    /// Unzoomed view framing the whole map for a given seam rotation.
    pub fn home(rotation: f64) -> Self {
        Self::new(MIN_ZOOM, [180.0 - rotation, 0.0])
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// `[lon, lat]` in degrees.
    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_nan() {
            MIN_ZOOM
        } else {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        };
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / ZOOM_STEP);
    }

    pub fn set_center(&mut self, lon: f64, lat: f64) {
        if !lon.is_finite() || !lat.is_finite() {
            return;
        }
        self.center = [wrap_longitude(lon), lat.clamp(-90.0, 90.0)];
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::home(0.0)
    }
}

/// Longitude of the projection seam, always within `[-180, 180]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct SeamRotation(f64);

impl SeamRotation {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(ROTATION_MIN, ROTATION_MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for SeamRotation {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<SeamRotation> for f64 {
    fn from(rotation: SeamRotation) -> Self {
        rotation.0
    }
}

/// Everything the map view owns: zoom/center, label mode and seam rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapView {
    pub view: ViewState,
    pub mode: DisplayMode,
    rotation: SeamRotation,
}

impl MapView {
    pub fn new(mode: DisplayMode, rotation: f64) -> Self {
        let rotation = SeamRotation::new(rotation);
        Self {
            view: ViewState::home(rotation.value()),
            mode,
            rotation,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.value()
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Move the seam. The center follows the rotation so the framing of
    /// the viewport stays put while the map turns beneath it.
    pub fn set_rotation(&mut self, value: f64) {
        let next = SeamRotation::new(value);
        let delta = next.value() - self.rotation.value();
        self.rotation = next;
        let [lon, lat] = self.view.center();
        self.view.set_center(lon - delta, lat);
    }

    pub fn projection(&self, width: f64, height: f64) -> Projection {
        projection::configure(width, height, self.rotation.value())
    }

    /// Pan by a screen-space delta in CSS pixels.
    pub fn pan(&mut self, width: f64, height: f64, dx: f64, dy: f64) {
        let proj = self.projection(width, height);
        let [lon, lat] = self.view.center();
        let (cx, cy) = proj.project(lon, lat);
        let zoom = self.view.zoom();
        if let Some((lon, lat)) = proj.invert(cx - dx / zoom, cy - dy / zoom) {
            self.view.set_center(lon, lat);
        }
    }

    /// Zoom by `factor` keeping the geographic point under `(sx, sy)` fixed.
    pub fn zoom_at(&mut self, width: f64, height: f64, factor: f64, sx: f64, sy: f64) {
        let old_zoom = self.view.zoom();
        self.view.zoom_by(factor);
        let new_zoom = self.view.zoom();
        if (new_zoom - old_zoom).abs() < f64::EPSILON {
            return;
        }
        let (half_w, half_h) = (width / 2.0, height / 2.0);
        let shift = new_zoom / old_zoom - 1.0;
        self.pan(
            width,
            height,
            -(sx - half_w) * shift,
            -(sy - half_h) * shift,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-6,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn zoom_out_clamps_at_unzoomed_state() {
        let mut view = ViewState::default();
        view.zoom_out();
        assert_eq!(view.zoom(), MIN_ZOOM);
        view.zoom_in();
        assert_close(view.zoom(), 1.5);
        view.zoom_out();
        view.zoom_out();
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn zoom_in_clamps_at_max() {
        let mut view = ViewState::default();
        for _ in 0..20 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), MAX_ZOOM);
    }

    #[test]
    fn invalid_zoom_is_ignored_for_min() {
        let mut view = ViewState::default();
        view.set_zoom(f64::NAN);
        assert_eq!(view.zoom(), MIN_ZOOM);
        view.set_zoom(0.2);
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn center_wraps_longitude_and_clamps_latitude() {
        let view = ViewState::new(1.0, [190.0, 120.0]);
        assert_close(view.center()[0], -170.0);
        assert_eq!(view.center()[1], 90.0);
    }

    #[test]
    fn rotation_is_clamped_to_slider_bounds() {
        assert_eq!(SeamRotation::new(250.0).value(), 180.0);
        assert_eq!(SeamRotation::new(-250.0).value(), -180.0);
        assert_eq!(SeamRotation::new(f64::NAN).value(), 0.0);
        let mut map = MapView::default();
        map.set_rotation(999.0);
        assert_eq!(map.rotation(), 180.0);
    }

    #[test]
    fn slider_value_feeds_projection_rotation() {
        let mut map = MapView::default();
        map.set_rotation(-30.0);
        let proj = map.projection(1100.0, 600.0);
        assert_eq!(proj.rotation().as_array(), [-30.0, 180.0, 0.0]);
    }

    #[test]
    fn home_center_projects_to_viewport_center() {
        for rotation in [-120.0, 0.0, 45.0] {
            let map = MapView::new(DisplayMode::Exonym, rotation);
            let [lon, lat] = map.view.center();
            let (x, y) = map.projection(1100.0, 600.0).project(lon, lat);
            assert_close(x, 550.0);
            assert_close(y, 300.0);
        }
    }

    #[test]
    fn rotation_keeps_home_framing() {
        let mut map = MapView::default();
        map.set_rotation(60.0);
        assert_eq!(map.view, ViewState::home(60.0));
    }

    #[test]
    fn pan_moves_center_by_screen_delta() {
        let mut map = MapView::default();
        map.view.set_zoom(2.0);
        map.pan(1100.0, 600.0, 40.0, -20.0);
        let [lon, lat] = map.view.center();
        let (x, y) = map.projection(1100.0, 600.0).project(lon, lat);
        assert_close(x, 550.0 - 20.0);
        assert_close(y, 300.0 + 10.0);
    }

    #[test]
    fn zoom_at_viewport_center_keeps_center() {
        let mut map = MapView::new(DisplayMode::Exonym, 30.0);
        let before = map.view.center();
        map.zoom_at(1100.0, 600.0, 2.0, 550.0, 300.0);
        assert_close(map.view.zoom(), 2.0);
        assert_close(map.view.center()[0], before[0]);
        assert_close(map.view.center()[1], before[1]);
    }

    #[test]
    fn zoom_at_keeps_point_under_cursor() {
        let (w, h) = (1100.0, 600.0);
        let (sx, sy) = (700.0, 250.0);
        let geo_under = |map: &MapView| {
            let proj = map.projection(w, h);
            let [lon, lat] = map.view.center();
            let (cx, cy) = proj.project(lon, lat);
            let z = map.view.zoom();
            proj.invert(cx + (sx - w / 2.0) / z, cy + (sy - h / 2.0) / z)
                .unwrap()
        };
        let mut map = MapView::new(DisplayMode::Exonym, 30.0);
        map.view.set_zoom(1.5);
        let before = geo_under(&map);
        map.zoom_at(w, h, 2.0, sx, sy);
        let after = geo_under(&map);
        assert_close(map.view.zoom(), 3.0);
        assert_close(after.0, before.0);
        assert_close(after.1, before.1);
    }

    #[test]
    fn toggle_mode_flips_display_mode() {
        let mut map = MapView::new(DisplayMode::Exonym, 0.0);
        map.toggle_mode();
        assert_eq!(map.mode, DisplayMode::Endonym);
    }

    #[test]
    fn seam_rotation_deserializes_clamped() {
        let rotation: SeamRotation = serde_json::from_str("720.0").unwrap();
        assert_eq!(rotation.value(), 180.0);
    }
}
