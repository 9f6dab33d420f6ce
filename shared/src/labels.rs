use crate::geometry::{GeoBounds, Region};
use crate::names::{self, DisplayMode};
use crate::view::ViewState;

/// Regions narrower than this (degrees of longitude) never get a label.
pub const MIN_LABEL_WIDTH_DEG: f64 = 0.5;
/// Degrees to map units, calibrated against the `width / 5.5` projection scale.
pub const DEGREE_SCALE: f64 = 2.5;
/// Average glyph width as a fraction of font size for the monospace label font.
pub const GLYPH_WIDTH_RATIO: f64 = 0.55;
pub const HEIGHT_FILL_RATIO: f64 = 0.5;
pub const DAMPING_DIVISOR: f64 = 10.0;
pub const MAX_FONT_SIZE: f64 = 25.0;

/// Minimum legible font size for zoom tiers 1 through 6+.
const ZOOM_TIER_FLOORS: [f64; 6] = [1.5, 1.2, 1.0, 0.8, 0.7, 0.6];

pub const ENDONYM_FILL: (u8, u8, u8) = (245, 197, 66);
pub const EXONYM_FILL: (u8, u8, u8) = (220, 218, 210);

pub fn label_fill(mode: DisplayMode) -> (u8, u8, u8) {
    match mode {
        DisplayMode::Endonym => ENDONYM_FILL,
        DisplayMode::Exonym => EXONYM_FILL,
    }
}

/// Font floor for the tier `floor(clamp(zoom, 1, 6))`.
pub fn min_font_for_zoom(zoom: f64) -> f64 {
    let tier = zoom.clamp(1.0, 6.0).floor() as usize;
    ZOOM_TIER_FLOORS[tier.saturating_sub(1).min(ZOOM_TIER_FLOORS.len() - 1)]
}

/// Intermediate values of the sizing computation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelSizing {
    pub width_based: f64,
    pub height_based: f64,
    pub base_size: f64,
    pub damping_factor: f64,
    pub effective_zoom_factor: f64,
    pub raw_font_size: f64,
    pub min_font_size: f64,
    pub font_size: f64,
}

/// Size a label of `label_len` characters for a region's bounds at `zoom`.
///
/// Returns `None` when the region is too narrow to label or there is no
/// text to place.
pub fn size_label(bounds: &GeoBounds, label_len: usize, zoom: f64) -> Option<LabelSizing> {
    let width_deg = bounds.width_deg();
    if width_deg <= MIN_LABEL_WIDTH_DEG || label_len == 0 {
        return None;
    }
    let height_deg = bounds.height_deg();
    let label_len = label_len as f64;

    let width_based = (width_deg * DEGREE_SCALE) / (label_len * GLYPH_WIDTH_RATIO);
    let height_based = (height_deg * DEGREE_SCALE) * HEIGHT_FILL_RATIO;
    let base_size = width_based.min(height_based);

    let min_font_size = min_font_for_zoom(zoom);

    // Small regions shrink slower on zoom.
    let damping_factor = (base_size / DAMPING_DIVISOR).sqrt().min(1.0);
    let effective_zoom_factor = 1.0 + (zoom - 1.0) * damping_factor;
    let raw_font_size = base_size / effective_zoom_factor;

    // max/min rather than clamp: a NaN raw size lands on the floor.
    let font_size = raw_font_size.max(min_font_size).min(MAX_FONT_SIZE);

    Some(LabelSizing {
        width_based,
        height_based,
        base_size,
        damping_factor,
        effective_zoom_factor,
        raw_font_size,
        min_font_size,
        font_size,
    })
}

/// A text label positioned geographically.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelInstruction {
    pub text: String,
    /// `[lon, lat]` of the region centroid.
    pub anchor: [f64; 2],
    /// Font size in map units; the zoom transform scales it on screen.
    pub font_size: f64,
    pub fill: (u8, u8, u8),
}

/// Decide whether `region` gets a label under `view` and `mode`, and how big.
pub fn estimate_label(
    region: &Region,
    view: &ViewState,
    mode: DisplayMode,
) -> Option<LabelInstruction> {
    let text = names::resolve(region.name(), mode);
    let sizing = size_label(region.bounds(), text.chars().count(), view.zoom())?;
    Some(LabelInstruction {
        text: text.to_owned(),
        anchor: region.centroid(),
        font_size: sizing.font_size,
        fill: label_fill(mode),
    })
}
