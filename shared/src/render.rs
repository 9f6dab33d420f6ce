use crate::geometry::Region;
use crate::labels::{self, LabelInstruction};
use crate::projection::Projection;
use crate::view::MapView;

/// Off-screen margin (CSS px) kept when culling, so strokes at the edge survive.
const CULL_MARGIN: f64 = 8.0;

/// Projection plus the zoom/center transform applied on top of it.
///
/// Map space is the projection's pixel space at zoom 1. The view center is
/// kept at the middle of the viewport.
#[derive(Debug, Clone, Copy)]
pub struct MapTransform {
    projection: Projection,
    zoom: f64,
    center_px: (f64, f64),
    half: (f64, f64),
}

impl MapTransform {
    pub fn new(map: &MapView, width: f64, height: f64) -> Self {
        let projection = map.projection(width, height);
        let [lon, lat] = map.view.center();
        Self {
            projection,
            zoom: map.view.zoom(),
            center_px: projection.project(lon, lat),
            half: (width / 2.0, height / 2.0),
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Map-space point to screen pixels.
    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.half.0 + (x - self.center_px.0) * self.zoom,
            self.half.1 + (y - self.center_px.1) * self.zoom,
        )
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            self.center_px.0 + (sx - self.half.0) / self.zoom,
            self.center_px.1 + (sy - self.half.1) / self.zoom,
        )
    }

    pub fn geo_to_screen(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.projection.project(lon, lat);
        self.world_to_screen(x, y)
    }

    /// Screen pixels to `(lon, lat)`; `None` off the map.
    pub fn screen_to_geo(&self, sx: f64, sy: f64) -> Option<(f64, f64)> {
        let (x, y) = self.screen_to_world(sx, sy);
        self.projection.invert(x, y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeStyle {
    Normal,
    Hovered,
}

/// One region's outline, already cut at the seam and in screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeInstruction {
    pub region: usize,
    pub paths: Vec<Vec<(f64, f64)>>,
    pub style: ShapeStyle,
}

/// A label placed in screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextInstruction {
    pub region: usize,
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Map-unit font size multiplied by zoom.
    pub font_px: f64,
    pub fill: (u8, u8, u8),
}

impl TextInstruction {
    fn place(region: usize, label: LabelInstruction, transform: &MapTransform) -> Self {
        let (x, y) = transform.geo_to_screen(label.anchor[0], label.anchor[1]);
        Self {
            region,
            text: label.text,
            x,
            y,
            font_px: label.font_size * transform.zoom(),
            fill: label.fill,
        }
    }
}

/// Everything needed to paint one frame. Shapes go first, labels on top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub shapes: Vec<ShapeInstruction>,
    pub labels: Vec<TextInstruction>,
}

fn path_bounds(paths: &[Vec<(f64, f64)>]) -> Option<(f64, f64, f64, f64)> {
    let mut points = paths.iter().flatten();
    let &(x0, y0) = points.next()?;
    Some(points.fold((x0, y0, x0, y0), |(min_x, min_y, max_x, max_y), &(x, y)| {
        (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
    }))
}

fn on_screen(bounds: (f64, f64, f64, f64), width: f64, height: f64) -> bool {
    let (min_x, min_y, max_x, max_y) = bounds;
    max_x >= -CULL_MARGIN
        && max_y >= -CULL_MARGIN
        && min_x <= width + CULL_MARGIN
        && min_y <= height + CULL_MARGIN
}

/// Build shape and label instructions for every visible region.
pub fn build_frame(
    regions: &[Region],
    map: &MapView,
    width: f64,
    height: f64,
    hovered: Option<usize>,
) -> Frame {
    let mut frame = Frame::default();
    if width <= 0.0 || height <= 0.0 {
        return frame;
    }
    let transform = MapTransform::new(map, width, height);

    for (idx, region) in regions.iter().enumerate() {
        let paths: Vec<Vec<(f64, f64)>> = region
            .rings()
            .flat_map(|ring| transform.projection().project_ring(ring))
            .map(|piece| {
                piece
                    .into_iter()
                    .map(|(x, y)| transform.world_to_screen(x, y))
                    .collect()
            })
            .collect();
        let Some(bounds) = path_bounds(&paths) else {
            continue;
        };
        if !on_screen(bounds, width, height) {
            continue;
        }

        let style = if hovered == Some(idx) {
            ShapeStyle::Hovered
        } else {
            ShapeStyle::Normal
        };
        frame.shapes.push(ShapeInstruction {
            region: idx,
            paths,
            style,
        });

        if let Some(label) = labels::estimate_label(region, &map.view, map.mode) {
            frame
                .labels
                .push(TextInstruction::place(idx, label, &transform));
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::DisplayMode;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-6,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn rect(name: &str, lon: f64, lat: f64, w: f64, h: f64) -> Region {
        Region::new(
            name,
            vec![vec![vec![
                [lon, lat],
                [lon + w, lat],
                [lon + w, lat + h],
                [lon, lat + h],
                [lon, lat],
            ]]],
        )
        .unwrap()
    }

    #[test]
    fn transform_round_trips_screen_points() {
        let mut map = MapView::new(DisplayMode::Exonym, 20.0);
        map.view.set_zoom(3.0);
        map.view.set_center(40.0, 10.0);
        let transform = MapTransform::new(&map, 1100.0, 600.0);

        let (sx, sy) = transform.geo_to_screen(40.0, 10.0);
        assert_close(sx, 550.0);
        assert_close(sy, 300.0);

        let (lon, lat) = transform.screen_to_geo(700.0, 420.0).unwrap();
        let (sx, sy) = transform.geo_to_screen(lon, lat);
        assert_close(sx, 700.0);
        assert_close(sy, 420.0);
    }

    #[test]
    fn labels_follow_shapes_and_scale_with_zoom() {
        let regions = vec![rect("Finland", 20.0, 60.0, 12.0, 10.0)];
        let mut map = MapView::new(DisplayMode::Endonym, 0.0);
        map.view.set_center(26.0, 65.0);
        map.view.set_zoom(2.0);

        let frame = build_frame(&regions, &map, 1100.0, 600.0, None);
        assert_eq!(frame.shapes.len(), 1);
        assert_eq!(frame.labels.len(), 1);

        let label = &frame.labels[0];
        assert_eq!(label.text, "Suomi");
        let expected = labels::estimate_label(&regions[0], &map.view, map.mode).unwrap();
        assert_close(label.font_px, expected.font_size * 2.0);
    }

    #[test]
    fn narrow_region_draws_without_label() {
        let regions = vec![rect("Monaco", 7.0, 43.0, 0.3, 0.3)];
        let mut map = MapView::new(DisplayMode::Exonym, 0.0);
        map.view.set_center(7.0, 43.0);
        let frame = build_frame(&regions, &map, 1100.0, 600.0, None);
        assert_eq!(frame.shapes.len(), 1);
        assert!(frame.labels.is_empty());
    }

    #[test]
    fn small_labels_keep_their_estimated_size() {
        // 3.9 by 2 degrees at zoom 1: height-limited to 2.5.
        let regions = vec![rect("Belgium", 2.5, 49.5, 3.9, 2.0)];
        let mut map = MapView::new(DisplayMode::Exonym, 0.0);
        map.view.set_center(4.5, 50.5);
        let frame = build_frame(&regions, &map, 1100.0, 600.0, None);
        assert_eq!(frame.labels.len(), 1);
        assert_close(frame.labels[0].font_px, 2.5);
    }

    #[test]
    fn polar_region_fills_to_the_map_edge() {
        let mut ring: Vec<[f64; 2]> = (0..12).map(|i| [-165.0 + 30.0 * i as f64, -70.0]).collect();
        ring.push(ring[0]);
        ring.reverse();
        let regions = vec![Region::new("Antarctica", vec![vec![ring]]).unwrap()];
        let map = MapView::new(DisplayMode::Exonym, 0.0);
        let frame = build_frame(&regions, &map, 1100.0, 600.0, None);
        assert_eq!(frame.shapes.len(), 1);
        let top = frame.shapes[0]
            .paths
            .iter()
            .flatten()
            .map(|&(_, y)| y)
            .fold(f64::INFINITY, f64::min);
        let ring_top = frame.shapes[0].paths[0][0].1;
        assert!(top < ring_top - 10.0);
    }

    #[test]
    fn off_screen_regions_are_culled() {
        let regions = vec![
            rect("Near", 0.0, 0.0, 10.0, 10.0),
            rect("Far", 120.0, -40.0, 10.0, 10.0),
        ];
        let mut map = MapView::new(DisplayMode::Exonym, 0.0);
        map.view.set_center(5.0, 5.0);
        map.view.set_zoom(8.0);
        let frame = build_frame(&regions, &map, 1100.0, 600.0, None);
        let drawn: Vec<usize> = frame.shapes.iter().map(|s| s.region).collect();
        assert_eq!(drawn, vec![0]);
        assert!(frame.labels.iter().all(|l| l.region == 0));
    }

    #[test]
    fn hovered_region_is_styled() {
        let regions = vec![
            rect("A", 0.0, 0.0, 10.0, 10.0),
            rect("B", 10.0, 0.0, 10.0, 10.0),
        ];
        let map = MapView::new(DisplayMode::Exonym, 90.0);
        let frame = build_frame(&regions, &map, 1100.0, 600.0, Some(1));
        assert_eq!(frame.shapes[0].style, ShapeStyle::Normal);
        assert_eq!(frame.shapes[1].style, ShapeStyle::Hovered);
    }

    #[test]
    fn empty_viewport_builds_nothing() {
        let regions = vec![rect("A", 0.0, 0.0, 10.0, 10.0)];
        let frame = build_frame(&regions, &MapView::default(), 0.0, 600.0, None);
        assert_eq!(frame, Frame::default());
    }
}
