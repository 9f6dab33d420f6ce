use std::f64::consts::{FRAC_PI_2, PI, TAU};

use geo::LineString;

/// Standard parallel of the cylindrical equal-area projection, in degrees.
pub const STANDARD_PARALLEL_DEG: f64 = 45.0;
/// Rotation about the φ axis that puts south at the top of the viewport.
pub const SOUTH_UP_PHI_DEG: f64 = 180.0;
/// Projection scale is `viewport_width / SCALE_DIVISOR`.
pub const SCALE_DIVISOR: f64 = 5.5;

const EPSILON: f64 = 1e-9;

/// Three-axis spherical rotation `[λ, φ, γ]` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub const fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }
    }

    pub const fn as_array(&self) -> [f64; 3] {
        [self.lambda, self.phi, self.gamma]
    }
}

/// Precomputed trig for a rotation, applied in radians.
#[derive(Debug, Clone, Copy)]
struct SphericalRotation {
    delta_lambda: f64,
    axis: Option<AxisRotation>,
}

#[derive(Debug, Clone, Copy)]
struct AxisRotation {
    cos_phi: f64,
    sin_phi: f64,
    cos_gamma: f64,
    sin_gamma: f64,
}

#[inline]
fn wrap_lambda(lambda: f64) -> f64 {
    if lambda.abs() > PI {
        lambda - (lambda / TAU).round() * TAU
    } else {
        lambda
    }
}

impl SphericalRotation {
    fn new(rotation: &Rotation) -> Self {
        let delta_lambda = rotation.lambda.to_radians() % TAU;
        let delta_phi = rotation.phi.to_radians();
        let delta_gamma = rotation.gamma.to_radians();
        let axis = (delta_phi != 0.0 || delta_gamma != 0.0).then(|| AxisRotation {
            cos_phi: delta_phi.cos(),
            sin_phi: delta_phi.sin(),
            cos_gamma: delta_gamma.cos(),
            sin_gamma: delta_gamma.sin(),
        });
        Self { delta_lambda, axis }
    }

    /// λ shift first, then rotation about the φ/γ axes.
    fn forward(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let lambda = wrap_lambda(lambda + self.delta_lambda);
        let Some(r) = self.axis else {
            return (lambda, phi);
        };
        let cos_p = phi.cos();
        let x = lambda.cos() * cos_p;
        let y = lambda.sin() * cos_p;
        let z = phi.sin();
        let k = z * r.cos_phi + x * r.sin_phi;
        (
            (y * r.cos_gamma - k * r.sin_gamma).atan2(x * r.cos_phi - z * r.sin_phi),
            (k * r.cos_gamma + y * r.sin_gamma).clamp(-1.0, 1.0).asin(),
        )
    }

    fn invert(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let (lambda, phi) = match self.axis {
            Some(r) => {
                let cos_p = phi.cos();
                let x = lambda.cos() * cos_p;
                let y = lambda.sin() * cos_p;
                let z = phi.sin();
                let k = z * r.cos_gamma - y * r.sin_gamma;
                (
                    (y * r.cos_gamma + z * r.sin_gamma).atan2(x * r.cos_phi + k * r.sin_phi),
                    (k * r.cos_phi - x * r.sin_phi).clamp(-1.0, 1.0).asin(),
                )
            }
            None => (lambda, phi),
        };
        (wrap_lambda(lambda - self.delta_lambda), phi)
    }
}

/// Cylindrical equal-area projection with rotation, scale and translation.
///
/// Screen `y` grows downward, so projected `y` is subtracted from the
/// translation.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    parallel_deg: f64,
    rotation: Rotation,
    translate: (f64, f64),
    scale: f64,
    cos_parallel: f64,
    spherical: SphericalRotation,
}

/// Build the map projection for a viewport and seam longitude.
///
/// `rotation_lambda` is not range-checked; longitude rotation is periodic.
pub fn configure(viewport_width: f64, viewport_height: f64, rotation_lambda: f64) -> Projection {
    Projection::new(
        STANDARD_PARALLEL_DEG,
        Rotation::new(rotation_lambda, SOUTH_UP_PHI_DEG, 0.0),
        (viewport_width / 2.0, viewport_height / 2.0),
        viewport_width / SCALE_DIVISOR,
    )
}

impl Projection {
    pub fn new(parallel_deg: f64, rotation: Rotation, translate: (f64, f64), scale: f64) -> Self {
        Self {
            parallel_deg,
            rotation,
            translate,
            scale,
            cos_parallel: parallel_deg.to_radians().cos(),
            spherical: SphericalRotation::new(&rotation),
        }
    }

    pub fn parallel(&self) -> f64 {
        self.parallel_deg
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    fn raw_to_screen(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let x = lambda * self.cos_parallel;
        let y = phi.sin() / self.cos_parallel;
        (
            self.translate.0 + self.scale * x,
            self.translate.1 - self.scale * y,
        )
    }

    /// Degrees `(lon, lat)` to viewport pixels.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (lambda, phi) = self
            .spherical
            .forward(lon.to_radians(), lat.to_radians());
        self.raw_to_screen(lambda, phi)
    }

    /// Viewport pixels to degrees `(lon, lat)`; `None` outside the map.
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let raw_x = (x - self.translate.0) / self.scale;
        let raw_y = (self.translate.1 - y) / self.scale;
        let lambda = raw_x / self.cos_parallel;
        let sin_phi = raw_y * self.cos_parallel;
        if !lambda.is_finite() || lambda.abs() > PI + EPSILON || sin_phi.abs() > 1.0 + EPSILON {
            return None;
        }
        let phi = sin_phi.clamp(-1.0, 1.0).asin();
        let (lambda, phi) = self.spherical.invert(lambda, phi);
        Some((lambda.to_degrees(), phi.to_degrees()))
    }

    /// Project a ring into one or more screen paths, cutting it where it
    /// crosses the seam so no segment spans the whole map.
    ///
    /// A closed ring that crosses the seam an odd number of times encloses a
    /// pole; its path is closed along the map edges and the pole row.
    pub fn project_ring(&self, ring: &LineString<f64>) -> Vec<Vec<(f64, f64)>> {
        let mut pieces: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::with_capacity(ring.0.len());
        let mut prev: Option<(f64, f64)> = None;
        // (edge λ, φ) of the first and last seam crossings.
        let mut first_cut: Option<(f64, f64)> = None;
        let mut last_cut: Option<(f64, f64)> = None;
        let mut cuts = 0usize;

        for coord in ring.coords() {
            let (lambda, phi) = self
                .spherical
                .forward(coord.x.to_radians(), coord.y.to_radians());
            if let Some((prev_lambda, prev_phi)) = prev
                && (lambda - prev_lambda).abs() > PI
            {
                let edge = if prev_lambda >= 0.0 { PI } else { -PI };
                let unwrapped = lambda + if edge > 0.0 { TAU } else { -TAU };
                let span = unwrapped - prev_lambda;
                let t = if span.abs() < EPSILON {
                    0.0
                } else {
                    (edge - prev_lambda) / span
                };
                let phi_cross = prev_phi + t * (phi - prev_phi);
                current.push(self.raw_to_screen(edge, phi_cross));
                pieces.push(std::mem::take(&mut current));
                current.push(self.raw_to_screen(-edge, phi_cross));
                first_cut.get_or_insert((edge, phi_cross));
                last_cut = Some((edge, phi_cross));
                cuts += 1;
            }
            current.push(self.raw_to_screen(lambda, phi));
            prev = Some((lambda, phi));
        }
        if !current.is_empty() {
            pieces.push(current);
        }

        let closed = ring.0.len() > 2 && ring.is_closed();
        if !closed || pieces.len() < 2 {
            return pieces;
        }

        // The trailing piece continues into the leading one.
        let Some(mut stitched) = pieces.pop() else {
            return pieces;
        };
        stitched.extend(pieces[0].drain(..).skip(1));

        // Stitched path runs from the last cut's far edge to the first cut's
        // near edge. Route it over the pole row so the cap is enclosed.
        if cuts % 2 == 1
            && let (Some((end_edge, _)), Some((last_edge, last_phi))) = (first_cut, last_cut)
        {
            let pole = if last_phi >= 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            stitched.push(self.raw_to_screen(end_edge, pole));
            stitched.push(self.raw_to_screen(-last_edge, pole));
        }
        pieces[0] = stitched;
        pieces
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
    fn configure_uses_fixed_policy() {
        let p = configure(1100.0, 600.0, -30.0);
        assert_eq!(p.rotation().as_array(), [-30.0, 180.0, 0.0]);
        assert_eq!(p.parallel(), 45.0);
        assert_eq!(p.translate(), (550.0, 300.0));
        assert_close(p.scale(), 200.0);
    }

    #[test]
    fn seam_opposite_point_maps_to_viewport_center() {
        // With no λ rotation the φ flip puts longitude 180 at the center.
        let p = configure(1100.0, 600.0, 0.0);
        let (x, y) = p.project(180.0, 0.0);
        assert_close(x, 550.0);
        assert_close(y, 300.0);

        let p = configure(1100.0, 600.0, -30.0);
        let (x, y) = p.project(-150.0, 0.0);
        assert_close(x, 550.0);
        assert_close(y, 300.0);
    }

    #[test]
    fn south_is_rendered_above_north() {
        let p = configure(1100.0, 600.0, 0.0);
        let (_, y_south) = p.project(170.0, -40.0);
        let (_, y_north) = p.project(170.0, 40.0);
        assert!(y_south < y_north);
        assert!(y_south < 300.0);
    }

    #[test]
    fn longitude_increases_leftward() {
        let p = configure(1100.0, 600.0, 0.0);
        let (x_170e, _) = p.project(170.0, 0.0);
        let (x_170w, _) = p.project(-170.0, 0.0);
        assert!(x_170w < x_170e);
    }

    #[test]
    fn invert_round_trips_projected_points() {
        let p = configure(960.0, 540.0, 25.0);
        for (lon, lat) in [(0.0, 0.0), (24.9, 60.2), (-58.4, -34.6), (139.7, 35.7)] {
            let (x, y) = p.project(lon, lat);
            let (lon2, lat2) = p.invert(x, y).unwrap();
            assert_close(lon2, lon);
            assert_close(lat2, lat);
        }
    }

    #[test]
    fn invert_rejects_points_outside_the_map() {
        let p = configure(1100.0, 600.0, 0.0);
        assert!(p.invert(-10_000.0, 300.0).is_none());
        assert!(p.invert(550.0, 10_000.0).is_none());
    }

    #[test]
    fn out_of_range_rotation_is_periodic() {
        let a = configure(1100.0, 600.0, 30.0);
        let b = configure(1100.0, 600.0, 390.0);
        let (ax, ay) = a.project(12.0, 48.0);
        let (bx, by) = b.project(12.0, 48.0);
        assert_close(ax, bx);
        assert_close(ay, by);
    }

    #[test]
    fn ring_away_from_seam_is_one_piece() {
        let p = configure(1100.0, 600.0, 0.0);
        let ring = LineString::from(vec![[100.0, 0.0], [110.0, 0.0], [110.0, 10.0], [100.0, 0.0]]);
        let pieces = p.project_ring(&ring);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 4);
    }

    #[test]
    fn ring_crossing_seam_is_cut_at_both_edges() {
        // Rotation 0 puts the seam at Greenwich.
        let p = configure(1100.0, 600.0, 0.0);
        let ring = LineString::from(vec![
            [-5.0, 40.0],
            [5.0, 40.0],
            [5.0, 50.0],
            [-5.0, 50.0],
            [-5.0, 40.0],
        ]);
        let pieces = p.project_ring(&ring);
        assert_eq!(pieces.len(), 2);
        let left_edge = 550.0 - 200.0 * PI * STANDARD_PARALLEL_DEG.to_radians().cos();
        let right_edge = 550.0 + 200.0 * PI * STANDARD_PARALLEL_DEG.to_radians().cos();
        for piece in &pieces {
            let xs: Vec<f64> = piece.iter().map(|pt| pt.0).collect();
            let touches_left = xs.iter().any(|x| (x - left_edge).abs() < 1e-6);
            let touches_right = xs.iter().any(|x| (x - right_edge).abs() < 1e-6);
            assert!(touches_left ^ touches_right);
        }
    }

    fn shoelace_area(path: &[(f64, f64)]) -> f64 {
        let n = path.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let (x0, y0) = path[i];
                let (x1, y1) = path[(i + 1) % n];
                x0 * y1 - x1 * y0
            })
            .sum();
        (twice / 2.0).abs()
    }

    #[test]
    fn ring_around_south_pole_fills_the_cap() {
        let p = configure(1100.0, 600.0, 0.0);
        // Longitudes avoid 0 so no vertex sits exactly on the seam.
        let mut coords: Vec<[f64; 2]> = (0..12).map(|i| [-165.0 + 30.0 * i as f64, -70.0]).collect();
        coords.push(coords[0]);
        let pieces = p.project_ring(&LineString::from(coords));
        assert_eq!(pieces.len(), 1);

        let cos_parallel = STANDARD_PARALLEL_DEG.to_radians().cos();
        let pole_y = 300.0 - 200.0 / cos_parallel;
        let ring_y = 300.0 - 200.0 * 70.0f64.to_radians().sin() / cos_parallel;
        let map_width = 2.0 * PI * 200.0 * cos_parallel;

        let path = &pieces[0];
        assert!(path.iter().any(|&(_, y)| (y - pole_y).abs() < 1e-6));
        // South up: the cap sits between the top of the map and the ring.
        assert!(pole_y < ring_y);
        let expected = map_width * (ring_y - pole_y);
        assert!((shoelace_area(path) - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn ring_around_north_pole_reaches_the_bottom_row() {
        let p = configure(1100.0, 600.0, 40.0);
        let mut coords: Vec<[f64; 2]> = (0..12).map(|i| [-172.0 + 30.0 * i as f64, 75.0]).collect();
        coords.push(coords[0]);
        let pieces = p.project_ring(&LineString::from(coords));
        assert_eq!(pieces.len(), 1);

        let bottom_y = 300.0 + 200.0 / STANDARD_PARALLEL_DEG.to_radians().cos();
        assert!(pieces[0].iter().any(|&(_, y)| (y - bottom_y).abs() < 1e-6));
        assert!(shoelace_area(&pieces[0]) > 1.0);
    }

    #[test]
    fn open_ring_crossing_seam_is_not_closed_over_a_pole() {
        let p = configure(1100.0, 600.0, 0.0);
        let line = LineString::from(vec![[-10.0, -60.0], [10.0, -60.0]]);
        let pieces = p.project_ring(&line);
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().all(|piece| piece.len() == 2));
    }
}
