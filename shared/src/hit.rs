use crate::geometry::{GeoBounds, Region};

const GRID_COLS: usize = 72;
const GRID_ROWS: usize = 36;

/// A flat lon/lat grid over region bounds for hover hit-testing.
/// Built once when the regions load.
pub struct HitGrid {
    cells: Vec<Vec<usize>>,
    bounds: Vec<GeoBounds>,
    min_lon: f64,
    min_lat: f64,
    cell_w: f64,
    cell_h: f64,
}

impl HitGrid {
    pub fn build(regions: &[Region]) -> Self {
        let Some(world) = regions
            .iter()
            .map(|r| *r.bounds())
            .reduce(|a, b| a.union(&b))
        else {
            return Self {
                cells: Vec::new(),
                bounds: Vec::new(),
                min_lon: 0.0,
                min_lat: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        };

        // Pad so points on the outer edge land inside the grid.
        let min_lon = world.min_lon - 0.5;
        let min_lat = world.min_lat - 0.5;
        let cell_w = (world.width_deg() + 1.0) / GRID_COLS as f64;
        let cell_h = (world.height_deg() + 1.0) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        let mut bounds = Vec::with_capacity(regions.len());

        for (idx, region) in regions.iter().enumerate() {
            let b = *region.bounds();
            bounds.push(b);

            let col_start = ((b.min_lon - min_lon) / cell_w).floor().max(0.0) as usize;
            let col_end = (((b.max_lon - min_lon) / cell_w).floor() as usize + 1).min(GRID_COLS);
            let row_start = ((b.min_lat - min_lat) / cell_h).floor().max(0.0) as usize;
            let row_end = (((b.max_lat - min_lat) / cell_h).floor() as usize + 1).min(GRID_ROWS);

            for row in row_start..row_end {
                for col in col_start..col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            bounds,
            min_lon,
            min_lat,
            cell_w,
            cell_h,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Candidate region indices whose bounds contain the point.
    pub fn candidates(&self, lon: f64, lat: f64) -> impl Iterator<Item = usize> + '_ {
        let cell = self.cell_index(lon, lat).map(|i| self.cells[i].as_slice());
        cell.unwrap_or_default()
            .iter()
            .copied()
            .filter(move |&idx| self.bounds[idx].contains(lon, lat))
    }

    /// Index of the region under `(lon, lat)`. `regions` must be the slice
    /// the grid was built from.
    pub fn find_at(&self, regions: &[Region], lon: f64, lat: f64) -> Option<usize> {
        self.candidates(lon, lat)
            .find(|&idx| regions.get(idx).is_some_and(|r| r.contains(lon, lat)))
    }

    fn cell_index(&self, lon: f64, lat: f64) -> Option<usize> {
        if self.cells.is_empty() || !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let col = ((lon - self.min_lon) / self.cell_w).floor() as isize;
        let row = ((lat - self.min_lat) / self.cell_h).floor() as isize;
        if col < 0 || row < 0 || col >= GRID_COLS as isize || row >= GRID_ROWS as isize {
            return None;
        }
        Some(row as usize * GRID_COLS + col as usize)
    }
}
