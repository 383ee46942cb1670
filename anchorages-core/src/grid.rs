use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use crate::METERS_PER_DEGREE;

/// Slack added to query radii so that a point exactly one cell away is never missed due to the
/// difference between the flat cell size and the haversine distance.
const REACH_MARGIN: f64 = 1.01;
const MIN_CELL_DEGREES: f64 = 1e-6;
const MIN_COS_LATITUDE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey {
    lat: i64,
    lon: i64,
}

/// Fixed-size latitude/longitude bucket index over references of type `T`.
///
/// Queries only return candidates, callers filter them by exact distance.
#[derive(Debug, Clone)]
pub struct GeoGrid<T> {
    cell_degrees: f64,
    lon_cells: i64,
    cells: HashMap<CellKey, HashSet<T>>,
    entries: HashMap<T, CellKey>,
}

impl<T: Copy + Eq + Hash> GeoGrid<T> {
    pub fn new(cell_size_meters: f64) -> Self {
        let cell_degrees = (cell_size_meters / METERS_PER_DEGREE).clamp(MIN_CELL_DEGREES, 180.0);
        Self {
            cell_degrees,
            lon_cells: (360.0 / cell_degrees).ceil() as i64,
            cells: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// A grid where a query with `radius` only visits the query cell and its direct neighbours
    /// near the equator.
    pub fn for_radius(radius_meters: f64) -> Self {
        Self::new(radius_meters * REACH_MARGIN)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.entries.contains_key(item)
    }

    /// Inserts `item` at the given position, moving it if it is already indexed.
    pub fn insert(&mut self, latitude: f64, longitude: f64, item: T) {
        let key = self.cell_of(latitude, longitude);
        if let Some(previous) = self.entries.insert(item, key) {
            if previous == key {
                return;
            }
            self.remove_from_cell(previous, &item);
        }
        self.cells.entry(key).or_default().insert(item);
    }

    pub fn remove(&mut self, item: &T) -> bool {
        match self.entries.remove(item) {
            Some(key) => {
                self.remove_from_cell(key, item);
                true
            }
            None => false,
        }
    }

    /// Every reference indexed in a cell that may hold points within `radius_meters` of the
    /// query position.
    pub fn neighbors(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> impl Iterator<Item = T> + '_ {
        self.neighbor_cells(latitude, longitude, radius_meters)
            .into_iter()
            .filter_map(|key| self.cells.get(&key))
            .flat_map(|items| items.iter().copied())
    }

    fn neighbor_cells(&self, latitude: f64, longitude: f64, radius_meters: f64) -> Vec<CellKey> {
        let center = self.cell_of(latitude, longitude);
        let reach = radius_meters.max(0.0) * REACH_MARGIN;
        let cell_meters = self.cell_degrees * METERS_PER_DEGREE;

        let lat_span = rings(reach / cell_meters);

        // The widest ring is needed at the latitude closest to a pole within reach.
        let max_abs_latitude = (latitude.abs() + reach / METERS_PER_DEGREE).min(90.0);
        let cos = max_abs_latitude.to_radians().cos().max(MIN_COS_LATITUDE);
        let lon_span = rings(reach / (cell_meters * cos)).min(self.lon_cells / 2);
        let full_ring = 2 * lon_span + 1 >= self.lon_cells;

        let num_lon = if full_ring { self.lon_cells } else { 2 * lon_span + 1 };
        let num_cells = (2 * lat_span + 1).saturating_mul(num_lon);

        // Polar windows can cover every longitude column, scan the occupied cells instead.
        if num_cells > self.cells.len() as i64 {
            return self
                .cells
                .keys()
                .filter(|key| (key.lat - center.lat).abs() <= lat_span)
                .filter(|key| {
                    let offset = (key.lon - center.lon).rem_euclid(self.lon_cells);
                    full_ring || offset <= lon_span || offset >= self.lon_cells - lon_span
                })
                .copied()
                .collect();
        }

        let lon_indices: Vec<i64> = if full_ring {
            (0..self.lon_cells).collect()
        } else {
            (-lon_span..=lon_span)
                .map(|offset| (center.lon + offset).rem_euclid(self.lon_cells))
                .collect()
        };

        (-lat_span..=lat_span)
            .flat_map(|offset| {
                lon_indices.iter().map(move |lon| CellKey {
                    lat: center.lat + offset,
                    lon: *lon,
                })
            })
            .collect()
    }

    fn cell_of(&self, latitude: f64, longitude: f64) -> CellKey {
        let lat = ((latitude + 90.0) / self.cell_degrees).floor() as i64;
        let lon = ((longitude + 180.0) / self.cell_degrees).floor() as i64;
        CellKey {
            lat,
            lon: lon.rem_euclid(self.lon_cells),
        }
    }

    fn remove_from_cell(&mut self, key: CellKey, item: &T) {
        if let Some(items) = self.cells.get_mut(&key) {
            items.remove(item);
            if items.is_empty() {
                self.cells.remove(&key);
            }
        }
    }
}

fn rings(cells: f64) -> i64 {
    if cells.is_finite() {
        ((cells - 1e-9).ceil() as i64).max(1)
    } else {
        i64::MAX / 4
    }
}
