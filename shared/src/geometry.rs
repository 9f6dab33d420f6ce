use std::fmt;

use geo::{BoundingRect, Centroid, Contains, LineString, MultiPolygon, Point, Polygon, Rect};
use geojson::{Feature, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Closed ring of `[lon, lat]` positions in degrees, as sent over the wire.
pub type RingCoords = Vec<[f64; 2]>;
/// Exterior ring followed by zero or more holes.
pub type PolygonCoords = Vec<RingCoords>;

/// Feature properties checked, in order, for a region's canonical name.
const NAME_PROPERTIES: [&str; 3] = ["name", "NAME", "ADMIN"];

#[derive(Debug)]
pub enum GeometryError {
    Json(serde_json::Error),
    NotAFeatureCollection(String),
    EmptyGeometry(String),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid GeoJSON document: {e}"),
            Self::NotAFeatureCollection(kind) => {
                write!(f, "expected a FeatureCollection, found {kind}")
            }
            Self::EmptyGeometry(name) => write!(f, "region {name:?} has no coordinates"),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GeometryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Axis-aligned longitude/latitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn width_deg(&self) -> f64 {
        (self.max_lon - self.min_lon).abs()
    }

    pub fn height_deg(&self) -> f64 {
        (self.max_lat - self.min_lat).abs()
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        ]
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

impl From<Rect<f64>> for GeoBounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }
}

/// Wire form of a region: just the name and its polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    pub name: String,
    pub polygons: Vec<PolygonCoords>,
}

/// A named geographic area with its derived label anchors.
///
/// Bounds and centroid are computed once on construction; the geometry is
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegionShape", into = "RegionShape")]
pub struct Region {
    name: String,
    shape: MultiPolygon<f64>,
    bounds: GeoBounds,
    centroid: [f64; 2],
}

impl Region {
    pub fn new(
        name: impl Into<String>,
        polygons: Vec<PolygonCoords>,
    ) -> Result<Self, GeometryError> {
        let shape = polygons.into_iter().map(polygon_from_coords).collect();
        Self::from_shape(name, shape)
    }

    /// Build a region from already-parsed geometry.
    pub fn from_shape(
        name: impl Into<String>,
        shape: MultiPolygon<f64>,
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        let Some(bounds) = shape.bounding_rect().map(GeoBounds::from) else {
            return Err(GeometryError::EmptyGeometry(name));
        };
        // geo yields no centroid for shapes it cannot weigh.
        let centroid = shape
            .centroid()
            .map(|c| [c.x(), c.y()])
            .filter(|[x, y]| x.is_finite() && y.is_finite())
            .unwrap_or_else(|| bounds.center());
        Ok(Self {
            name,
            shape,
            bounds,
            centroid,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// Every ring of every polygon, exteriors before their holes.
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> + '_ {
        self.shape
            .iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// Label anchor as `[lon, lat]`.
    pub fn centroid(&self) -> [f64; 2] {
        self.centroid
    }

    /// Point-in-polygon test honouring holes. Points on a boundary are outside.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bounds.contains(lon, lat) && self.shape.contains(&Point::new(lon, lat))
    }
}

impl TryFrom<RegionShape> for Region {
    type Error = GeometryError;

    fn try_from(shape: RegionShape) -> Result<Self, Self::Error> {
        Self::new(shape.name, shape.polygons)
    }
}

impl From<Region> for RegionShape {
    fn from(region: Region) -> Self {
        let polygons = region
            .shape
            .iter()
            .map(|polygon| {
                std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                    .collect()
            })
            .collect();
        Self {
            name: region.name,
            polygons,
        }
    }
}

fn polygon_from_coords(rings: PolygonCoords) -> Polygon<f64> {
    let mut rings = rings.into_iter().map(LineString::from);
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, rings.collect())
}

/// A feature that could not be turned into a region.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct GeoJsonImport {
    pub regions: Vec<Region>,
    pub skipped: Vec<SkippedFeature>,
}

fn feature_name(properties: Option<&JsonObject>) -> Option<String> {
    let properties = properties?;
    NAME_PROPERTIES.iter().find_map(|key| {
        properties
            .get(*key)
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
    })
}

/// geo's conversion indexes `[0]` and `[1]` of every position.
fn has_planar_positions(value: &geojson::Value) -> bool {
    match value {
        geojson::Value::Polygon(rings) => rings.iter().flatten().all(|pos| pos.len() >= 2),
        geojson::Value::MultiPolygon(polygons) => {
            polygons.iter().flatten().flatten().all(|pos| pos.len() >= 2)
        }
        _ => false,
    }
}

fn feature_shape(feature: Feature) -> Result<MultiPolygon<f64>, &'static str> {
    let Some(geometry) = feature.geometry else {
        return Err("geometry is not a Polygon or MultiPolygon");
    };
    if !matches!(
        geometry.value,
        geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_)
    ) {
        return Err("geometry is not a Polygon or MultiPolygon");
    }
    if !has_planar_positions(&geometry.value) {
        return Err("position with fewer than two coordinates");
    }
    match geo::Geometry::<f64>::try_from(geometry.value) {
        Ok(geo::Geometry::Polygon(polygon)) => Ok(MultiPolygon::new(vec![polygon])),
        Ok(geo::Geometry::MultiPolygon(multi)) => Ok(multi),
        _ => Err("geometry is not a Polygon or MultiPolygon"),
    }
}

/// Parse a GeoJSON `FeatureCollection` into regions, preserving feature order.
///
/// Each feature is decoded on its own, so a malformed feature, one without a
/// usable name, or one without polygonal geometry is skipped and reported
/// rather than failing the whole import.
pub fn regions_from_geojson(json: &str) -> Result<GeoJsonImport, GeometryError> {
    let mut document: JsonObject = serde_json::from_str(json)?;
    let kind = document
        .get("type")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    if kind != "FeatureCollection" {
        return Err(GeometryError::NotAFeatureCollection(kind.to_owned()));
    }
    let features = match document.remove("features") {
        Some(JsonValue::Array(features)) => features,
        _ => Vec::new(),
    };

    let mut import = GeoJsonImport::default();
    for (index, value) in features.into_iter().enumerate() {
        let feature = match Feature::from_json_value(value) {
            Ok(feature) => feature,
            Err(_) => {
                import.skipped.push(SkippedFeature {
                    index,
                    reason: "malformed feature",
                });
                continue;
            }
        };
        let Some(name) = feature_name(feature.properties.as_ref()) else {
            import.skipped.push(SkippedFeature {
                index,
                reason: "missing name property",
            });
            continue;
        };
        let region = feature_shape(feature).and_then(|shape| {
            Region::from_shape(name, shape).map_err(|_| "empty geometry")
        });
        match region {
            Ok(region) => import.regions.push(region),
            Err(reason) => import.skipped.push(SkippedFeature { index, reason }),
        }
    }
    Ok(import)
}
