use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, bail};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use endonym_map_shared::labels::MIN_LABEL_WIDTH_DEG;
use endonym_map_shared::names;
use endonym_map_shared::regions_from_geojson;
use tracing::{info, warn};

/// Region geometry and the endonym table, serialized once at startup.
#[derive(Debug, Clone)]
pub struct AtlasSnapshot {
    pub regions_json: Bytes,
    pub endonyms_json: Bytes,
    pub etag: String,
    pub region_count: usize,
    pub labelled_regions: usize,
    pub skipped_features: usize,
    pub loaded_at: DateTime<Utc>,
}

impl AtlasSnapshot {
    pub fn from_geojson(json: &str) -> anyhow::Result<Self> {
        let import = regions_from_geojson(json).context("failed to parse world GeoJSON")?;
        for skipped in &import.skipped {
            warn!(
                feature = skipped.index,
                reason = skipped.reason,
                "skipping GeoJSON feature"
            );
        }
        if import.regions.is_empty() {
            bail!("world GeoJSON contains no usable regions");
        }

        let regions_json = serde_json::to_vec(&import.regions)
            .map(Bytes::from)
            .context("failed to serialize regions")?;
        let endonyms: BTreeMap<_, _> = names::name_mapping().iter().collect();
        let endonyms_json = serde_json::to_vec(&endonyms)
            .map(Bytes::from)
            .context("failed to serialize endonym table")?;

        let labelled_regions = import
            .regions
            .iter()
            .filter(|region| region.bounds().width_deg() > MIN_LABEL_WIDTH_DEG)
            .count();

        Ok(Self {
            etag: regions_etag(&regions_json),
            regions_json,
            endonyms_json,
            region_count: import.regions.len(),
            labelled_regions,
            skipped_features: import.skipped.len(),
            loaded_at: Utc::now(),
        })
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let snapshot =
            Self::from_geojson(&json).with_context(|| format!("failed to load {}", path.display()))?;
        info!(
            path = %path.display(),
            regions = snapshot.region_count,
            labelled = snapshot.labelled_regions,
            skipped = snapshot.skipped_features,
            bytes = snapshot.regions_json.len(),
            "World atlas loaded"
        );
        Ok(snapshot)
    }
}

fn regions_etag(body: &[u8]) -> String {
    format!("\"regions-{:08x}\"", crc32fast::hash(body))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Finland" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[20.0, 60.0], [31.0, 60.0], [31.0, 70.0], [20.0, 70.0], [20.0, 60.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Monaco" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[7.4, 43.7], [7.5, 43.7], [7.5, 43.8], [7.4, 43.7]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Point",
                    "coordinates": [0.0, 0.0]
                }
            }
        ]
    }"#;

    #[test]
    fn snapshot_counts_regions_and_labels() {
        let snapshot = AtlasSnapshot::from_geojson(SAMPLE_GEOJSON).unwrap();
        assert_eq!(snapshot.region_count, 2);
        assert_eq!(snapshot.labelled_regions, 1);
        assert_eq!(snapshot.skipped_features, 1);

        let regions: serde_json::Value = serde_json::from_slice(&snapshot.regions_json).unwrap();
        assert_eq!(regions[0]["name"], "Finland");
        assert_eq!(regions[1]["name"], "Monaco");

        let endonyms: serde_json::Value = serde_json::from_slice(&snapshot.endonyms_json).unwrap();
        assert_eq!(endonyms["Finland"], "Suomi");
    }

    #[test]
    fn etag_tracks_payload() {
        let a = AtlasSnapshot::from_geojson(SAMPLE_GEOJSON).unwrap();
        let b = AtlasSnapshot::from_geojson(SAMPLE_GEOJSON).unwrap();
        assert_eq!(a.etag, b.etag);
        assert!(a.etag.starts_with("\"regions-") && a.etag.ends_with('"'));

        let other = SAMPLE_GEOJSON.replace("Finland", "Suomi");
        let c = AtlasSnapshot::from_geojson(&other).unwrap();
        assert_ne!(a.etag, c.etag);
    }

    #[test]
    fn rejects_documents_without_regions() {
        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(AtlasSnapshot::from_geojson(empty).is_err());
        assert!(AtlasSnapshot::from_geojson("not json").is_err());
    }

    #[tokio::test]
    async fn load_reports_missing_file_path() {
        let err = AtlasSnapshot::load(Path::new("/nonexistent/world.geojson"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/world.geojson"));
    }
}
