use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_WORLD_GEOJSON_PATH: &str = "data/world.geojson";
pub const DEFAULT_CLIENT_DIST_DIR: &str = "client/dist";

/// Cache lifetime for the atlas payloads; they only change on restart.
pub const ATLAS_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn world_geojson_path() -> PathBuf {
    path_from_env("WORLD_GEOJSON_PATH", DEFAULT_WORLD_GEOJSON_PATH)
}

pub fn client_dist_dir() -> PathBuf {
    path_from_env("CLIENT_DIST_DIR", DEFAULT_CLIENT_DIST_DIR)
}

fn path_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
