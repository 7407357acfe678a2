/// Where the server mounts the GeoJSON collections.
pub const DATA_BASE_URL: &str = "/data";

/// `?dataset=<key>` selects a preset.
pub const DATASET_QUERY_KEY: &str = "dataset";

pub const POPUP_OFFSET_PX: u32 = 12;

/// Baked in at build time; the map cannot load its base style without one.
pub fn mapbox_token() -> &'static str {
    option_env!("MAPBOX_ACCESS_TOKEN").unwrap_or("")
}

pub fn data_url(file: &str) -> String {
    format!("{DATA_BASE_URL}/{}", file.trim_start_matches('/'))
}

/// Preset key from a location search string such as `?dataset=stations&x=1`.
pub fn dataset_key(search: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == DATASET_QUERY_KEY)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
