use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DIST_DIR: &str = "client/dist";

pub const DATA_CACHE_CONTROL: &str = "public, max-age=3600";
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Directory holding the GeoJSON collections named by the dataset presets.
pub fn data_dir() -> PathBuf {
    dir_from_env("DATA_DIR", DEFAULT_DATA_DIR)
}

/// Built client bundle (index.html, wasm, js).
pub fn dist_dir() -> PathBuf {
    dir_from_env("DIST_DIR", DEFAULT_DIST_DIR)
}

fn dir_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{DEFAULT_SERVER_PORT, data_dir, dist_dir, server_port};

    #[test]
    fn port_defaults_when_unset_or_invalid() {
        temp_env::with_var_unset("PORT", || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("PORT", Some("not-a-port"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
    }

    #[test]
    fn port_reads_environment() {
        temp_env::with_var("PORT", Some("8080"), || {
            assert_eq!(server_port(), 8080);
        });
    }

    #[test]
    fn directories_read_environment_and_ignore_blank_values() {
        temp_env::with_vars([("DATA_DIR", Some("/srv/data")), ("DIST_DIR", Some("  "))], || {
            assert_eq!(data_dir(), PathBuf::from("/srv/data"));
            assert_eq!(dist_dir(), PathBuf::from("client/dist"));
        });
        temp_env::with_vars_unset(["DATA_DIR", "DIST_DIR"], || {
            assert_eq!(data_dir(), PathBuf::from("data"));
        });
    }
}
