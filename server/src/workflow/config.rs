use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use stormcore::prelude::EngineConfig;
use stormcore::records::StationConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub stations: Vec<StationConfig>,
    pub time_window_secs: f64,
    pub debounce_secs: f64,
    pub retention_secs: f64,
    pub propagation_kms: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            stations: vec![
                StationConfig {
                    station_id: 1,
                    origin_lat: 38.002729,
                    origin_lon: 23.675644,
                },
                StationConfig {
                    station_id: 2,
                    origin_lat: 38.35,
                    origin_lon: 23.95,
                },
                StationConfig {
                    station_id: 3,
                    origin_lat: 37.75,
                    origin_lon: 24.15,
                },
            ],
            time_window_secs: 0.4,
            debounce_secs: 0.0,
            retention_secs: 30.0,
            propagation_kms: 300_000.0,
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading server config {}", path_ref.display()))?;
        let config: ServerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing server config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(time_window_secs: f64, debounce_secs: f64) -> Self {
        Self {
            time_window_secs,
            debounce_secs,
            ..Default::default()
        }
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            stations: self.stations.clone(),
            time_window_secs: self.time_window_secs,
            debounce_secs: self.debounce_secs,
            retention_secs: self.retention_secs,
            propagation_kms: self.propagation_kms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_feeds_engine_config() {
        let cfg = ServerConfig::from_args(0.4, 1.0);
        let engine_cfg = cfg.to_engine_config();
        assert_eq!(engine_cfg.time_window_secs, 0.4);
        assert_eq!(engine_cfg.debounce_secs, 1.0);
        assert_eq!(engine_cfg.stations.len(), 3);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"stations:\n  - station_id: 7\n    origin_lat: 38.0\n    origin_lon: 23.7\ntime_window_secs: 0.5\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ServerConfig::load(&path).unwrap();
        assert_eq!(cfg.stations.len(), 1);
        assert_eq!(cfg.stations[0].station_id, 7);
        assert_eq!(cfg.time_window_secs, 0.5);
        // Unspecified fields fall back to deployment defaults.
        assert_eq!(cfg.propagation_kms, 300_000.0);
    }
}
