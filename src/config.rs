use crate::selection::SelectorOptions;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub username: String,
    pub practice_set: String,
    pub random_questions: bool,
    pub recent_window: usize,
    pub tier_thresholds: Vec<f64>,
    pub time_budget_secs: Vec<u32>,
}

impl Default for Config {
    fn default() -> Self {
        let options = SelectorOptions::default();
        Self {
            username: "student".to_string(),
            practice_set: "arithmetic".to_string(),
            random_questions: false,
            recent_window: options.recent_window,
            tier_thresholds: options.tier_thresholds,
            time_budget_secs: options.time_budget_secs,
        }
    }
}

impl From<&Config> for SelectorOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            recent_window: cfg.recent_window,
            tier_thresholds: cfg.tier_thresholds.clone(),
            time_budget_secs: cfg.time_budget_secs.clone(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "mathdrill") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("mathdrill_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            username: "alice".into(),
            practice_set: "algebra".into(),
            random_questions: true,
            recent_window: 25,
            tier_thresholds: vec![0.3, 0.6],
            time_budget_secs: vec![60, 120, 180],
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn selector_options_from_config() {
        let cfg = Config {
            recent_window: 7,
            tier_thresholds: vec![0.5],
            time_budget_secs: vec![90, 90],
            ..Default::default()
        };
        let options = SelectorOptions::from(&cfg);
        assert_eq!(options.recent_window, 7);
        assert_eq!(options.tier_thresholds, vec![0.5]);
        assert_eq!(options.time_budget_secs, vec![90, 90]);
    }
}
