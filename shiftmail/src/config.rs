use config::{Config, ConfigError, Environment, File};
use extractors::ShiftScheduleConfig;
use serde::{Deserialize, Serialize};
use shared_types::NameFilter;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# Person whose shifts are kept when filter_by_name is on
name = "Jeshad"
filter_by_name = true

# Zone used to turn the email's Date header into a calendar day
timezone = "America/Phoenix"

# Title for rows without a WORKSHOP (...) override
default_title = "Shift"

# Keep rows that have no time range but start with a known site or name a workshop
keep_timeless_rows = true

known_sites = [
    "Aeroterra",
    "CTEC",
    "Guadalupe",
    "Tempe",
    "Chandler",
    "Mesa",
    "Superior",
    "Sierra Vista",
]
"#;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub filter_by_name: bool,
    pub timezone: String,
    pub default_title: String,
    pub known_sites: Vec<String>,
    pub keep_timeless_rows: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let schedule = ShiftScheduleConfig::default();
        Self {
            name: "Jeshad".to_string(),
            filter_by_name: true,
            timezone: "America/Phoenix".to_string(),
            default_title: schedule.default_title,
            known_sites: schedule.known_sites,
            keep_timeless_rows: schedule.keep_timeless_rows,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the per-user config file when none is given.
    /// `SHIFTMAIL_*` environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
        let config = Self::load_from(&config_path, Some("SHIFTMAIL"))?;
        Ok((config, config_path))
    }

    fn load_from(config_path: &Path, env_prefix: Option<&str>) -> Result<Self, ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let mut builder = Config::builder().add_source(File::from(config_path.to_path_buf()));
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("known_sites"),
            );
        }

        builder.build()?.try_deserialize()
    }

    pub fn name_filter(&self) -> NameFilter {
        NameFilter::new(self.name.clone(), self.filter_by_name)
    }

    pub fn schedule_config(&self) -> ShiftScheduleConfig {
        ShiftScheduleConfig {
            known_sites: self.known_sites.clone(),
            keep_timeless_rows: self.keep_timeless_rows,
            default_title: self.default_title.clone(),
        }
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("shiftmail").join("config.toml")
    } else {
        PathBuf::from("shiftmail.toml")
    }
}
