use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Name of the log file created in the user's home directory
pub const DEFAULT_LOG_FILE: &str = "Kicad_BOM_Logging.txt";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate]
    pub logging: LoggingConfig,
    #[validate]
    pub pricing: PricingConfig,
    #[validate]
    pub grouping: GroupingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    #[validate(length(min = 1, message = "Log level must not be empty"))]
    pub level: String,
    /// `text` or `json`
    pub format: String,
    /// Log file location; defaults to the home directory
    pub file_path: Option<String>,
    /// Keep the previous log instead of truncating it
    pub append: bool,
    /// Log to stderr instead of a file
    pub to_stderr: bool,
}

/// Online pricing services the exporter can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingService {
    FindChips,
}

impl fmt::Display for PricingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindChips => write!(f, "FindChips"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PricingConfig {
    pub service: Option<PricingService>,
    #[validate(url(message = "Pricing base URL is not a valid URL"))]
    pub base_url: String,
    pub api_key: Option<String>,
    #[validate(range(min = 1, max = 100, message = "Result limit must be between 1 and 100"))]
    pub result_limit: u32,
    /// No timeout unless configured
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GroupingConfig {
    pub enabled: bool,
    #[validate(length(min = 1, message = "Part number field must not be empty"))]
    pub part_number_field: String,
    /// Part number value that never matches anything
    pub no_part_sentinel: String,
    pub split_footprint_library: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file_path: None,
            append: false,
            to_stderr: false,
        }
    }
}

impl LoggingConfig {
    /// Where the log file goes when logging to a file
    pub fn resolved_file_path(&self) -> PathBuf {
        match &self.file_path {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(DEFAULT_LOG_FILE),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            service: None,
            base_url: "http://api.findchips.com".to_string(),
            api_key: None,
            result_limit: 15,
            timeout_seconds: None,
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            part_number_field: "Mfg_Part_No".to_string(),
            no_part_sentinel: "-".to_string(),
            split_footprint_library: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the optional config files, an explicit
    /// `--config` file and `KICAD_BOM__*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix("KICAD_BOM").separator("__"))
            .build()?
            .try_deserialize()
    }
}
