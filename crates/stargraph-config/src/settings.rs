//! Application configuration structures

use serde::{Deserialize, Serialize};
use stargraph_common::GithubConfig;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// GitHub API access configuration
    pub github: GithubSettings,

    /// Output file configuration
    pub output: OutputSettings,

    /// Chart rendering settings
    pub chart: ChartSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GithubSettings {
    /// Personal access token; empty sends unauthenticated requests,
    /// which GitHub rate limits far more aggressively
    pub token: String,

    /// GitHub API base URL
    #[validate(url(message = "API base must be a valid URL"))]
    pub api_base: String,

    /// Account whose repositories are charted when no explicit targets are given
    pub user: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Maximum API requests per second
    #[validate(range(min = 1, max = 50, message = "Rate limit must be between 1 and 50 requests per second"))]
    pub rate_limit_per_sec: u32,

    /// Maximum number of retries for failed requests
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: u32,

    /// Page size for paginated API listings
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: u32,
}

/// Output file configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory chart PNG files are written to
    #[validate(length(min = 1, message = "Output directory cannot be empty"))]
    pub directory: String,

    /// Markdown summary file name; empty disables the summary
    pub summary_file: String,
}

/// Chart rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartSettings {
    /// Chart width in pixels
    #[validate(range(min = 200, max = 4000, message = "Width must be between 200 and 4000 pixels"))]
    pub width: u32,

    /// Chart height in pixels
    #[validate(range(min = 200, max = 4000, message = "Height must be between 200 and 4000 pixels"))]
    pub height: u32,

    /// Background color (hex format)
    #[validate(length(equal = 7, message = "Background color must be 7 characters (e.g., #FFFFFF)"))]
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be a valid hex color"))]
    pub background_color: String,

    /// Line and point color (hex format)
    #[validate(length(equal = 7, message = "Line color must be 7 characters (e.g., #4BC0C0)"))]
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Line color must be a valid hex color"))]
    pub line_color: String,

    /// Area fill color (hex format)
    #[validate(length(equal = 7, message = "Fill color must be 7 characters (e.g., #4BC0C0)"))]
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Fill color must be a valid hex color"))]
    pub fill_color: String,

    /// Caption font size
    #[validate(range(min = 8, max = 72, message = "Title font size must be between 8 and 72"))]
    pub title_font_size: u32,

    /// Axis label font size
    #[validate(range(min = 8, max = 72, message = "Label font size must be between 8 and 72"))]
    pub label_font_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Whether to emit JSON formatted logs
    pub json_format: bool,
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.github.validate()?;
        self.output.validate()?;
        self.chart.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl GithubSettings {
    /// Build the API client configuration from these settings
    pub fn client_config(&self) -> GithubConfig {
        GithubConfig::new(self.token.clone())
            .with_api_base(self.api_base.clone())
            .with_timeout(self.timeout_seconds)
            .with_rate_limit(self.rate_limit_per_sec)
            .with_max_retries(self.max_retries as usize)
            .with_page_size(self.page_size)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GithubSettings::default(),
            output: OutputSettings::default(),
            chart: ChartSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: "https://api.github.com".to_string(),
            user: None,
            timeout_seconds: 30,
            rate_limit_per_sec: 5,
            max_retries: 3,
            page_size: 100,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: "images".to_string(),
            summary_file: "STARS.md".to_string(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background_color: "#FFFFFF".to_string(),
            line_color: "#4BC0C0".to_string(),
            fill_color: "#4BC0C0".to_string(),
            title_font_size: 24,
            label_font_size: 14,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
