use crate::models::PageSpec;
use money_fx::RateTable;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub images: ImagePolicy,

    #[serde(default)]
    pub templates: TemplateSourceConfig,

    /// Directory where saved artifacts are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Static conversion rates, applied in the listed direction only
    #[serde(default)]
    pub rates: Vec<RateEntry>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

/// Page geometry settings
#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    /// Raster resolution for templated rendering
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_dpi() -> u32 {
    150
}

impl Default for PageConfig {
    fn default() -> Self {
        Self { dpi: default_dpi() }
    }
}

impl PageConfig {
    pub fn spec(&self) -> PageSpec {
        PageSpec::a4(self.dpi)
    }
}

/// What to do when an embedded image cannot be fetched
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageErrorPolicy {
    /// Fail the templated path (fallback document is produced instead)
    #[default]
    Strict,
    /// Substitute a neutral placeholder and keep rendering
    Placeholder,
}

/// Embedded-image resolution settings
#[derive(Debug, Deserialize, Clone)]
pub struct ImagePolicy {
    #[serde(default)]
    pub on_error: ImageErrorPolicy,

    /// Per-image fetch timeout in seconds
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
}

fn default_image_timeout() -> u64 {
    10
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            on_error: ImageErrorPolicy::default(),
            timeout_secs: default_image_timeout(),
        }
    }
}

/// Where template sources are fetched from
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateSourceConfig {
    /// Remote template endpoint; templates are fetched as `{base_url}/{id}.svg`.
    /// When unset, bundled templates are used.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Filesystem override directory for bundled templates
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Optional fonts directory loaded in addition to system fonts
    #[serde(default)]
    pub fonts_dir: Option<PathBuf>,
}

/// One directional conversion rate
#[derive(Debug, Deserialize, Clone)]
pub struct RateEntry {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            images: ImagePolicy::default(),
            templates: TemplateSourceConfig::default(),
            output_dir: default_output_dir(),
            rates: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults on error
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!(
                        rates = config.rates.len(),
                        dpi = config.page.dpi,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Build the conversion rate table from the configured entries.
    ///
    /// Invalid entries (non-positive rate, empty code) are skipped with a
    /// warning rather than failing startup.
    pub fn rate_table(&self) -> RateTable {
        let mut table = RateTable::new();
        for entry in &self.rates {
            if let Err(e) = table.insert(&entry.from, &entry.to, entry.rate) {
                tracing::warn!(%e, from = %entry.from, to = %entry.to, "Skipping invalid rate entry");
            }
        }
        table
    }
}
