use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFamilies {
    #[serde(default = "default_normal_family")]
    pub normal: String,

    #[serde(default = "default_inverted_family")]
    pub inverted: String,

    #[serde(default = "default_glyph_family")]
    pub glyph: String,
}

fn default_normal_family() -> String {
    "Skyfont".to_string()
}

fn default_inverted_family() -> String {
    "Skyfont Inverted".to_string()
}

fn default_glyph_family() -> String {
    "Airport Icons".to_string()
}

impl Default for FontFamilies {
    fn default() -> Self {
        Self {
            normal: default_normal_family(),
            inverted: default_inverted_family(),
            glyph: default_glyph_family(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// CSV export of the flight-records table
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Scratch space for chart PNGs; they are deleted once embedded
    #[serde(default = "default_charts_dir")]
    pub charts_dir: PathBuf,

    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,

    #[serde(default = "default_logo_path")]
    pub logo_path: PathBuf,

    /// Operator airline every KPI is filtered on
    #[serde(default = "default_airline")]
    pub airline: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default)]
    pub fonts: FontFamilies,

    /// Region name -> airport codes, used by the route charts
    #[serde(default = "default_regions")]
    pub regions: BTreeMap<String, Vec<String>>,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data/flights.csv")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("data_analysis/reports")
}

fn default_charts_dir() -> PathBuf {
    PathBuf::from("data_analysis/charts")
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("fonts")
}

fn default_logo_path() -> PathBuf {
    PathBuf::from("resources/tunisair_alert_logo.png")
}

fn default_airline() -> String {
    "TU".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_regions() -> BTreeMap<String, Vec<String>> {
    let codes = |list: &[&str]| list.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        (
            "TUNISIA".to_string(),
            codes(&["TUN", "DJE", "MIR", "NBE", "SFA", "TOE", "GAF", "TBJ"]),
        ),
        (
            "FRANCE".to_string(),
            codes(&["CDG", "ORY", "MRS", "NCE", "LYS", "TLS", "BOD", "NTE", "LIL", "SXB", "MPL"]),
        ),
    ])
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            reports_dir: default_reports_dir(),
            charts_dir: default_charts_dir(),
            fonts_dir: default_fonts_dir(),
            logo_path: default_logo_path(),
            airline: default_airline(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            fonts: FontFamilies::default(),
            regions: default_regions(),
        }
    }
}

impl ReportConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ReportConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Airport codes of a configured region; unknown regions are empty.
    pub fn region_airports(&self, region: &str) -> &[String] {
        self.regions.get(region).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub static CONFIG: OnceLock<ReportConfig> = OnceLock::new();

/// Where the active configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

/// `path` parsed, or defaults when it does not exist.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<(ReportConfig, ConfigSource)> {
    let path = path.as_ref();
    if path.exists() {
        Ok((ReportConfig::from_file(path)?, ConfigSource::File))
    } else {
        Ok((ReportConfig::default(), ConfigSource::Defaults))
    }
}

/// Load `path` into [`CONFIG`]. Runs before logging is up, so the caller
/// reports the returned source.
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<(&'static ReportConfig, ConfigSource)> {
    let (config, source) = load_config(path)?;
    Ok((CONFIG.get_or_init(|| config), source))
}
