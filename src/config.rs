use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::{
    default_player_comparison, default_player_groups, default_team_groups, FieldGroup,
};
use crate::data::filter::DimensionColumns;
use crate::data::loader::DEFAULT_SQLITE_TABLE;
use crate::error::DashboardError;

/// Environment variable pointing at a configuration file.
pub const CONFIG_ENV: &str = "RUSTY_SCOUT_CONFIG";
/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "rusty-scout.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Everything the dashboard reads at start-up. Every field has a default, so
/// a partial JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Source loaded at start-up (also reachable through File → Open…).
    pub data_path: Option<PathBuf>,
    /// Table read from SQLite sources.
    pub sqlite_table: String,
    /// Logo drawn in the side panel and on the first report page.
    pub logo_path: Option<PathBuf>,
    /// Where chart artifacts are written before export.
    pub scratch_dir: PathBuf,
    /// Where reports are written.
    pub output_dir: PathBuf,
    pub report_title: String,
    pub columns: DimensionColumns,
    /// Column holding a player's photo, a local path or an http(s) URL.
    pub photo_column: String,
    /// Where downloaded photos are kept.
    pub photo_dir: PathBuf,
    /// TrueType font for chart text; well-known system fonts are tried
    /// when unset.
    pub chart_font: Option<PathBuf>,
    pub player_groups: Vec<FieldGroup>,
    pub team_groups: Vec<FieldGroup>,
    /// Per-player chart shown on the team page.
    pub player_comparison: FieldGroup,
    /// user → password.
    pub credentials: BTreeMap<String, String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let scratch = std::env::temp_dir().join("rusty-scout");
        Self {
            data_path: Some(PathBuf::from("data/estadisticas_jugadores_2023.csv")),
            sqlite_table: DEFAULT_SQLITE_TABLE.to_string(),
            logo_path: Some(PathBuf::from("assets/logo_betplay.png")),
            output_dir: scratch.clone(),
            scratch_dir: scratch,
            report_title: "Análisis Copa BetPlay 2024".to_string(),
            columns: DimensionColumns::default(),
            photo_column: "foto".to_string(),
            photo_dir: std::env::temp_dir().join("rusty-scout-fotos"),
            chart_font: None,
            player_groups: default_player_groups(),
            team_groups: default_team_groups(),
            player_comparison: default_player_comparison(),
            credentials: BTreeMap::from([("admin".to_string(), "admin".to_string())]),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
            .map_err(|e| DashboardError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_json(text: &str) -> Result<Self, DashboardError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| DashboardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `$RUSTY_SCOUT_CONFIG`, else `rusty-scout.json` in the working
    /// directory, else the defaults.
    pub fn discover() -> Result<Self, DashboardError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            log::info!("Using configuration from ${CONFIG_ENV}");
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            log::info!("Using configuration from {CONFIG_FILE}");
            return Self::from_file(local);
        }
        log::info!("No configuration file, using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), DashboardError> {
        let groups = self
            .player_groups
            .iter()
            .chain(&self.team_groups)
            .chain(std::iter::once(&self.player_comparison));
        for group in groups {
            if group.key.trim().is_empty() {
                return Err(DashboardError::Config(format!(
                    "field group '{}' has an empty key",
                    group.title
                )));
            }
            if group.fields.is_empty() {
                return Err(DashboardError::Config(format!(
                    "field group '{}' lists no fields",
                    group.key
                )));
            }
        }
        Ok(())
    }
}
