use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assessment::CREDITWORTHY_THRESHOLD;
use crate::config::{ExtractorConfig, ExtractorConfigBuilder, ListOverride, MarkerMatch};
use crate::layout::LayoutConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_MB: u32 = 25;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub analysis: Option<AnalysisConfig>,
    pub layout: Option<LayoutFileConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_upload_mb: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub threshold: Option<f64>,
    /// Replaces the default substring keywords (`["credit"]`).
    pub credit_keywords: Option<Vec<String>>,
    /// Replaces the default short markers (`["cr"]`).
    pub short_markers: Option<Vec<String>>,
    /// Replaces the default exclusions (`["balance"]`).
    pub exclude_keywords: Option<Vec<String>>,
    /// `"token"` or `"substring"`.
    pub marker_match: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutFileConfig {
    pub row_tolerance: Option<f32>,
    pub min_columns: Option<usize>,
    pub min_rows: Option<usize>,
    pub column_gap: Option<f32>,
    /// Horizontal gap, as a fraction of font size, that splits a line into spans.
    pub gap_ratio: Option<f32>,
}

impl ConfigFile {
    pub fn host(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn max_upload_bytes(&self) -> usize {
        let mb = self
            .server
            .as_ref()
            .and_then(|s| s.max_upload_mb)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);
        mb as usize * 1024 * 1024
    }

    pub fn threshold(&self) -> f64 {
        self.analysis
            .as_ref()
            .and_then(|a| a.threshold)
            .unwrap_or(CREDITWORTHY_THRESHOLD)
    }

    /// Build the extractor configuration. Unknown `marker_match` values fall
    /// back to the default with a warning.
    pub fn extractor_config(&self) -> ExtractorConfig {
        let Some(analysis) = self.analysis.as_ref() else {
            return ExtractorConfig::default();
        };

        let replace = |list: &Option<Vec<String>>| match list {
            Some(values) => ListOverride::Replace(values.clone()),
            None => ListOverride::Default,
        };

        let marker_match = match analysis.marker_match.as_deref() {
            None => MarkerMatch::default(),
            Some(name) => MarkerMatch::from_name(name).unwrap_or_else(|| {
                tracing::warn!(value = name, "unknown marker_match, using token matching");
                MarkerMatch::default()
            }),
        };

        ExtractorConfigBuilder::new()
            .credit_keywords(replace(&analysis.credit_keywords))
            .short_markers(replace(&analysis.short_markers))
            .exclude_keywords(replace(&analysis.exclude_keywords))
            .marker_match(marker_match)
            .build()
    }

    pub fn layout_config(&self) -> LayoutConfig {
        let defaults = LayoutConfig::default();
        let Some(layout) = self.layout.as_ref() else {
            return defaults;
        };
        LayoutConfig {
            row_tolerance: layout.row_tolerance.unwrap_or(defaults.row_tolerance),
            min_columns: layout.min_columns.unwrap_or(defaults.min_columns),
            min_rows: layout.min_rows.unwrap_or(defaults.min_rows),
            column_gap: layout.column_gap.unwrap_or(defaults.column_gap),
        }
    }

    /// Every known field filled in, configured values first, then defaults.
    /// `gap_ratio` stays as configured; its default belongs to the backend.
    pub fn resolved(&self) -> ConfigFile {
        let extractor = self.extractor_config();
        let layout = self.layout_config();
        ConfigFile {
            server: Some(ServerConfig {
                host: Some(self.host()),
                port: Some(self.port()),
                max_upload_mb: Some((self.max_upload_bytes() / (1024 * 1024)) as u32),
            }),
            analysis: Some(AnalysisConfig {
                threshold: Some(self.threshold()),
                credit_keywords: Some(extractor.credit_keywords().to_vec()),
                short_markers: Some(extractor.short_markers().to_vec()),
                exclude_keywords: Some(extractor.exclude_keywords().to_vec()),
                marker_match: Some(extractor.marker_match().as_str().to_string()),
            }),
            layout: Some(LayoutFileConfig {
                row_tolerance: Some(layout.row_tolerance),
                min_columns: Some(layout.min_columns),
                min_rows: Some(layout.min_rows),
                column_gap: Some(layout.column_gap),
                gap_ratio: self.gap_ratio(),
            }),
        }
    }

    /// Span-splitting gap ratio for PDF backends, if configured.
    pub fn gap_ratio(&self) -> Option<f32> {
        self.layout.as_ref().and_then(|l| l.gap_ratio)
    }
}

/// Platform config directory path: `<config_dir>/flexrent/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flexrent").join("config.toml"))
}

/// Load config by cascading CWD `.flexrent.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".flexrent.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<T, S>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        server: Some(ServerConfig {
            host: pick(&overlay.server, &base.server, |s| s.host.clone()),
            port: pick(&overlay.server, &base.server, |s| s.port),
            max_upload_mb: pick(&overlay.server, &base.server, |s| s.max_upload_mb),
        }),
        analysis: Some(AnalysisConfig {
            threshold: pick(&overlay.analysis, &base.analysis, |a| a.threshold),
            credit_keywords: pick(&overlay.analysis, &base.analysis, |a| {
                a.credit_keywords.clone()
            }),
            short_markers: pick(&overlay.analysis, &base.analysis, |a| {
                a.short_markers.clone()
            }),
            exclude_keywords: pick(&overlay.analysis, &base.analysis, |a| {
                a.exclude_keywords.clone()
            }),
            marker_match: pick(&overlay.analysis, &base.analysis, |a| {
                a.marker_match.clone()
            }),
        }),
        layout: Some(LayoutFileConfig {
            row_tolerance: pick(&overlay.layout, &base.layout, |l| l.row_tolerance),
            min_columns: pick(&overlay.layout, &base.layout, |l| l.min_columns),
            min_rows: pick(&overlay.layout, &base.layout, |l| l.min_rows),
            column_gap: pick(&overlay.layout, &base.layout, |l| l.column_gap),
            gap_ratio: pick(&overlay.layout, &base.layout, |l| l.gap_ratio),
        }),
    }
}

/// Errors from writing a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(write_err)
}
