//! Serialized record of one selection run.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diversity::SelectionDiversity;
use crate::error::ExportError;
use crate::selection::{AuditRecord, SelectionConfig, SelectionOutcome, SelectionWarning};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}

impl ReportFormat {
    /// Picks a format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => ReportFormat::Yaml,
            _ => ReportFormat::Json,
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "yaml" | "yml" => Ok(ReportFormat::Yaml),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Everything worth keeping about a selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub config: SelectionConfig,
    pub pool_size: usize,
    pub filtered_size: usize,
    pub fallback_triggered: bool,
    pub audit: Vec<AuditRecord>,
    pub diversity: SelectionDiversity,
    #[serde(default)]
    pub warnings: Vec<SelectionWarning>,
}

impl SelectionReport {
    /// Builds a report for an outcome produced with `config`.
    pub fn from_outcome(outcome: &SelectionOutcome<'_>, config: &SelectionConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            config: config.clone(),
            pool_size: outcome.pool_size,
            filtered_size: outcome.filtered_size,
            fallback_triggered: outcome.fallback_triggered,
            audit: outcome.audit.clone(),
            diversity: SelectionDiversity::calculate(outcome.candidates()),
            warnings: outcome.warnings.clone(),
        }
    }

    /// Identifiers in selection order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.audit.iter().map(|r| r.id.as_str()).collect()
    }

    /// Renders the report as text.
    pub fn render(&self, format: ReportFormat) -> Result<String, ExportError> {
        match format {
            ReportFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ExportError::Serialization(e.to_string())),
            ReportFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| ExportError::Serialization(e.to_string()))
            }
        }
    }

    /// Writes the report to a file, creating parent directories.
    pub fn write_to(&self, path: &Path, format: ReportFormat) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render(format)?)?;

        tracing::info!(
            path = %path.display(),
            format = %format,
            run_id = %self.run_id,
            "Wrote selection report"
        );
        Ok(())
    }

    /// Reads a report previously written with [`SelectionReport::write_to`].
    pub fn read_from(path: &Path) -> Result<Self, ExportError> {
        let content = std::fs::read_to_string(path)?;
        let invalid = |reason: String| ExportError::InvalidInput {
            path: path.display().to_string(),
            reason,
        };
        match ReportFormat::from_path(path) {
            ReportFormat::Json => serde_json::from_str(&content).map_err(|e| invalid(e.to_string())),
            ReportFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string())),
        }
    }
}
