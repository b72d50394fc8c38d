//! Reading candidate pools and persisting the reference history.
//!
//! Candidate files are JSON or YAML, chosen by extension. Either a bare list
//! of candidates or an object with a `candidates` list is accepted.

use std::path::Path;

use serde::Deserialize;

use crate::candidate::Candidate;
use crate::diversity::ReferenceBuffer;
use crate::error::ExportError;

use super::report::ReportFormat;

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateFile {
    List(Vec<Candidate>),
    Wrapped { candidates: Vec<Candidate> },
}

fn parse<T: for<'de> Deserialize<'de>>(path: &Path, content: &str) -> Result<T, ExportError> {
    let result = match ReportFormat::from_path(path) {
        ReportFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ReportFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };
    result.map_err(|reason| ExportError::InvalidInput {
        path: path.display().to_string(),
        reason,
    })
}

/// Loads a candidate pool from a JSON or YAML file.
pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>, ExportError> {
    let content = std::fs::read_to_string(path)?;
    let candidates = match parse::<CandidateFile>(path, &content)? {
        CandidateFile::List(candidates) => candidates,
        CandidateFile::Wrapped { candidates } => candidates,
    };

    tracing::debug!(
        path = %path.display(),
        count = candidates.len(),
        "Loaded candidates"
    );
    Ok(candidates)
}

/// Loads a reference buffer, or starts a new one with `capacity` if the
/// file does not exist yet.
///
/// A history with mixed embedding dimensions or a zero capacity is
/// [`ExportError::InvalidInput`].
pub fn load_reference_buffer(path: &Path, capacity: usize) -> Result<ReferenceBuffer, ExportError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No reference history yet, starting empty");
        return Ok(ReferenceBuffer::new(capacity));
    }

    let content = std::fs::read_to_string(path)?;
    let buffer: ReferenceBuffer = parse(path, &content)?;
    tracing::debug!(path = %path.display(), entries = buffer.len(), "Loaded reference history");
    Ok(buffer)
}

/// Writes a reference buffer as JSON or YAML depending on the extension.
pub fn save_reference_buffer(buffer: &ReferenceBuffer, path: &Path) -> Result<(), ExportError> {
    let content = match ReportFormat::from_path(path) {
        ReportFormat::Json => serde_json::to_string_pretty(buffer)
            .map_err(|e| ExportError::Serialization(e.to_string()))?,
        ReportFormat::Yaml => {
            serde_yaml::to_string(buffer).map_err(|e| ExportError::Serialization(e.to_string()))?
        }
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JSON_POOL: &str = r#"[
        {"id": "a", "metrics": {"rho": 0.9, "gamma": 0.5, "beta": 0.4, "d": 0.2,
          "sigma": 0.3, "M": 0.1, "lambda": 0.6, "phi": 0.0}, "embedding": [1.0, 0.0]},
        {"id": "b", "metrics": {"rho": 0.1, "gamma": 0.5, "beta": 0.4, "d": 0.2,
          "sigma": 0.3, "M": 0.1, "lambda": 0.6, "phi": 0.0}, "embedding": [0.0, 1.0],
          "is_exception": true, "payload": {"prompt": "x"}}
    ]"#;

    const YAML_POOL: &str = r#"
candidates:
  - id: a
    embedding: [1.0, 0.0]
    metrics:
      meaning_density: 0.9
      resonance: 0.5
      aesthetic_alignment: 0.4
      distance: 0.2
      recombinability: 0.3
      binding: 0.1
      description_length: 0.6
      phase_difference: -0.1
"#;

    #[test]
    fn test_load_json_list() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("pool.json");
        std::fs::write(&path, JSON_POOL).expect("write");

        let candidates = load_candidates(&path).expect("load");
        assert_eq!(candidates.len(), 2);
        assert!(candidates[1].is_exception);
        assert_eq!(candidates[1].payload["prompt"], "x");
    }

    #[test]
    fn test_load_yaml_wrapped() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("pool.yml");
        std::fs::write(&path, YAML_POOL).expect("write");

        let candidates = load_candidates(&path).expect("load");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].metrics.phase_difference, -0.1);
    }

    #[test]
    fn test_invalid_input_names_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{\"id\": 3}]").expect("write");

        let err = load_candidates(&path).unwrap_err();
        assert!(matches!(err, ExportError::InvalidInput { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_mixed_dimension_history_is_invalid_input() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("reference.json");
        std::fs::write(
            &path,
            r#"{"capacity": 4, "entries": [[1.0, 0.0], [1.0, 0.0, 0.0]]}"#,
        )
        .expect("write");

        let err = load_reference_buffer(&path, 4).unwrap_err();
        assert!(matches!(err, ExportError::InvalidInput { .. }));
        assert!(err.to_string().contains("reference.json"));
    }

    #[test]
    fn test_reference_buffer_persistence() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("history/reference.json");

        let mut buffer = load_reference_buffer(&path, 4).expect("fresh buffer");
        assert!(buffer.is_empty());

        let embeddings = [vec![1.0, 0.0], vec![0.0, 1.0]];
        buffer.record(embeddings.iter().map(|e| e.as_slice()));
        save_reference_buffer(&buffer, &path).expect("save");

        let loaded = load_reference_buffer(&path, 4).expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.stats(0.85), buffer.stats(0.85));
    }
}
