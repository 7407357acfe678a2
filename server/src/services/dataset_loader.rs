use std::path::Path;

use catchment_shared::{DatasetError, DatasetPreset, FeatureCollection, PreparedMap};
use serde::Serialize;
use tracing::info;

/// Counts reported by `/api/health` for one validated preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub key: String,
    pub title: String,
    pub contours: usize,
    pub points: usize,
    pub groups: usize,
}

#[derive(Debug)]
pub enum LoadError {
    Read {
        preset: String,
        file: String,
        source: std::io::Error,
    },
    Invalid {
        preset: String,
        file: String,
        source: DatasetError,
    },
    Mismatch {
        preset: String,
        source: DatasetError,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Read {
                preset,
                file,
                source,
            } => write!(f, "dataset {preset}: failed to read {file}: {source}"),
            LoadError::Invalid {
                preset,
                file,
                source,
            } => write!(f, "dataset {preset}: {file}: {source}"),
            LoadError::Mismatch { preset, source } => write!(f, "dataset {preset}: {source}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Read { source, .. } => Some(source),
            LoadError::Invalid { source, .. } | LoadError::Mismatch { source, .. } => Some(source),
        }
    }
}

/// Read and validate every preset. Any failure aborts: a half-correlated
/// dataset is worse than no map.
pub async fn load_all(
    data_dir: &Path,
    presets: &[DatasetPreset],
) -> Result<Vec<DatasetSummary>, LoadError> {
    let mut summaries = Vec::with_capacity(presets.len());
    for preset in presets {
        let contours = read_collection(data_dir, preset, &preset.contours).await?;
        let points = read_collection(data_dir, preset, &preset.points).await?;
        let summary = validate(preset, contours, points)?;
        info!(
            dataset = %summary.key,
            contours = summary.contours,
            points = summary.points,
            groups = summary.groups,
            "dataset validated"
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

async fn read_collection(
    data_dir: &Path,
    preset: &DatasetPreset,
    file: &str,
) -> Result<FeatureCollection, LoadError> {
    let path = data_dir.join(file);
    let payload = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LoadError::Read {
            preset: preset.key.clone(),
            file: path.display().to_string(),
            source,
        })?;
    FeatureCollection::from_json_str(&payload).map_err(|source| LoadError::Invalid {
        preset: preset.key.clone(),
        file: file.to_string(),
        source,
    })
}

/// Run the same preparation the client runs, keeping only the counts.
pub fn validate(
    preset: &DatasetPreset,
    contours: FeatureCollection,
    points: FeatureCollection,
) -> Result<DatasetSummary, LoadError> {
    let prepared = PreparedMap::prepare(contours, points, &preset.policy).map_err(|source| {
        LoadError::Mismatch {
            preset: preset.key.clone(),
            source,
        }
    })?;
    Ok(DatasetSummary {
        key: preset.key.clone(),
        title: preset.title.clone(),
        contours: prepared.contours.len(),
        points: prepared.points.len(),
        groups: prepared.colors.len(),
    })
}
