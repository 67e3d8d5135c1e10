use futures_util::future::try_join_all;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FormatRegistry, PersonRecord};
use crate::error::{RelnavError, Result};

/// Records from one lineage partition file
#[derive(Debug, Clone)]
pub struct Partition {
    /// Partition name, taken from the file stem (usually the lineage)
    pub name: String,
    pub path: PathBuf,
    pub records: Vec<PersonRecord>,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Discover all partition files under `root`, sorted by path.
pub fn discover_partitions(root: &Path, registry: &FormatRegistry) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RelnavError::Config(format!(
            "data directory does not exist: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !registry.supports(&extension_of(path)) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    log::info!("Discovered {} partitions in {}", files.len(), root.display());
    Ok(files)
}

/// Read and decode a single partition file.
pub async fn load_partition(path: &Path, registry: &FormatRegistry) -> Result<Partition> {
    let content = tokio::fs::read_to_string(path).await?;
    let display = path.display().to_string();
    let records = registry
        .parse(&content, &display, &extension_of(path))
        .map_err(|e| {
            log::warn!("Failed to decode partition {}: {}", display, e);
            e
        })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string();

    log::debug!("Loaded partition {} ({} records)", name, records.len());
    Ok(Partition {
        name,
        path: path.to_path_buf(),
        records,
    })
}

/// Load every partition under `root` concurrently. Fails if any file cannot be
/// read or decoded, so a graph is never built from a partial data set.
pub async fn load_partitions(root: &Path) -> Result<Vec<Partition>> {
    let registry = FormatRegistry::new();
    let files = discover_partitions(root, &registry)?;

    let partitions = try_join_all(files.iter().map(|f| load_partition(f, &registry))).await?;

    let total: usize = partitions.iter().map(|p| p.records.len()).sum();
    log::info!("Loaded {} records from {} partitions", total, partitions.len());
    Ok(partitions)
}

/// Concatenate partitions into one record list, preserving partition order.
pub fn flatten(partitions: Vec<Partition>) -> Vec<PersonRecord> {
    partitions.into_iter().flat_map(|p| p.records).collect()
}
