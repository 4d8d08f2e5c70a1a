//! All-or-nothing loading of source tables.

use crate::data::observation::ObservationTable;
use crate::data::schema::{RawTable, TableSchema};
use crate::foundation::core::MetricName;
use crate::foundation::error::{ChartError, ChartResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// One required source: where its rows live and how to type them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Metric this source provides.
    pub metric: MetricName,
    /// Location, relative to the loader root.
    pub path: PathBuf,
    /// Column mapping and filters.
    #[serde(default)]
    pub schema: TableSchema,
}

impl SourceSpec {
    /// Source with the default schema.
    pub fn new(metric: impl Into<MetricName>, path: impl Into<PathBuf>) -> Self {
        Self {
            metric: metric.into(),
            path: path.into(),
            schema: TableSchema::default(),
        }
    }

    /// Same source typed with `schema`.
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = schema;
        self
    }
}

/// Fetches the raw rows of one source.
pub trait SourceLoader: Sync {
    /// Raw rows of `spec`. Errors are wrapped by [`load_all`].
    fn load(&self, spec: &SourceSpec) -> ChartResult<RawTable>;
}

/// Reads JSON record arrays from disk, resolving relative paths against `root`.
#[derive(Clone, Debug)]
pub struct JsonFileLoader {
    root: PathBuf,
}

impl JsonFileLoader {
    /// Loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute paths pass through; relative ones are joined to the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl SourceLoader for JsonFileLoader {
    fn load(&self, spec: &SourceSpec) -> ChartResult<RawTable> {
        let path = self.resolve(&spec.path);
        let f = File::open(&path).map_err(|e| {
            ChartError::load_failure(format!("open table '{}': {e}", path.display()))
        })?;
        RawTable::from_reader(BufReader::new(f))
    }
}

/// Serves tables held in memory, keyed by source path.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    tables: HashMap<PathBuf, RawTable>,
}

impl MemoryLoader {
    /// Loader with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `table` for sources at `path`.
    pub fn with_table(mut self, path: impl Into<PathBuf>, table: RawTable) -> Self {
        self.tables.insert(path.into(), table);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, spec: &SourceSpec) -> ChartResult<RawTable> {
        self.tables.get(&spec.path).cloned().ok_or_else(|| {
            ChartError::load_failure(format!("no table at '{}'", spec.path.display()))
        })
    }
}

/// Load and type every source, or fail as a whole.
///
/// Sources are fetched concurrently; the first failure (in declaration order) is reported as a
/// [`ChartError::LoadFailure`] naming the source, and no table is returned.
#[tracing::instrument(skip(loader, specs), fields(sources = specs.len()))]
pub fn load_all(
    loader: &dyn SourceLoader,
    specs: &[SourceSpec],
) -> ChartResult<Vec<ObservationTable>> {
    if specs.is_empty() {
        return Err(ChartError::malformed("at least one source must be declared"));
    }

    let results: Vec<ChartResult<ObservationTable>> = specs
        .par_iter()
        .map(|spec| {
            let raw = loader.load(spec)?;
            spec.schema.apply(&raw, spec.metric.clone())
        })
        .collect();

    results
        .into_iter()
        .zip(specs)
        .map(|(r, spec)| {
            r.map_err(|e| {
                tracing::warn!(metric = %spec.metric, error = %e, "source failed to load");
                match e {
                    ChartError::LoadFailure(msg) => ChartError::LoadFailure(msg),
                    other => ChartError::load_failure(format!(
                        "source '{}' ({}): {other}",
                        spec.metric,
                        spec.path.display()
                    )),
                }
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/loader/mod.rs"]
mod tests;
