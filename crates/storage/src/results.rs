//! Append-only store for extraction result records.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use extract_common::{ExtractResult, ExtractionResult};

/// Writes one JSON document per completed extraction job.
///
/// Filenames carry the metric id and a millisecond timestamp so records
/// never collide under concurrent jobs; `create_new` turns any residual
/// collision into an error instead of an overwrite.
#[derive(Debug, Clone)]
pub struct ResultStore {
    results_dir: PathBuf,
}

impl ResultStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Persist one record, returning the path it was written to.
    ///
    /// Null-average records are persisted too: an all-no-data frame
    /// should leave a trace, not disappear.
    pub async fn append(&self, result: &ExtractionResult) -> ExtractResult<PathBuf> {
        fs::create_dir_all(&self.results_dir).await?;

        let filename = format!(
            "{}_{}.json",
            result.metric,
            result.timestamp.format("%Y%m%d%H%M%S%3f")
        );
        let path = self.results_dir.join(filename);

        let body = serde_json::to_vec_pretty(result)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(&body).await?;
        file.flush().await?;

        debug!(metric = %result.metric, path = %path.display(), "Persisted extraction result");
        Ok(path)
    }
}
