//! Mock arrivals source for running the board without network access.
//!
//! Serves `{stopId}.json` files from a directory as if they were live API
//! responses. Files are re-read on every request so they can be edited while
//! the board is running.

use std::path::{Path, PathBuf};

use super::error::FetchError;
use super::types::{ArrivalPrediction, parse_arrivals};

/// Mock TfL client that serves data from JSON files.
#[derive(Debug, Clone)]
pub struct MockArrivals {
    data_dir: PathBuf,
}

impl MockArrivals {
    /// Create a mock source over `data_dir`.
    ///
    /// Fails if the directory cannot be read or contains no `.json` files.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let data_dir = data_dir.as_ref();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            FetchError::Unavailable(format!("cannot read mock directory {data_dir:?}: {e}"))
        })?;

        let has_json = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .any(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json"));

        if !has_json {
            return Err(FetchError::Unavailable(format!(
                "no mock arrival files found in {data_dir:?}"
            )));
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Load the predictions stored for `stop_id`.
    ///
    /// Mimics `TflClient::get_arrivals`. The line is ignored since each file
    /// already holds one line's arrivals.
    pub async fn get_arrivals(
        &self,
        stop_id: &str,
        _line_id: &str,
    ) -> Result<Vec<ArrivalPrediction>, FetchError> {
        let path = self.data_dir.join(format!("{stop_id}.json"));

        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::Unavailable(format!("{stop_id} ({e})")))?;

        parse_arrivals(&body)
    }
}
