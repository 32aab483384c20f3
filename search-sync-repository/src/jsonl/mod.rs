//! JSON-lines record source.
//!
//! Reads records of type `T` from `<root>/T.jsonl`, one JSON object per
//! line. Files are streamed line by line so a page never requires the rest
//! of the file in memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use crate::errors::SourceError;
use crate::interfaces::RecordSource;
use search_sync_shared::Record;

/// A [`RecordSource`] backed by a directory of `.jsonl` files.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    root: PathBuf,
}

impl JsonLinesSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, source_type: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl", source_type))
    }

    async fn open(&self, source_type: &str) -> Result<Lines<BufReader<File>>, SourceError> {
        let path = self.path_for(source_type);
        match File::open(&path).await {
            Ok(file) => Ok(BufReader::new(file).lines()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::UnknownSourceType(source_type.to_string()))
            }
            Err(e) => Err(SourceError::io(format!("{}: {}", path.display(), e))),
        }
    }
}

#[async_trait]
impl RecordSource for JsonLinesSource {
    async fn count(&self, source_type: &str) -> Result<u64, SourceError> {
        let mut lines = self.open(source_type).await?;
        let mut count = 0;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| SourceError::io(e.to_string()))?
        {
            if !line.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn fetch(
        &self,
        source_type: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Record>>, SourceError> {
        let mut lines = self.open(source_type).await?;
        let mut records: Vec<Arc<dyn Record>> = Vec::new();
        let mut position = 0u64;
        let mut line_number = 0u64;

        while records.len() < limit {
            let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| SourceError::io(e.to_string()))?
            else {
                break;
            };
            line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            if position < offset {
                position += 1;
                continue;
            }
            position += 1;

            let value: Value = serde_json::from_str(&line).map_err(|e| {
                SourceError::parse(format!("{}.jsonl line {}: {}", source_type, line_number, e))
            })?;
            records.push(Arc::new(value));
        }

        debug!(source_type, offset, count = records.len(), "Fetched records");
        Ok(records)
    }
}
