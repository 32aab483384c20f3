//! Record source trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SourceError;
use search_sync_shared::Record;

/// Read access to the system of record.
///
/// Every call is independent: fetching the same window twice yields the
/// same records, so a full import can be restarted from any page.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Total number of records of `source_type`.
    async fn count(&self, source_type: &str) -> Result<u64, SourceError>;

    /// Up to `limit` records of `source_type`, skipping the first `offset`.
    ///
    /// An empty vector means the window lies past the end of the data.
    async fn fetch(
        &self,
        source_type: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Record>>, SourceError>;
}
