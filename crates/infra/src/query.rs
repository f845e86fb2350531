//! Paginated history queries.

use serde::{Deserialize, Serialize};

use eventshare_calendar::EventVersion;

use crate::config::ServiceConfig;

/// Pagination parameters for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of versions to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::resolve(None, None, &ServiceConfig::default())
    }
}

impl Pagination {
    /// Fill in the configured default and clamp to the configured maximum.
    pub fn resolve(limit: Option<u32>, offset: Option<u32>, config: &ServiceConfig) -> Self {
        Self {
            limit: limit
                .unwrap_or(config.history_page_size)
                .min(config.max_history_page_size)
                .max(1),
            offset: offset.unwrap_or(0),
        }
    }

    /// Slice one page out of a fully materialized list.
    pub fn page<T: Clone>(&self, items: &[T]) -> (Vec<T>, bool) {
        let start = (self.offset as usize).min(items.len());
        let end = start.saturating_add(self.limit as usize).min(items.len());
        (items[start..end].to_vec(), end < items.len())
    }
}

/// One page of an event's history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPage {
    pub versions: Vec<EventVersion>,
    /// Total number of versions the event has (across all pages).
    pub total: u64,
    pub pagination: Pagination,
    /// Whether more versions exist past this page.
    pub has_more: bool,
}
