use std::sync::Arc;

use scout_domain::{RankedEntry, SearchHistory, SearchHistoryEntry, TermMatch};
use scout_storage::PersistedStore;

use crate::Result;

/// Persisted search history ranked by frequency and recency.
pub struct RankedHistory {
	store: Arc<PersistedStore>,
	max_entries: usize,
}
impl RankedHistory {
	pub fn new(store: Arc<PersistedStore>, max_entries: usize) -> Self {
		Self { store, max_entries: max_entries.max(1) }
	}

	/// Appends `entry`. Returns how many of the oldest entries were evicted to stay within the cap.
	pub fn record(&self, entry: SearchHistoryEntry) -> Result<usize> {
		let max_entries = self.max_entries;
		let (_, evicted) = self
			.store
			.update_with(|history: &mut SearchHistory| history.record(entry, max_entries))?;

		if evicted > 0 {
			tracing::debug!(evicted, max_entries, "Search history trimmed.");
		}

		Ok(evicted)
	}

	pub fn record_term(&self, term: &TermMatch) -> Result<usize> {
		self.record(term.to_history_entry())
	}

	/// Ascending by weight.
	pub fn rank(&self) -> Vec<RankedEntry> {
		self.store.read::<SearchHistory>().rank()
	}

	pub fn most_relevant(&self, limit: usize) -> Vec<RankedEntry> {
		self.store.read::<SearchHistory>().most_relevant(limit)
	}

	/// The raw log, oldest first.
	pub fn entries(&self) -> Vec<SearchHistoryEntry> {
		self.store.read::<SearchHistory>().entries
	}

	pub fn clear(&self) -> Result<()> {
		Ok(self.store.clear::<SearchHistory>()?)
	}
}
