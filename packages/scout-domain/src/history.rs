use std::{cmp::Reverse, collections::BTreeMap};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(rename = "type")]
	pub kind: String,
}

/// Append-only log of selected searches, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
	#[serde(default)]
	pub entries: Vec<SearchHistoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
	/// The most recent occurrence of this id.
	pub entry: SearchHistoryEntry,
	pub occurrences: usize,
	pub last_index: usize,
	pub weight: usize,
}

impl SearchHistory {
	/// Appends `entry` and evicts from the front until at most `cap` entries remain. Returns the
	/// number of evicted entries.
	pub fn record(&mut self, entry: SearchHistoryEntry, cap: usize) -> usize {
		self.entries.push(entry);

		let excess = self.entries.len().saturating_sub(cap);

		self.entries.drain(..excess);

		excess
	}

	/// One row per distinct id, weighted by `occurrences + last_index`.
	///
	/// Ordered by ascending weight, so the most relevant entry is last. Equal weights fall back to
	/// ascending id.
	pub fn rank(&self) -> Vec<RankedEntry> {
		let mut grouped: BTreeMap<&str, RankedEntry> = BTreeMap::new();

		for (index, entry) in self.entries.iter().enumerate() {
			grouped
				.entry(entry.id.as_str())
				.and_modify(|ranked| {
					ranked.entry = entry.clone();
					ranked.occurrences += 1;
					ranked.last_index = index;
				})
				.or_insert_with(|| RankedEntry {
					entry: entry.clone(),
					occurrences: 1,
					last_index: index,
					weight: 0,
				});
		}

		let mut ranked: Vec<RankedEntry> = grouped
			.into_values()
			.map(|mut ranked| {
				ranked.weight = ranked.occurrences + ranked.last_index;

				ranked
			})
			.collect();

		// Stable sort keeps the id order from the map for equal weights.
		ranked.sort_by_key(|ranked| ranked.weight);

		ranked
	}

	/// Most relevant first, at most `limit` rows. Equal weights still order by ascending id.
	pub fn most_relevant(&self, limit: usize) -> Vec<RankedEntry> {
		let mut ranked = self.rank();

		ranked.sort_by_key(|ranked| Reverse(ranked.weight));
		ranked.truncate(limit);

		ranked
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
