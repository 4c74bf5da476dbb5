//! Request and response shapes exchanged with the record-storage service.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	cart::CartEntry,
	feedback::FeedbackDraft,
	history::SearchHistoryEntry,
	query::{
		Facets, LIMIT_PARAM, OFFSET_PARAM, QueryState, SEARCH_TEXT_PARAM, SORT_PARAM, SortKey,
		encode_facet_values, facet_param,
	},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMatch {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub score: f64,
}
impl TermMatch {
	pub fn to_history_entry(&self) -> SearchHistoryEntry {
		SearchHistoryEntry {
			id: self.id.clone(),
			name: self.name.clone(),
			description: self.description.clone(),
			kind: self.kind.clone(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub platform: Option<String>,
	#[serde(default)]
	pub sample_count: u64,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub published_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
	pub facet: String,
	pub value: String,
	pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPage {
	pub items: Vec<Study>,
	pub total: u64,
	#[serde(default)]
	pub facets: Vec<FacetCount>,
}
impl StudyPage {
	pub fn facet_counts<'a>(&'a self, facet: &'a str) -> impl Iterator<Item = &'a FacetCount> + 'a {
		self.facets.iter().filter(move |count| count.facet == facet)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
	pub id: String,
	pub study_id: String,
	#[serde(default)]
	pub title: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePage {
	pub items: Vec<Sample>,
	pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartReceipt {
	pub id: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCartRequest {
	pub name: String,
	pub studies: Vec<CartEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyQuery {
	pub query: String,
	pub sort: SortKey,
	pub offset: u64,
	pub limit: u64,
	pub facets: Facets,
}
impl StudyQuery {
	/// Query-string pairs in the same encoding the location uses.
	pub fn to_pairs(&self) -> Vec<(String, String)> {
		let mut pairs = vec![
			(SEARCH_TEXT_PARAM.to_string(), self.query.clone()),
			(SORT_PARAM.to_string(), self.sort.as_str().to_string()),
			(OFFSET_PARAM.to_string(), self.offset.to_string()),
			(LIMIT_PARAM.to_string(), self.limit.to_string()),
		];

		for (name, values) in &self.facets {
			if !values.is_empty() {
				pairs.push((facet_param(name), encode_facet_values(values)));
			}
		}

		pairs
	}
}

impl From<&QueryState> for StudyQuery {
	fn from(state: &QueryState) -> Self {
		Self {
			query: state.search_text.clone(),
			sort: state.sort,
			offset: state.offset,
			limit: state.limit,
			facets: state.facets.clone(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
	pub study_id: String,
	pub qualities: BTreeSet<String>,
	pub keywords: BTreeMap<String, bool>,
	pub elaborate: String,
}
impl FeedbackSubmission {
	pub fn from_draft(study_id: &str, draft: &FeedbackDraft) -> Self {
		Self {
			study_id: study_id.to_string(),
			qualities: draft.qualities.clone(),
			keywords: draft.keywords.clone(),
			elaborate: draft.elaborate.trim().to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn study_query_pairs_follow_location_encoding() {
		let mut state = QueryState::new(20);

		state.search_text = "liver".to_string();
		state.toggle_facet("platform", "ILLUMINA");

		let pairs = StudyQuery::from(&state).to_pairs();

		assert!(pairs.contains(&("q".to_string(), "liver".to_string())));
		assert!(pairs.contains(&("limit".to_string(), "20".to_string())));
		assert!(pairs.contains(&("facet.platform".to_string(), "ILLUMINA".to_string())));
	}

	#[test]
	fn study_tolerates_missing_optional_fields() {
		let study: Study = serde_json::from_value(serde_json::json!({
			"id": "SRP1",
			"title": "Liver atlas"
		}))
		.expect("Study must decode.");

		assert_eq!(study.sample_count, 0);
		assert!(study.published_at.is_none());
	}
}
