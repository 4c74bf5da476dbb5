use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDraft {
	#[serde(default)]
	pub qualities: BTreeSet<String>,
	/// Keyword to verdict, `true` meaning the keyword is relevant to the study.
	#[serde(default)]
	pub keywords: BTreeMap<String, bool>,
	#[serde(default)]
	pub elaborate: String,
}
impl FeedbackDraft {
	pub fn is_blank(&self) -> bool {
		self.qualities.is_empty() && self.keywords.is_empty() && self.elaborate.trim().is_empty()
	}
}

/// Feedback drafts keyed by study id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackBook {
	pub drafts: BTreeMap<String, FeedbackDraft>,
}
impl FeedbackBook {
	/// Returns whether `quality` is selected afterwards.
	pub fn toggle_quality(&mut self, id: &str, quality: &str) -> bool {
		let draft = self.draft_mut(id);

		if draft.qualities.remove(quality) {
			return false;
		}

		draft.qualities.insert(quality.to_string());

		true
	}

	pub fn set_keyword(&mut self, id: &str, keyword: &str, relevant: bool) {
		self.draft_mut(id).keywords.insert(keyword.to_string(), relevant);
	}

	pub fn clear_keyword(&mut self, id: &str, keyword: &str) -> bool {
		self.drafts
			.get_mut(id)
			.map(|draft| draft.keywords.remove(keyword).is_some())
			.unwrap_or(false)
	}

	pub fn set_elaborate(&mut self, id: &str, text: &str) {
		self.draft_mut(id).elaborate = text.to_string();
	}

	pub fn remove(&mut self, id: &str) -> Option<FeedbackDraft> {
		self.drafts.remove(id)
	}

	pub fn get(&self, id: &str) -> Option<&FeedbackDraft> {
		self.drafts.get(id)
	}

	pub fn len(&self) -> usize {
		self.drafts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.drafts.is_empty()
	}

	fn draft_mut(&mut self, id: &str) -> &mut FeedbackDraft {
		self.drafts.entry(id.to_string()).or_default()
	}
}
