//! Declared shapes for every persisted key.

use std::collections::HashSet;

use scout_domain::{FeedbackBook, LocalCart, SearchHistory, SharedCartHistory};

use crate::{Shape, ShapeError};

impl Shape for LocalCart {
	const KEY: &'static str = "cart";

	fn fallback() -> Self {
		Self::default()
	}

	fn check(&self) -> Result<(), ShapeError> {
		if self.studies.iter().any(|entry| entry.id.trim().is_empty()) {
			return Err(ShapeError::Invalid("cart entry id must be non-empty.".to_string()));
		}

		Ok(())
	}

	/// Repeated ids keep their first entry instead of discarding the whole cart.
	fn validate(raw: &str) -> Result<Self, ShapeError> {
		let mut cart: Self =
			serde_json::from_str(raw).map_err(|err| ShapeError::Parse(err.to_string()))?;

		cart.check()?;

		let mut seen = HashSet::with_capacity(cart.studies.len());

		cart.studies.retain(|entry| seen.insert(entry.id.clone()));

		Ok(cart)
	}
}

impl Shape for SharedCartHistory {
	const KEY: &'static str = "shared-carts";

	fn fallback() -> Self {
		Self::default()
	}

	fn check(&self) -> Result<(), ShapeError> {
		for cart in &self.carts {
			if cart.id.trim().is_empty() {
				return Err(ShapeError::Invalid("shared cart id must be non-empty.".to_string()));
			}
			if cart.studies.iter().any(|entry| entry.id.trim().is_empty()) {
				return Err(ShapeError::Invalid(format!(
					"shared cart {} has an entry without an id.",
					cart.id
				)));
			}
		}

		Ok(())
	}
}

impl Shape for FeedbackBook {
	const KEY: &'static str = "feedback";

	fn fallback() -> Self {
		Self::default()
	}

	fn check(&self) -> Result<(), ShapeError> {
		if self.drafts.keys().any(|id| id.trim().is_empty()) {
			return Err(ShapeError::Invalid("feedback study id must be non-empty.".to_string()));
		}

		Ok(())
	}
}

impl Shape for SearchHistory {
	const KEY: &'static str = "search-history";

	fn fallback() -> Self {
		Self::default()
	}

	fn check(&self) -> Result<(), ShapeError> {
		if self.entries.iter().any(|entry| entry.id.trim().is_empty()) {
			return Err(ShapeError::Invalid("search history id must be non-empty.".to_string()));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duplicate_cart_ids_keep_the_first_entry() {
		let raw = r#"{"studies":[
			{"id":"a","added_at":"2024-01-01T00:00:00Z"},
			{"id":"b","added_at":"2024-01-02T00:00:00Z"},
			{"id":"a","added_at":"2024-01-03T00:00:00Z"}
		]}"#;
		let cart = LocalCart::validate(raw).expect("Duplicates must not reject the cart.");

		assert_eq!(cart.ids(), vec!["a", "b"]);
		assert!(cart.studies[0].added_at < cart.studies[1].added_at);
		assert!(matches!(
			LocalCart::validate(r#"{"studies":[{"id":" ","added_at":"2024-01-01T00:00:00Z"}]}"#),
			Err(ShapeError::Invalid(_))
		));
	}

	#[test]
	fn wrong_types_are_parse_errors() {
		assert!(matches!(SearchHistory::validate(r#"{"entries":5}"#), Err(ShapeError::Parse(_))));
		assert!(matches!(FeedbackBook::validate("[]"), Err(ShapeError::Parse(_))));
	}

	#[test]
	fn blank_feedback_keys_are_rejected() {
		assert!(matches!(FeedbackBook::validate(r#"{" ":{}}"#), Err(ShapeError::Invalid(_))));
		assert!(FeedbackBook::validate(r#"{"SRP1":{"qualities":["raw-data"]}}"#).is_ok());
	}
}
