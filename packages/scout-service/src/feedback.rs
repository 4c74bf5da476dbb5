use std::sync::Arc;

use scout_domain::{FeedbackBook, FeedbackDraft, FeedbackSubmission};
use scout_storage::PersistedStore;

use crate::{Error, RecordStorage, Result};

/// Per-study feedback drafts and their submission.
pub struct FeedbackDesk {
	store: Arc<PersistedStore>,
	records: Arc<dyn RecordStorage>,
}
impl FeedbackDesk {
	pub fn new(store: Arc<PersistedStore>, records: Arc<dyn RecordStorage>) -> Self {
		Self { store, records }
	}

	/// Returns whether `quality` is selected afterwards.
	pub fn toggle_quality(&self, id: &str, quality: &str) -> Result<bool> {
		let (_, selected) =
			self.store.update_with(|book: &mut FeedbackBook| book.toggle_quality(id, quality))?;

		Ok(selected)
	}

	pub fn set_keyword(&self, id: &str, keyword: &str, relevant: bool) -> Result<()> {
		self.store.update(|book: &mut FeedbackBook| book.set_keyword(id, keyword, relevant))?;

		Ok(())
	}

	pub fn clear_keyword(&self, id: &str, keyword: &str) -> Result<bool> {
		let (_, cleared) =
			self.store.update_with(|book: &mut FeedbackBook| book.clear_keyword(id, keyword))?;

		Ok(cleared)
	}

	pub fn set_elaborate(&self, id: &str, text: &str) -> Result<()> {
		self.store.update(|book: &mut FeedbackBook| book.set_elaborate(id, text))?;

		Ok(())
	}

	pub fn remove(&self, id: &str) -> Result<Option<FeedbackDraft>> {
		let (_, removed) = self.store.update_with(|book: &mut FeedbackBook| book.remove(id))?;

		Ok(removed)
	}

	pub fn get(&self, id: &str) -> Option<FeedbackDraft> {
		self.store.read::<FeedbackBook>().get(id).cloned()
	}

	pub fn drafts(&self) -> FeedbackBook {
		self.store.read()
	}

	/// Sends the draft for `id` and drops it once the service accepted it. A failed send keeps the
	/// draft as it was.
	pub async fn submit(&self, id: &str) -> Result<()> {
		let Some(draft) = self.get(id) else {
			return Err(Error::NotFound { message: format!("No feedback draft for {id}.") });
		};

		if draft.is_blank() {
			return Err(Error::InvalidRequest {
				message: format!("Feedback draft for {id} is empty."),
			});
		}

		let submission = FeedbackSubmission::from_draft(id, &draft);

		self.records.submit_feedback(&submission).await?;
		self.store.update(|book: &mut FeedbackBook| {
			book.remove(id);
		})?;

		tracing::info!(study_id = id, "Feedback submitted.");

		Ok(())
	}
}
