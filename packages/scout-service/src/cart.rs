use std::sync::Arc;

use time::OffsetDateTime;

use scout_domain::{CreateCartRequest, LocalCart, SharedCart, SharedCartHistory, Study};
use scout_storage::PersistedStore;

use crate::{Error, RecordStorage, Result};

/// The local cart and the history of carts shared from it.
pub struct CartManager {
	store: Arc<PersistedStore>,
	records: Arc<dyn RecordStorage>,
}
impl CartManager {
	pub fn new(store: Arc<PersistedStore>, records: Arc<dyn RecordStorage>) -> Self {
		Self { store, records }
	}

	/// Returns whether `id` was newly added.
	pub fn add(&self, id: &str) -> Result<bool> {
		let id = require_id(id)?;
		let now = OffsetDateTime::now_utc();
		let (_, added) = self.store.update_with(|cart: &mut LocalCart| cart.add(id, now))?;

		Ok(added)
	}

	/// Returns how many ids were newly added.
	pub fn add_all(&self, ids: &[String]) -> Result<usize> {
		let ids = ids.iter().map(|id| require_id(id)).collect::<Result<Vec<_>>>()?;
		let now = OffsetDateTime::now_utc();
		let (_, added) =
			self.store.update_with(|cart: &mut LocalCart| cart.add_all(ids.iter().copied(), now))?;

		Ok(added)
	}

	pub fn remove(&self, id: &str) -> Result<usize> {
		let id = require_id(id)?;
		let (_, removed) = self.store.update_with(|cart: &mut LocalCart| cart.remove(id))?;

		Ok(removed)
	}

	pub fn contains(&self, id: &str) -> bool {
		let id = id.trim();

		!id.is_empty() && self.store.read::<LocalCart>().contains(id)
	}

	pub fn list(&self) -> LocalCart {
		self.store.read()
	}

	pub fn clear(&self) -> Result<()> {
		Ok(self.store.clear::<LocalCart>()?)
	}

	/// Study details for the cart, in cart order. Ids the service no longer knows are skipped.
	pub async fn studies(&self) -> Result<Vec<Study>> {
		let cart = self.list();
		let ids: Vec<String> = cart.ids().into_iter().map(str::to_string).collect();
		let mut found = self.records.lookup_studies(&ids).await?;
		let mut ordered = Vec::with_capacity(found.len());

		for id in &ids {
			if let Some(index) = found.iter().position(|study| &study.id == id) {
				ordered.push(found.swap_remove(index));
			}
		}

		Ok(ordered)
	}

	/// Publishes the current cart under `name` and records it in the shared history. The local
	/// cart is left as it is whatever the outcome.
	pub async fn share(&self, name: &str) -> Result<SharedCart> {
		let name = name.trim();

		if name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Cart name must be non-empty.".to_string(),
			});
		}

		let snapshot = self.list();

		if snapshot.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Cannot share an empty cart.".to_string(),
			});
		}

		let request = CreateCartRequest { name: name.to_string(), studies: snapshot.studies };
		let receipt = self.records.create_cart(&request).await?;
		let shared = SharedCart {
			id: receipt.id,
			name: request.name,
			created_at: receipt.created_at,
			studies: request.studies,
		};
		let (_, replaced) = self
			.store
			.update_with(|history: &mut SharedCartHistory| history.record(shared.clone()))?;

		tracing::info!(
			cart_id = %shared.id,
			studies = shared.studies.len(),
			replaced,
			"Cart shared."
		);

		Ok(shared)
	}

	pub fn shared_history(&self) -> SharedCartHistory {
		self.store.read()
	}

	pub fn forget_shared(&self, id: &str) -> Result<bool> {
		let (_, removed) =
			self.store.update_with(|history: &mut SharedCartHistory| history.remove(id))?;

		Ok(removed)
	}

	pub fn clear_shared_history(&self) -> Result<()> {
		Ok(self.store.clear::<SharedCartHistory>()?)
	}

	pub async fn open_shared(&self, id: &str) -> Result<SharedCart> {
		let id = require_id(id)?;

		self.records
			.get_cart(id)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("Shared cart {id} does not exist.") })
	}

	/// Replaces the local cart with the studies of `shared`, keeping their original add times.
	pub fn restore(&self, shared: &SharedCart) -> Result<LocalCart> {
		let cart = self.store.update(|cart: &mut LocalCart| {
			cart.studies.clear();

			for entry in &shared.studies {
				cart.add(&entry.id, entry.added_at);
			}
		})?;

		tracing::info!(cart_id = %shared.id, studies = cart.len(), "Local cart restored.");

		Ok(cart)
	}
}

fn require_id(id: &str) -> Result<&str> {
	let id = id.trim();

	if id.is_empty() {
		return Err(Error::InvalidRequest { message: "Study id must be non-empty.".to_string() });
	}

	Ok(id)
}
