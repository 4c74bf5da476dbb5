use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
	pub id: String,
	#[serde(with = "time::serde::rfc3339")]
	pub added_at: OffsetDateTime,
}

/// The cart owned by this device. Order is the order of first add.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCart {
	#[serde(default)]
	pub studies: Vec<CartEntry>,
}
impl LocalCart {
	/// Adds `id` unless present. An existing entry keeps its position and `added_at`.
	pub fn add(&mut self, id: &str, now: OffsetDateTime) -> bool {
		if self.contains(id) {
			return false;
		}

		self.studies.push(CartEntry { id: id.to_string(), added_at: now });

		true
	}

	pub fn add_all<'a, I>(&mut self, ids: I, now: OffsetDateTime) -> usize
	where
		I: IntoIterator<Item = &'a str>,
	{
		ids.into_iter().filter(|id| self.add(id, now)).count()
	}

	/// Removes every entry for `id`. Returns how many were removed.
	pub fn remove(&mut self, id: &str) -> usize {
		let before = self.studies.len();

		self.studies.retain(|entry| entry.id != id);

		before - self.studies.len()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.studies.iter().any(|entry| entry.id == id)
	}

	pub fn get(&self, id: &str) -> Option<&CartEntry> {
		self.studies.iter().find(|entry| entry.id == id)
	}

	pub fn ids(&self) -> Vec<&str> {
		self.studies.iter().map(|entry| entry.id.as_str()).collect()
	}

	pub fn len(&self) -> usize {
		self.studies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.studies.is_empty()
	}
}

/// Server-issued snapshot of a local cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedCart {
	pub id: String,
	pub name: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(default)]
	pub studies: Vec<CartEntry>,
}
impl SharedCart {
	/// Same name and studies. Server id and creation time are ignored.
	pub fn same_content(&self, other: &SharedCart) -> bool {
		self.name == other.name && self.studies == other.studies
	}
}

/// Previously shared carts, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedCartHistory {
	#[serde(default)]
	pub carts: Vec<SharedCart>,
}
impl SharedCartHistory {
	/// Puts `cart` at the front and drops older rows with the same content. Returns whether a
	/// duplicate was replaced.
	pub fn record(&mut self, cart: SharedCart) -> bool {
		let before = self.carts.len();

		self.carts.retain(|existing| existing.id != cart.id && !existing.same_content(&cart));

		let replaced = self.carts.len() != before;

		self.carts.insert(0, cart);

		replaced
	}

	pub fn remove(&mut self, id: &str) -> bool {
		let before = self.carts.len();

		self.carts.retain(|cart| cart.id != id);

		self.carts.len() != before
	}

	pub fn find(&self, id: &str) -> Option<&SharedCart> {
		self.carts.iter().find(|cart| cart.id == id)
	}

	pub fn len(&self) -> usize {
		self.carts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.carts.is_empty()
	}
}
