use std::collections::HashMap;

use crate::Result;

/// Flat string key/value surface backing the persisted store.
pub trait Backend
where
	Self: Send,
{
	fn get(&self, key: &str) -> Result<Option<String>>;

	fn set(&mut self, key: &str, value: &str) -> Result<()>;

	fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
	entries: HashMap<String, String>,
}
impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds raw text, bypassing any shape.
	pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.entries.insert(key.into(), value.into());

		self
	}
}

impl Backend for MemoryBackend {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.get(key).cloned())
	}

	fn set(&mut self, key: &str, value: &str) -> Result<()> {
		self.entries.insert(key.to_string(), value.to_string());

		Ok(())
	}

	fn remove(&mut self, key: &str) -> Result<()> {
		self.entries.remove(key);

		Ok(())
	}
}
