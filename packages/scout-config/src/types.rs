use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub record_storage: RecordStorage,
	pub search: Search,
	pub history: History,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	/// Root directory of the file backend. Each persisted key becomes one file below it.
	pub dir: std::path::PathBuf,
	/// Prefix for every persisted key, e.g. "scout" gives "scout.cart".
	pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordStorage {
	pub api_base: String,
	pub timeout_ms: u64,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	#[serde(default = "default_retry_backoff_ms")]
	pub retry_backoff_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub page_sizes: Vec<u64>,
	pub default_page_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct History {
	pub max_entries: usize,
}

fn default_max_retries() -> u32 {
	3
}

fn default_retry_backoff_ms() -> u64 {
	250
}
