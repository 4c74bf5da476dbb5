mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::Once,
};

use time::{Duration, OffsetDateTime, macros::datetime};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use scout_domain::{CartEntry, SearchHistoryEntry, SharedCart, Study, TermMatch};

pub const LOG_ENV: &str = "SCOUT_TEST_LOG";

/// Fixed instant used by fixtures so assertions never depend on the wall clock.
pub const EPOCH: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

/// A uniquely named directory under the system temp dir, removed on drop.
pub struct TestDir {
	path: PathBuf,
	cleaned: bool,
}
impl TestDir {
	pub fn new(prefix: &str) -> Result<Self> {
		if prefix.is_empty() || prefix.contains(['/', '\\']) {
			return Err(Error::Message(format!("Invalid test directory prefix {prefix:?}.")));
		}

		let path = env::temp_dir().join(format!("{prefix}_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&path)?;

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		fs::remove_dir_all(&self.path)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDir {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Test directory cleanup failed for {:?}: {err}.", self.path);
		}
	}
}

/// Installs a test-writer subscriber once per process. Filter comes from `SCOUT_TEST_LOG`.
pub fn init_tracing() {
	static INIT: Once = Once::new();

	INIT.call_once(|| {
		let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
	});
}

pub fn at(minutes: i64) -> OffsetDateTime {
	EPOCH + Duration::minutes(minutes)
}

pub fn cart_entry(id: &str, minutes: i64) -> CartEntry {
	CartEntry { id: id.to_string(), added_at: at(minutes) }
}

pub fn shared_cart(id: &str, name: &str, study_ids: &[&str]) -> SharedCart {
	SharedCart {
		id: id.to_string(),
		name: name.to_string(),
		created_at: EPOCH,
		studies: study_ids.iter().map(|study_id| cart_entry(study_id, 0)).collect(),
	}
}

pub fn history_entry(id: &str) -> SearchHistoryEntry {
	SearchHistoryEntry {
		id: id.to_string(),
		name: format!("Term {id}"),
		description: String::new(),
		kind: "ontology".to_string(),
	}
}

pub fn term(id: &str, score: f64) -> TermMatch {
	TermMatch {
		id: id.to_string(),
		name: format!("Term {id}"),
		description: String::new(),
		kind: "ontology".to_string(),
		score,
	}
}

pub fn study(id: &str) -> Study {
	Study {
		id: id.to_string(),
		title: format!("Study {id}"),
		platform: Some("ILLUMINA".to_string()),
		sample_count: 12,
		published_at: Some(EPOCH),
	}
}
