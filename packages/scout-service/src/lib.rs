pub mod cart;
pub mod feedback;
pub mod history;
pub mod inflight;
pub mod navigator;

mod error;

pub use cart::CartManager;
pub use error::{Error, Result};
pub use feedback::FeedbackDesk;
pub use history::RankedHistory;
pub use inflight::{Inflight, InflightState, SearchSession, Ticket};
pub use navigator::{MemoryNavigation, Navigation, Navigator};

use std::{future::Future, pin::Pin, sync::Arc};

use tracing_subscriber::EnvFilter;

use scout_config::Config;
use scout_domain::{
	CartReceipt, CreateCartRequest, FeedbackSubmission, PageSizes, SamplePage, SharedCart, Study,
	StudyPage, StudyQuery, TermMatch,
};
use scout_providers::HttpRecordStorage;
use scout_storage::PersistedStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote record-storage collaborator.
pub trait RecordStorage
where
	Self: Send + Sync,
{
	fn search_terms<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<TermMatch>>>;

	fn search_studies<'a>(&'a self, query: &'a StudyQuery) -> BoxFuture<'a, Result<StudyPage>>;

	fn lookup_studies<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Study>>>;

	fn list_samples<'a>(
		&'a self,
		study_id: &'a str,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<SamplePage>>;

	fn submit_feedback<'a>(
		&'a self,
		submission: &'a FeedbackSubmission,
	) -> BoxFuture<'a, Result<()>>;

	fn create_cart<'a>(
		&'a self,
		request: &'a CreateCartRequest,
	) -> BoxFuture<'a, Result<CartReceipt>>;

	/// `Ok(None)` when the service has no cart with `id`.
	fn get_cart<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<SharedCart>>>;
}

impl RecordStorage for HttpRecordStorage {
	fn search_terms<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<TermMatch>>> {
		Box::pin(async move { Ok(HttpRecordStorage::search_terms(self, text).await?) })
	}

	fn search_studies<'a>(&'a self, query: &'a StudyQuery) -> BoxFuture<'a, Result<StudyPage>> {
		Box::pin(async move { Ok(HttpRecordStorage::search_studies(self, query).await?) })
	}

	fn lookup_studies<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Study>>> {
		Box::pin(async move { Ok(HttpRecordStorage::lookup_studies(self, ids).await?) })
	}

	fn list_samples<'a>(
		&'a self,
		study_id: &'a str,
		offset: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<SamplePage>> {
		Box::pin(async move {
			Ok(HttpRecordStorage::list_samples(self, study_id, offset, limit).await?)
		})
	}

	fn submit_feedback<'a>(
		&'a self,
		submission: &'a FeedbackSubmission,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(HttpRecordStorage::submit_feedback(self, submission).await?) })
	}

	fn create_cart<'a>(
		&'a self,
		request: &'a CreateCartRequest,
	) -> BoxFuture<'a, Result<CartReceipt>> {
		Box::pin(async move { Ok(HttpRecordStorage::create_cart(self, request).await?) })
	}

	fn get_cart<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<SharedCart>>> {
		Box::pin(async move { Ok(HttpRecordStorage::get_cart(self, id).await?) })
	}
}

/// Every component wired over one store, one record-storage client and one navigation surface.
pub struct ScoutService {
	pub cfg: Config,
	pub store: Arc<PersistedStore>,
	pub records: Arc<dyn RecordStorage>,
	pub cart: CartManager,
	pub history: RankedHistory,
	pub feedback: FeedbackDesk,
	pub navigator: Navigator,
	pub session: SearchSession,
}
impl ScoutService {
	/// Opens the file-backed store and the HTTP record-storage client described by `cfg`.
	pub fn new(cfg: Config, navigation: Arc<dyn Navigation>) -> Result<Self> {
		let store = Arc::new(PersistedStore::open(&cfg.storage)?);
		let records = Arc::new(HttpRecordStorage::new(&cfg.record_storage)?);

		Ok(Self::with_collaborators(cfg, store, records, navigation))
	}

	pub fn with_collaborators(
		cfg: Config,
		store: Arc<PersistedStore>,
		records: Arc<dyn RecordStorage>,
		navigation: Arc<dyn Navigation>,
	) -> Self {
		let page_sizes = PageSizes::from_config(&cfg.search);

		Self {
			cart: CartManager::new(store.clone(), records.clone()),
			history: RankedHistory::new(store.clone(), cfg.history.max_entries),
			feedback: FeedbackDesk::new(store.clone(), records.clone()),
			navigator: Navigator::new(navigation, page_sizes),
			session: SearchSession::new(),
			cfg,
			store,
			records,
		}
	}

	/// Searches studies for the current location. Returns whether the result was applied.
	pub async fn refresh_studies(&self) -> bool {
		let query = self.navigator.query();

		self.session.search_studies(self.records.as_ref(), &query).await
	}

	/// Searches terms for `text`. Returns whether the result was applied.
	pub async fn refresh_terms(&self, text: &str) -> bool {
		self.session.search_terms(self.records.as_ref(), text).await
	}
}

/// Installs the global subscriber. Falls back to `info` when `log_level` is not a valid filter.
pub fn init_tracing(log_level: &str) -> Result<()> {
	let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.try_init()
		.map_err(|err| Error::InvalidRequest { message: format!("Tracing already set: {err}.") })
}
