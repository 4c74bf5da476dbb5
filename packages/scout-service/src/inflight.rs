//! Keyed tracking of asynchronous searches.
//!
//! Every search is started under a key derived from its input. When a newer search starts, the
//! older one keeps running, but its result no longer matches the current key and is dropped on
//! completion instead of overwriting what the newer search produced.

use std::{
	fmt::Display,
	sync::{Mutex, MutexGuard},
};

use scout_domain::{QueryState, StudyPage, StudyQuery, TermMatch};

use crate::RecordStorage;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InflightState<T> {
	#[default]
	Idle,
	Loading,
	Ready(T),
	Failed(String),
}
impl<T> InflightState<T> {
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}

	pub fn ready(&self) -> Option<&T> {
		match self {
			Self::Ready(value) => Some(value),
			_ => None,
		}
	}
}

/// Handed out by `Inflight::begin`; redeemed by `Inflight::complete`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
	key: String,
}
impl Ticket {
	pub fn key(&self) -> &str {
		&self.key
	}
}

#[derive(Debug, Default)]
pub struct Inflight<T> {
	current: Option<String>,
	state: InflightState<T>,
}
impl<T> Inflight<T> {
	pub fn new() -> Self {
		Self { current: None, state: InflightState::Idle }
	}

	pub fn begin(&mut self, key: impl Into<String>) -> Ticket {
		let key = key.into();

		self.current = Some(key.clone());
		self.state = InflightState::Loading;

		Ticket { key }
	}

	/// Stores `result` when `ticket` still names the latest operation. Returns whether it did.
	pub fn complete<E>(&mut self, ticket: Ticket, result: Result<T, E>) -> bool
	where
		E: Display,
	{
		if !self.is_current(&ticket) {
			tracing::debug!(key = %ticket.key, "Discarded stale completion.");

			return false;
		}

		self.state = match result {
			Ok(value) => InflightState::Ready(value),
			Err(err) => InflightState::Failed(err.to_string()),
		};

		true
	}

	pub fn is_current(&self, ticket: &Ticket) -> bool {
		self.current.as_deref() == Some(ticket.key.as_str())
	}

	pub fn key(&self) -> Option<&str> {
		self.current.as_deref()
	}

	pub fn state(&self) -> &InflightState<T> {
		&self.state
	}

	pub fn reset(&mut self) {
		self.current = None;
		self.state = InflightState::Idle;
	}
}

/// The study search and the term search of one catalog view.
#[derive(Debug, Default)]
pub struct SearchSession {
	studies: Mutex<Inflight<StudyPage>>,
	terms: Mutex<Inflight<Vec<TermMatch>>>,
}
impl SearchSession {
	pub fn new() -> Self {
		Self::default()
	}

	/// blake3 digest of the canonical query, so equal states share a key.
	pub fn study_key(state: &QueryState) -> String {
		blake3::hash(state.canonical_query().as_bytes()).to_hex().to_string()
	}

	/// Lowercased text with runs of whitespace collapsed.
	pub fn term_key(text: &str) -> String {
		text.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
	}

	pub fn studies(&self) -> InflightState<StudyPage> {
		lock(&self.studies).state().clone()
	}

	pub fn terms(&self) -> InflightState<Vec<TermMatch>> {
		lock(&self.terms).state().clone()
	}

	/// Runs a study search for `state`. Returns whether its result became the current one.
	pub async fn search_studies(&self, records: &dyn RecordStorage, state: &QueryState) -> bool {
		let ticket = lock(&self.studies).begin(Self::study_key(state));
		let query = StudyQuery::from(state);
		let result = records.search_studies(&query).await;

		lock(&self.studies).complete(ticket, result)
	}

	/// Runs a term search for `text`. Blank text clears the results without a request.
	pub async fn search_terms(&self, records: &dyn RecordStorage, text: &str) -> bool {
		let key = Self::term_key(text);

		if key.is_empty() {
			lock(&self.terms).reset();

			return true;
		}

		let ticket = lock(&self.terms).begin(key.clone());
		let result = records.search_terms(text.trim()).await;

		lock(&self.terms).complete(ticket, result)
	}
}

fn lock<T>(inflight: &Mutex<Inflight<T>>) -> MutexGuard<'_, Inflight<T>> {
	inflight.lock().unwrap_or_else(|err| err.into_inner())
}
