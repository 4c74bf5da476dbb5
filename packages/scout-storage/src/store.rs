use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Backend, Error, FileBackend, Result, ShapeError};

/// The declared contract of one persisted key.
pub trait Shape
where
	Self: Sized + Serialize + DeserializeOwned,
{
	const KEY: &'static str;

	/// Value returned when nothing valid is stored.
	fn fallback() -> Self;

	/// Structural rules beyond what decoding enforces.
	fn check(&self) -> Result<(), ShapeError> {
		Ok(())
	}

	fn validate(raw: &str) -> Result<Self, ShapeError> {
		let value: Self =
			serde_json::from_str(raw).map_err(|err| ShapeError::Parse(err.to_string()))?;

		value.check()?;

		Ok(value)
	}
}

/// Receives recoverable storage problems. None of them reach the caller of `read`.
pub trait Diagnostics
where
	Self: Send + Sync,
{
	fn value_rejected(&self, key: &str, error: &ShapeError);

	fn backend_failed(&self, key: &str, error: &Error);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;
impl Diagnostics for TracingDiagnostics {
	fn value_rejected(&self, key: &str, error: &ShapeError) {
		tracing::warn!(key, error = %error, "Discarded invalid persisted value.");
	}

	fn backend_failed(&self, key: &str, error: &Error) {
		tracing::warn!(key, error = %error, "Persisted storage backend failed.");
	}
}

pub struct PersistedStore {
	backend: Mutex<Box<dyn Backend>>,
	namespace: String,
	diagnostics: Arc<dyn Diagnostics>,
}
impl PersistedStore {
	pub fn new(backend: impl Backend + 'static, namespace: impl Into<String>) -> Self {
		Self {
			backend: Mutex::new(Box::new(backend)),
			namespace: namespace.into(),
			diagnostics: Arc::new(TracingDiagnostics),
		}
	}

	pub fn open(cfg: &scout_config::Storage) -> Result<Self> {
		let backend = FileBackend::open(&cfg.dir)?;

		Ok(Self::new(backend, cfg.namespace.clone()))
	}

	pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
		self.diagnostics = diagnostics;

		self
	}

	pub fn key<T>(&self) -> String
	where
		T: Shape,
	{
		format!("{}.{}", self.namespace, T::KEY)
	}

	/// The last valid value, or the fallback. Invalid stored text is deleted before returning.
	pub fn read<T>(&self) -> T
	where
		T: Shape,
	{
		let mut backend = self.lock();

		self.read_locked(&mut **backend)
	}

	/// Persists `value` as is. Shapes are checked on read, not here.
	pub fn write<T>(&self, value: &T) -> Result<()>
	where
		T: Shape,
	{
		let mut backend = self.lock();

		self.write_locked(&mut **backend, value)
	}

	/// Read, apply `f`, write, all under one lock. Returns the stored value.
	pub fn update<T, F>(&self, f: F) -> Result<T>
	where
		T: Shape,
		F: FnOnce(&mut T),
	{
		self.update_with(f).map(|(value, ())| value)
	}

	/// Like `update`, also handing back what `f` returned.
	pub fn update_with<T, R, F>(&self, f: F) -> Result<(T, R)>
	where
		T: Shape,
		F: FnOnce(&mut T) -> R,
	{
		let mut backend = self.lock();
		let mut value = self.read_locked(&mut **backend);
		let output = f(&mut value);

		self.write_locked(&mut **backend, &value)?;

		Ok((value, output))
	}

	/// Drops the stored value; the next read yields the fallback.
	pub fn clear<T>(&self) -> Result<()>
	where
		T: Shape,
	{
		let key = self.key::<T>();

		self.lock().remove(&key)?;

		tracing::debug!(key = %key, "Persisted value cleared.");

		Ok(())
	}

	/// Raw stored text, without validation.
	pub fn stored_text<T>(&self) -> Result<Option<String>>
	where
		T: Shape,
	{
		let key = self.key::<T>();

		self.lock().get(&key)
	}

	fn lock(&self) -> MutexGuard<'_, Box<dyn Backend>> {
		self.backend.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn read_locked<T>(&self, backend: &mut dyn Backend) -> T
	where
		T: Shape,
	{
		let key = self.key::<T>();
		let raw = match backend.get(&key) {
			Ok(Some(raw)) => raw,
			Ok(None) => return T::fallback(),
			Err(err) => {
				self.diagnostics.backend_failed(&key, &err);

				return T::fallback();
			},
		};

		match T::validate(&raw) {
			Ok(value) => value,
			Err(err) => {
				self.diagnostics.value_rejected(&key, &err);

				if let Err(remove_err) = backend.remove(&key) {
					self.diagnostics.backend_failed(&key, &remove_err);
				}

				T::fallback()
			},
		}
	}

	fn write_locked<T>(&self, backend: &mut dyn Backend, value: &T) -> Result<()>
	where
		T: Shape,
	{
		let key = self.key::<T>();
		let raw = serde_json::to_string(value)?;

		backend.set(&key, &raw)?;

		tracing::debug!(key = %key, bytes = raw.len(), "Persisted value written.");

		Ok(())
	}
}
