mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, History, RecordStorage, Search, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.dir.as_os_str().is_empty() {
		return Err(Error::Validation { message: "storage.dir must be non-empty.".to_string() });
	}
	if cfg.storage.namespace.is_empty()
		|| !cfg
			.storage
			.namespace
			.chars()
			.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
	{
		return Err(Error::Validation {
			message: "storage.namespace must match [A-Za-z0-9_-]+.".to_string(),
		});
	}

	let api_base = cfg.record_storage.api_base.as_str();

	if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
		return Err(Error::Validation {
			message: "record_storage.api_base must be an http or https URL.".to_string(),
		});
	}
	if cfg.record_storage.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "record_storage.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.record_storage.max_retries > 10 {
		return Err(Error::Validation {
			message: "record_storage.max_retries must be 10 or less.".to_string(),
		});
	}

	for (key, value) in &cfg.record_storage.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("record_storage.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.search.page_sizes.is_empty() {
		return Err(Error::Validation {
			message: "search.page_sizes must be non-empty.".to_string(),
		});
	}
	if cfg.search.page_sizes.contains(&0) {
		return Err(Error::Validation {
			message: "search.page_sizes must all be greater than zero.".to_string(),
		});
	}
	if !cfg.search.page_sizes.contains(&cfg.search.default_page_size) {
		return Err(Error::Validation {
			message: "search.default_page_size must be one of search.page_sizes.".to_string(),
		});
	}
	if cfg.history.max_entries == 0 {
		return Err(Error::Validation {
			message: "history.max_entries must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.record_storage.api_base.trim().trim_end_matches('/').to_string();

	cfg.record_storage.api_base = trimmed;

	cfg.record_storage
		.default_headers
		.retain(|_, value| value.as_str().map(|raw| !raw.trim().is_empty()).unwrap_or(true));
	cfg.search.page_sizes.sort_unstable();
	cfg.search.page_sizes.dedup();
}
