use std::{
	fs,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use crate::{Backend, Error, Result};

const FILE_EXTENSION: &str = "json";

/// One file per key under `root`. Writes land in a temp sibling first and are renamed into place,
/// so a crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
	root: PathBuf,
}
impl FileBackend {
	pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
		let root = root.into();

		fs::create_dir_all(&root).map_err(|err| Error::Io { path: root.clone(), source: err })?;

		Ok(Self { root })
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn path_for(&self, key: &str) -> Result<PathBuf> {
		validate_key(key)?;

		Ok(self.root.join(format!("{key}.{FILE_EXTENSION}")))
	}
}

impl Backend for FileBackend {
	fn get(&self, key: &str) -> Result<Option<String>> {
		let path = self.path_for(key)?;

		match fs::read_to_string(&path) {
			Ok(raw) => Ok(Some(raw)),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
			Err(err) => Err(Error::Io { path, source: err }),
		}
	}

	fn set(&mut self, key: &str, value: &str) -> Result<()> {
		let path = self.path_for(key)?;
		let tmp = self.root.join(format!(".{key}.{FILE_EXTENSION}.tmp"));

		fs::write(&tmp, value).map_err(|err| Error::Io { path: tmp.clone(), source: err })?;
		fs::rename(&tmp, &path).map_err(|err| Error::Io { path, source: err })?;

		Ok(())
	}

	fn remove(&mut self, key: &str) -> Result<()> {
		let path = self.path_for(key)?;

		match fs::remove_file(&path) {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
			Err(err) => Err(Error::Io { path, source: err }),
		}
	}
}

fn validate_key(key: &str) -> Result<()> {
	let valid = !key.is_empty()
		&& !key.starts_with('.')
		&& key.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));

	if !valid {
		return Err(Error::InvalidKey(key.to_string()));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_path_like_keys() {
		for key in ["", "../cart", "a/b", ".hidden", "scout cart"] {
			assert!(matches!(validate_key(key), Err(Error::InvalidKey(_))), "accepted {key:?}");
		}

		assert!(validate_key("scout.search-history").is_ok());
	}
}
