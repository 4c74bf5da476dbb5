//! Shareable location state and the merge rules applied on every navigation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

pub const ROOT_PATH: &str = "/";

/// A single edit to a search parameter. `Delete` is the removal sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamEdit {
	Set(String),
	Delete,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
	pub path: String,
	#[serde(default)]
	pub search: BTreeMap<String, String>,
	/// Fragment without the leading `#`. Empty means no fragment.
	#[serde(default)]
	pub hash: String,
	#[serde(default)]
	pub state: Map<String, Value>,
}
impl Location {
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into(), ..Self::default() }
	}

	/// Parses `path?query#hash`. Repeated query keys keep the last value.
	pub fn parse(href: &str) -> Self {
		let (before_hash, hash) = href.split_once('#').unwrap_or((href, ""));
		let (path, query) = before_hash.split_once('?').unwrap_or((before_hash, ""));
		let path = if path.is_empty() { ROOT_PATH } else { path };
		let search = form_urlencoded::parse(query.as_bytes()).into_owned().collect();

		Self { path: path.to_string(), search, hash: hash.to_string(), state: Map::new() }
	}

	pub fn to_href(&self) -> String {
		let mut href = self.path.clone();

		if !self.search.is_empty() {
			let query = form_urlencoded::Serializer::new(String::new())
				.extend_pairs(self.search.iter())
				.finish();

			href.push('?');
			href.push_str(&query);
		}
		if !self.hash.is_empty() {
			href.push('#');
			href.push_str(&self.hash);
		}

		href
	}

	pub fn param(&self, key: &str) -> Option<&str> {
		self.search.get(key).map(String::as_str)
	}

	pub fn merge(&self, request: &LocationRequest) -> Self {
		let path = match request.path.as_deref() {
			Some(ROOT_PATH) if request.search.is_empty() && request.hash.is_none() =>
				self.path.clone(),
			Some(path) => path.to_string(),
			None => self.path.clone(),
		};
		let mut search = self.search.clone();

		for (key, edit) in &request.search {
			match edit {
				ParamEdit::Set(value) => {
					search.insert(key.clone(), value.clone());
				},
				ParamEdit::Delete => {
					search.remove(key);
				},
			}
		}

		let hash = match request.hash.as_ref() {
			Some(hash) => hash.clone(),
			None if path != self.path => String::new(),
			None => self.hash.clone(),
		};
		let mut state = self.state.clone();

		for (key, value) in &request.state {
			state.insert(key.clone(), value.clone());
		}

		Self { path, search, hash, state }
	}
}

/// A partial location. Unset fields leave the current location untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequest {
	#[serde(default)]
	pub path: Option<String>,
	#[serde(default)]
	pub search: BTreeMap<String, ParamEdit>,
	#[serde(default)]
	pub hash: Option<String>,
	#[serde(default)]
	pub state: Map<String, Value>,
}
impl LocationRequest {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn to_path(path: impl Into<String>) -> Self {
		Self { path: Some(path.into()), ..Self::default() }
	}

	pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.search.insert(key.into(), ParamEdit::Set(value.into()));

		self
	}

	pub fn delete(mut self, key: impl Into<String>) -> Self {
		self.search.insert(key.into(), ParamEdit::Delete);

		self
	}

	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		let hash = hash.into();

		self.hash = Some(hash.strip_prefix('#').map(str::to_string).unwrap_or(hash));

		self
	}

	pub fn with_state(mut self, key: impl Into<String>, value: Value) -> Self {
		self.state.insert(key.into(), value);

		self
	}

	pub fn is_empty(&self) -> bool {
		self.path.is_none()
			&& self.search.is_empty()
			&& self.hash.is_none()
			&& self.state.is_empty()
	}

	/// Folds `later` into `self`; edits in `later` win key by key.
	pub fn extend(&mut self, later: LocationRequest) {
		if later.path.is_some() {
			self.path = later.path;
		}
		if later.hash.is_some() {
			self.hash = later.hash;
		}

		self.search.extend(later.search);
		self.state.extend(later.state);
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn studies_location() -> Location {
		let mut location = Location::parse("/studies?facet.platform=ILLUMINA&q=liver#results");

		location.state.insert("scroll".to_string(), json!(120));

		location
	}

	#[test]
	fn parses_and_renders_href() {
		let location = Location::parse("/studies?q=liver+cancer&offset=20#top");

		assert_eq!(location.path, "/studies");
		assert_eq!(location.param("q"), Some("liver cancer"));
		assert_eq!(location.param("offset"), Some("20"));
		assert_eq!(location.hash, "top");
		assert_eq!(location.to_href(), "/studies?offset=20&q=liver+cancer#top");
	}

	#[test]
	fn empty_path_parses_as_root() {
		assert_eq!(Location::parse("?q=x").path, ROOT_PATH);
		assert_eq!(Location::parse("").to_href(), ROOT_PATH);
	}

	#[test]
	fn empty_request_is_noop() {
		let location = studies_location();

		assert_eq!(location.merge(&LocationRequest::new()), location);
	}

	#[test]
	fn bare_root_link_keeps_current_path() {
		let location = studies_location();
		let merged = location.merge(&LocationRequest::to_path(ROOT_PATH));

		assert_eq!(merged.path, "/studies");
		assert_eq!(merged.hash, "results");
	}

	#[test]
	fn root_link_with_params_navigates_home() {
		let location = studies_location();
		let merged = location.merge(&LocationRequest::to_path(ROOT_PATH).set("q", "kidney"));

		assert_eq!(merged.path, ROOT_PATH);
		assert_eq!(merged.param("q"), Some("kidney"));
		assert_eq!(merged.param("facet.platform"), Some("ILLUMINA"));
		assert_eq!(merged.hash, "");
	}

	#[test]
	fn set_preserves_unrelated_params() {
		let location = studies_location();
		let merged = location.merge(&LocationRequest::new().set("facet.organism", "human"));

		assert_eq!(merged.param("facet.organism"), Some("human"));
		assert_eq!(merged.param("facet.platform"), Some("ILLUMINA"));
		assert_eq!(merged.param("q"), Some("liver"));
	}

	#[test]
	fn delete_removes_exactly_one_key() {
		let location = studies_location();
		let merged = location.merge(&LocationRequest::new().delete("q"));

		assert_eq!(merged.param("q"), None);
		assert_eq!(merged.search.len(), location.search.len() - 1);
		assert_eq!(merged.param("facet.platform"), Some("ILLUMINA"));
	}

	#[test]
	fn hash_follows_page_changes() {
		let location = studies_location();
		let same_page = location.merge(&LocationRequest::new().set("offset", "10"));
		let other_page = location.merge(&LocationRequest::to_path("/cart"));
		let explicit = location.merge(&LocationRequest::new().with_hash("#facets"));

		assert_eq!(same_page.hash, "results");
		assert_eq!(other_page.hash, "");
		assert_eq!(explicit.hash, "facets");
	}

	#[test]
	fn state_is_shallow_merged() {
		let location = studies_location();
		let merged = location.merge(
			&LocationRequest::new().with_state("scroll", json!(0)).with_state("from", json!("cart")),
		);

		assert_eq!(merged.state.get("scroll"), Some(&json!(0)));
		assert_eq!(merged.state.get("from"), Some(&json!("cart")));
	}

	#[test]
	fn extend_lets_later_edits_win() {
		let mut request = LocationRequest::new().set("offset", "7").set("q", "liver");

		request.extend(LocationRequest::new().set("offset", "0").delete("q"));

		assert_eq!(request.search.get("offset"), Some(&ParamEdit::Set("0".to_string())));
		assert_eq!(request.search.get("q"), Some(&ParamEdit::Delete));
	}
}
