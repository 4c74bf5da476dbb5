//! Query state derived from a location.
//!
//! Every field degrades to its default when the location carries a malformed value, so a bad link
//! never breaks the view.

use std::{
	collections::{BTreeMap, BTreeSet},
	fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::location::{Location, LocationRequest};

pub const SEARCH_TEXT_PARAM: &str = "q";
pub const SORT_PARAM: &str = "sort";
pub const OFFSET_PARAM: &str = "offset";
pub const LIMIT_PARAM: &str = "limit";
pub const FACET_PARAM_PREFIX: &str = "facet.";
pub const DEFAULT_PAGE_SIZES: [u64; 4] = [10, 20, 50, 100];

pub type Facets = BTreeMap<String, BTreeSet<String>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
	#[default]
	#[serde(rename = "relevance")]
	Relevance,
	#[serde(rename = "date-desc")]
	NewestFirst,
	#[serde(rename = "date-asc")]
	OldestFirst,
	#[serde(rename = "samples-desc")]
	MostSamples,
	#[serde(rename = "samples-asc")]
	FewestSamples,
}
impl SortKey {
	pub const ALL: [SortKey; 5] = [
		Self::Relevance,
		Self::NewestFirst,
		Self::OldestFirst,
		Self::MostSamples,
		Self::FewestSamples,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Relevance => "relevance",
			Self::NewestFirst => "date-desc",
			Self::OldestFirst => "date-asc",
			Self::MostSamples => "samples-desc",
			Self::FewestSamples => "samples-asc",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();

		Self::ALL.into_iter().find(|key| key.as_str() == raw)
	}
}

impl Display for SortKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		self.as_str().fmt(f)
	}
}

/// The allowed page sizes and the one used when a location does not name a valid size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSizes {
	allowed: Vec<u64>,
	default: u64,
}
impl PageSizes {
	pub fn new(mut allowed: Vec<u64>, default: u64) -> Self {
		allowed.retain(|size| *size > 0);
		allowed.sort_unstable();
		allowed.dedup();

		if allowed.is_empty() {
			allowed = DEFAULT_PAGE_SIZES.to_vec();
		}

		let default = if allowed.contains(&default) { default } else { allowed[0] };

		Self { allowed, default }
	}

	pub fn from_config(cfg: &scout_config::Search) -> Self {
		Self::new(cfg.page_sizes.clone(), cfg.default_page_size)
	}

	pub fn allowed(&self) -> &[u64] {
		&self.allowed
	}

	pub fn default_size(&self) -> u64 {
		self.default
	}

	pub fn contains(&self, limit: u64) -> bool {
		self.allowed.contains(&limit)
	}

	pub fn resolve(&self, raw: Option<&str>) -> u64 {
		raw.and_then(|raw| raw.trim().parse::<u64>().ok())
			.filter(|limit| self.contains(*limit))
			.unwrap_or(self.default)
	}
}

impl Default for PageSizes {
	fn default() -> Self {
		Self::new(DEFAULT_PAGE_SIZES.to_vec(), DEFAULT_PAGE_SIZES[0])
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
	pub search_text: String,
	pub facets: Facets,
	pub sort: SortKey,
	pub offset: u64,
	pub limit: u64,
}
impl QueryState {
	pub fn new(limit: u64) -> Self {
		Self {
			search_text: String::new(),
			facets: Facets::new(),
			sort: SortKey::default(),
			offset: 0,
			limit,
		}
	}

	/// Reads the query out of `location`. The offset is returned as found; aligning it to the
	/// page size is the caller's follow-up step.
	pub fn from_location(location: &Location, page_sizes: &PageSizes) -> Self {
		let search_text =
			location.param(SEARCH_TEXT_PARAM).map(str::trim).unwrap_or_default().to_string();
		let sort = location.param(SORT_PARAM).and_then(SortKey::parse).unwrap_or_default();
		let offset = location
			.param(OFFSET_PARAM)
			.and_then(|raw| raw.trim().parse::<u64>().ok())
			.unwrap_or(0);
		let limit = page_sizes.resolve(location.param(LIMIT_PARAM));
		let mut facets = Facets::new();

		for (key, raw) in &location.search {
			let Some(name) = key.strip_prefix(FACET_PARAM_PREFIX) else {
				continue;
			};

			if name.trim().is_empty() {
				continue;
			}

			let values = decode_facet_values(raw);

			if !values.is_empty() {
				facets.insert(name.to_string(), values);
			}
		}

		Self { search_text, facets, sort, offset, limit }
	}

	/// Builds the edits that move `current` to this state. Keys at their defaults are deleted so
	/// shared links stay short, and facets no longer selected are dropped.
	pub fn to_request(&self, current: &Location, page_sizes: &PageSizes) -> LocationRequest {
		let mut request = LocationRequest::new();

		request = if self.search_text.trim().is_empty() {
			request.delete(SEARCH_TEXT_PARAM)
		} else {
			request.set(SEARCH_TEXT_PARAM, self.search_text.trim())
		};
		request = if self.sort == SortKey::Relevance {
			request.delete(SORT_PARAM)
		} else {
			request.set(SORT_PARAM, self.sort.as_str())
		};
		request = if self.offset == 0 {
			request.delete(OFFSET_PARAM)
		} else {
			request.set(OFFSET_PARAM, self.offset.to_string())
		};
		request = if self.limit == page_sizes.default_size() {
			request.delete(LIMIT_PARAM)
		} else {
			request.set(LIMIT_PARAM, self.limit.to_string())
		};

		for key in current.search.keys() {
			if let Some(name) = key.strip_prefix(FACET_PARAM_PREFIX)
				&& !self.facets.get(name).map(|values| !values.is_empty()).unwrap_or(false)
			{
				request = request.delete(key.clone());
			}
		}
		for (name, values) in &self.facets {
			if values.is_empty() {
				continue;
			}

			request = request.set(facet_param(name), encode_facet_values(values));
		}

		request
	}

	/// Every query key with its value spelled out, defaults included.
	pub fn to_params(&self) -> BTreeMap<String, String> {
		let mut params = BTreeMap::new();

		params.insert(SEARCH_TEXT_PARAM.to_string(), self.search_text.trim().to_string());
		params.insert(SORT_PARAM.to_string(), self.sort.as_str().to_string());
		params.insert(OFFSET_PARAM.to_string(), self.offset.to_string());
		params.insert(LIMIT_PARAM.to_string(), self.limit.to_string());

		for (name, values) in &self.facets {
			if !values.is_empty() {
				params.insert(facet_param(name), encode_facet_values(values));
			}
		}

		params
	}

	/// Stable text form of the query, equal for equal states.
	pub fn canonical_query(&self) -> String {
		form_urlencoded::Serializer::new(String::new()).extend_pairs(self.to_params()).finish()
	}

	/// Adds `value` to `facet`, or removes it when already selected. Returns whether the value is
	/// selected afterwards.
	pub fn toggle_facet(&mut self, facet: &str, value: &str) -> bool {
		let values = self.facets.entry(facet.to_string()).or_default();
		let selected = if values.remove(value) {
			false
		} else {
			values.insert(value.to_string());

			true
		};

		if values.is_empty() {
			self.facets.remove(facet);
		}

		selected
	}

	pub fn is_selected(&self, facet: &str, value: &str) -> bool {
		self.facets.get(facet).map(|values| values.contains(value)).unwrap_or(false)
	}
}

pub fn facet_param(name: &str) -> String {
	format!("{FACET_PARAM_PREFIX}{name}")
}

pub fn encode_facet_values(values: &BTreeSet<String>) -> String {
	let mut encoded = String::new();

	for (index, value) in values.iter().enumerate() {
		if index > 0 {
			encoded.push(',');
		}

		for ch in value.chars() {
			if matches!(ch, '\\' | ',') {
				encoded.push('\\');
			}

			encoded.push(ch);
		}
	}

	encoded
}

/// Splits on unescaped commas. Blank values are dropped and a dangling `\` is ignored.
pub fn decode_facet_values(raw: &str) -> BTreeSet<String> {
	let mut values = BTreeSet::new();
	let mut current = String::new();
	let mut chars = raw.chars();

	while let Some(ch) = chars.next() {
		match ch {
			'\\' =>
				if let Some(escaped) = chars.next() {
					current.push(escaped);
				},
			',' => push_facet_value(&mut values, &mut current),
			_ => current.push(ch),
		}
	}

	push_facet_value(&mut values, &mut current);

	values
}

fn push_facet_value(values: &mut BTreeSet<String>, current: &mut String) {
	let value = current.trim();

	if !value.is_empty() {
		values.insert(value.to_string());
	}

	current.clear();
}
