use time::macros::datetime;

use scout_config::Search;
use scout_domain::{
	LocalCart, Location, LocationRequest, PageSizes, Pager, QueryState, SearchHistory,
	SearchHistoryEntry, corrected_offset, query,
};

fn history_entry(id: &str) -> SearchHistoryEntry {
	SearchHistoryEntry {
		id: id.to_string(),
		name: id.to_lowercase(),
		description: String::new(),
		kind: "organism".to_string(),
	}
}

#[test]
fn page_sizes_follow_config() {
	let cfg = Search { page_sizes: vec![25, 50], default_page_size: 50 };
	let sizes = PageSizes::from_config(&cfg);
	let location = Location::parse("/studies?limit=10");

	assert_eq!(QueryState::from_location(&location, &sizes).limit, 50);
	assert_eq!(sizes.resolve(Some("25")), 25);
}

#[test]
fn facet_links_compose_without_losing_state() {
	let current = Location::parse("/studies?facet.organism=human&offset=20");
	let link = LocationRequest::new().set(query::facet_param("platform"), "ILLUMINA");
	let merged = current.merge(&link);

	assert_eq!(merged.param("facet.organism"), Some("human"));
	assert_eq!(merged.param("facet.platform"), Some("ILLUMINA"));
	assert_eq!(merged.param("offset"), Some("20"));
	assert_eq!(merged.merge(&LocationRequest::new()), merged);
}

#[test]
fn offset_only_change_keeps_facets() {
	let sizes = PageSizes::default();
	let current = Location::parse("/studies?q=liver&facet.organism=human&facet.platform=PACBIO");
	let before = QueryState::from_location(&current, &sizes);
	let next = current.merge(&LocationRequest::new().set(query::OFFSET_PARAM, "10"));
	let after = QueryState::from_location(&next, &sizes);

	assert_eq!(after.facets, before.facets);
	assert_eq!(after.search_text, before.search_text);
	assert_eq!(after.offset, 10);
}

#[test]
fn misaligned_offset_is_read_as_found() {
	let sizes = PageSizes::default();
	let state = QueryState::from_location(&Location::parse("/studies?offset=7"), &sizes);

	assert_eq!(state.offset, 7);
	assert_eq!(corrected_offset(state.offset, state.limit), 0);
}

#[test]
fn last_page_is_aligned_to_limit() {
	assert_eq!(Pager::new(23, 10, 25).last(), 20);
}

#[test]
fn cart_membership_round_trip() {
	let mut cart = LocalCart::default();
	let first = datetime!(2024-05-01 08:00 UTC);
	let second = datetime!(2024-05-02 08:00 UTC);

	cart.add("SRP9", first);
	cart.remove("SRP9");

	assert!(!cart.contains("SRP9"));

	cart.add("SRP9", second);

	assert_eq!(cart.get("SRP9").map(|entry| entry.added_at), Some(second));
}

#[test]
fn ranked_history_orders_ascending() {
	let mut history = SearchHistory::default();

	for id in ["A", "B", "A", "C", "A"] {
		history.record(history_entry(id), 100);
	}

	let ids: Vec<String> = history.rank().into_iter().map(|row| row.entry.id).collect();

	assert_eq!(ids, vec!["B", "C", "A"]);
	assert_eq!(history.most_relevant(1)[0].weight, 7);
}
