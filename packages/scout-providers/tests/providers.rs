use std::{
	collections::HashMap,
	future::IntoFuture,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::IntoResponse,
	routing,
};
use reqwest::header::{ACCEPT, HeaderName};
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use scout_config::RecordStorage;
use scout_domain::{CreateCartRequest, QueryState, StudyQuery};
use scout_providers::{Error, HttpRecordStorage};

async fn start_server(app: Router) -> (String, Sender<()>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind record server.");
	let addr = listener.local_addr().expect("Failed to read record server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

fn config(api_base: &str, max_retries: u32) -> RecordStorage {
	RecordStorage {
		api_base: api_base.to_string(),
		timeout_ms: 2_000,
		max_retries,
		retry_backoff_ms: 1,
		default_headers: Map::new(),
	}
}

async fn flaky_terms(State(calls): State<Arc<AtomicUsize>>) -> impl IntoResponse {
	if calls.fetch_add(1, Ordering::SeqCst) == 0 {
		return StatusCode::SERVICE_UNAVAILABLE.into_response();
	}

	Json(serde_json::json!({
		"matches": [
			{ "id": "T1", "name": "liver", "type": "tissue", "score": 0.9 }
		]
	}))
	.into_response()
}

async fn rejecting_carts(State(calls): State<Arc<AtomicUsize>>) -> impl IntoResponse {
	calls.fetch_add(1, Ordering::SeqCst);

	(StatusCode::BAD_REQUEST, "cart name is required").into_response()
}

async fn echo_studies(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
	let facet = params.get("facet.platform").cloned().unwrap_or_default();
	let limit = params.get("limit").and_then(|raw| raw.parse::<u64>().ok()).unwrap_or(0);

	Json(serde_json::json!({
		"items": [{ "id": "SRP1", "title": facet }],
		"total": limit,
	}))
}

async fn malformed_samples(Path(id): Path<String>) -> impl IntoResponse {
	Json(serde_json::json!({ "items": id, "total": "many" }))
}

async fn known_cart(Path(id): Path<String>) -> impl IntoResponse {
	if id != "c1" {
		return StatusCode::NOT_FOUND.into_response();
	}

	Json(serde_json::json!({
		"id": "c1",
		"name": "Liver",
		"created_at": "2024-01-01T00:00:00Z",
		"studies": [{ "id": "SRP1", "added_at": "2024-01-01T00:00:00Z" }]
	}))
	.into_response()
}

#[test]
fn builds_default_headers() {
	let mut extra = Map::new();

	extra.insert("x-client".to_string(), Value::String("scout".to_string()));

	let headers = scout_providers::default_headers(&extra).expect("Failed to build headers.");

	assert_eq!(headers.get(ACCEPT).expect("Missing accept header."), "application/json");
	assert_eq!(
		headers.get(HeaderName::from_static("x-client")).expect("Missing custom header."),
		"scout"
	);
}

#[test]
fn non_string_headers_are_rejected() {
	let mut extra = Map::new();

	extra.insert("x-retries".to_string(), Value::from(3));

	assert!(matches!(
		scout_providers::default_headers(&extra),
		Err(Error::InvalidConfig { .. })
	));
}

#[tokio::test]
async fn server_errors_are_retried() {
	let calls = Arc::new(AtomicUsize::new(0));
	let app = Router::new().route("/terms", routing::get(flaky_terms)).with_state(calls.clone());
	let (api_base, shutdown) = start_server(app).await;
	let records = HttpRecordStorage::new(&config(&api_base, 2)).expect("Client must build.");
	let matches = records.search_terms("liver").await.expect("Retry must recover.");

	assert_eq!(calls.load(Ordering::SeqCst), 2);
	assert_eq!(matches.len(), 1);
	assert_eq!(matches[0].kind, "tissue");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn client_errors_are_terminal() {
	let calls = Arc::new(AtomicUsize::new(0));
	let app =
		Router::new().route("/carts", routing::post(rejecting_carts)).with_state(calls.clone());
	let (api_base, shutdown) = start_server(app).await;
	let records = HttpRecordStorage::new(&config(&api_base, 3)).expect("Client must build.");
	let request = CreateCartRequest { name: String::new(), studies: Vec::new() };
	let err = records.create_cart(&request).await.expect_err("A 400 must fail.");

	assert!(matches!(err, Error::Status { status: 400, .. }));
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn study_search_sends_location_encoded_params() {
	let app = Router::new().route("/studies", routing::get(echo_studies));
	let (api_base, shutdown) = start_server(app).await;
	let records = HttpRecordStorage::new(&config(&api_base, 0)).expect("Client must build.");
	let mut state = QueryState::new(20);

	state.toggle_facet("platform", "ILLUMINA");

	let page =
		records.search_studies(&StudyQuery::from(&state)).await.expect("Search must succeed.");

	assert_eq!(page.total, 20);
	assert_eq!(page.items[0].title, "ILLUMINA");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn unexpected_shapes_are_invalid_responses() {
	let app = Router::new().route("/studies/{id}/samples", routing::get(malformed_samples));
	let (api_base, shutdown) = start_server(app).await;
	let records = HttpRecordStorage::new(&config(&api_base, 0)).expect("Client must build.");
	let err = records.list_samples("SRP1", 0, 10).await.expect_err("Shape must be rejected.");

	assert!(matches!(err, Error::InvalidResponse { .. }));

	let _ = shutdown.send(());
}

#[tokio::test]
async fn unknown_cart_is_none() {
	let app = Router::new().route("/carts/{id}", routing::get(known_cart));
	let (api_base, shutdown) = start_server(app).await;
	let records = HttpRecordStorage::new(&config(&api_base, 0)).expect("Client must build.");
	let found = records.get_cart("c1").await.expect("Lookup must succeed.");

	assert_eq!(found.map(|cart| cart.studies.len()), Some(1));
	assert!(records.get_cart("missing").await.expect("Lookup must succeed.").is_none());

	let _ = shutdown.send(());
}

#[tokio::test]
async fn empty_batch_skips_the_network() {
	let records =
		HttpRecordStorage::new(&config("http://127.0.0.1:9", 0)).expect("Client must build.");

	assert!(records.lookup_studies(&[]).await.expect("Empty lookup must succeed.").is_empty());
}
