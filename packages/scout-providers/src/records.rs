//! HTTP client for the record-storage service.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url, header::HeaderMap};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use scout_domain::{
	CartReceipt, CreateCartRequest, FeedbackSubmission, SamplePage, SharedCart, Study, StudyPage,
	StudyQuery, TermMatch,
};

use crate::{Error, Result};

#[derive(Deserialize)]
struct TermsResponse {
	matches: Vec<TermMatch>,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
	ids: &'a [String],
}

#[derive(Deserialize)]
struct BatchResponse {
	studies: Vec<Study>,
}

#[derive(Debug, Clone)]
pub struct HttpRecordStorage {
	client: Client,
	api_base: Url,
	headers: HeaderMap,
	max_retries: u32,
	retry_backoff: Duration,
}
impl HttpRecordStorage {
	pub fn new(cfg: &scout_config::RecordStorage) -> Result<Self> {
		let api_base = Url::parse(&cfg.api_base)?;

		if api_base.cannot_be_a_base() {
			return Err(Error::InvalidConfig {
				message: format!("record_storage.api_base {} cannot carry a path.", cfg.api_base),
			});
		}

		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			client,
			api_base,
			headers: crate::default_headers(&cfg.default_headers)?,
			max_retries: cfg.max_retries,
			retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
		})
	}

	pub async fn search_terms(&self, text: &str) -> Result<Vec<TermMatch>> {
		let url = self.endpoint(&["terms"])?;
		let res = self.send("terms", |client| client.get(url.clone()).query(&[("q", text)])).await?;
		let body: TermsResponse = decode("terms", res).await?;

		ensure_ids("terms", body.matches.iter().map(|term| term.id.as_str()))?;

		Ok(body.matches)
	}

	pub async fn search_studies(&self, query: &StudyQuery) -> Result<StudyPage> {
		let url = self.endpoint(&["studies"])?;
		let pairs = query.to_pairs();
		let res = self.send("studies", |client| client.get(url.clone()).query(&pairs)).await?;
		let page: StudyPage = decode("studies", res).await?;

		ensure_ids("studies", page.items.iter().map(|study| study.id.as_str()))?;

		Ok(page)
	}

	/// Studies for `ids`, in whatever order the service returns them.
	pub async fn lookup_studies(&self, ids: &[String]) -> Result<Vec<Study>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let url = self.endpoint(&["studies", "batch"])?;
		let body = BatchRequest { ids };
		let res =
			self.send("studies.batch", |client| client.post(url.clone()).json(&body)).await?;
		let body: BatchResponse = decode("studies.batch", res).await?;

		ensure_ids("studies.batch", body.studies.iter().map(|study| study.id.as_str()))?;

		Ok(body.studies)
	}

	pub async fn list_samples(
		&self,
		study_id: &str,
		offset: u64,
		limit: u64,
	) -> Result<SamplePage> {
		let url = self.endpoint(&["studies", study_id, "samples"])?;
		let res = self
			.send("samples", |client| {
				client.get(url.clone()).query(&[("offset", offset), ("limit", limit)])
			})
			.await?;
		let page: SamplePage = decode("samples", res).await?;

		ensure_ids("samples", page.items.iter().map(|sample| sample.id.as_str()))?;

		Ok(page)
	}

	pub async fn submit_feedback(&self, submission: &FeedbackSubmission) -> Result<()> {
		let url = self.endpoint(&["feedback"])?;

		self.send("feedback", |client| client.post(url.clone()).json(submission)).await?;

		Ok(())
	}

	pub async fn create_cart(&self, request: &CreateCartRequest) -> Result<CartReceipt> {
		let url = self.endpoint(&["carts"])?;
		let res = self.send("carts.create", |client| client.post(url.clone()).json(request)).await?;
		let receipt: CartReceipt = decode("carts.create", res).await?;

		ensure_ids("carts.create", [receipt.id.as_str()])?;

		Ok(receipt)
	}

	/// `None` when the service does not know `id`.
	pub async fn get_cart(&self, id: &str) -> Result<Option<SharedCart>> {
		let url = self.endpoint(&["carts", id])?;
		let res = match self.send("carts.get", |client| client.get(url.clone())).await {
			Ok(res) => res,
			Err(Error::Status { status: 404, .. }) => return Ok(None),
			Err(err) => return Err(err),
		};
		let cart: SharedCart = decode("carts.get", res).await?;

		if cart.id != id {
			return Err(Error::InvalidResponse {
				message: format!("carts.get returned cart {} for {id}.", cart.id),
			});
		}

		Ok(Some(cart))
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.api_base.clone();

		url.path_segments_mut()
			.map_err(|()| Error::InvalidConfig {
				message: "record_storage.api_base cannot carry a path.".to_string(),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	/// Sends the request built by `build`, retrying transport errors and 5xx responses up to
	/// `max_retries` times with a linear backoff.
	async fn send<F>(&self, endpoint: &'static str, build: F) -> Result<Response>
	where
		F: Fn(&Client) -> RequestBuilder,
	{
		let mut attempt = 0_u32;

		loop {
			tracing::debug!(endpoint, attempt, "Sending record storage request.");

			let err = match build(&self.client).headers(self.headers.clone()).send().await {
				Ok(res) if res.status().is_success() => return Ok(res),
				Ok(res) => {
					let status = res.status().as_u16();
					let body = res.text().await.unwrap_or_default();

					Error::Status { status, body }
				},
				Err(err) => Error::Reqwest(err),
			};

			if attempt >= self.max_retries || !err.is_retryable() {
				return Err(err);
			}

			attempt += 1;

			let delay = self.retry_backoff * attempt;

			tracing::warn!(
				endpoint,
				attempt,
				delay_ms = delay.as_millis() as u64,
				error = %err,
				"Retrying record storage request."
			);

			tokio::time::sleep(delay).await;
		}
	}
}

async fn decode<T>(endpoint: &str, res: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let bytes = res.bytes().await?;

	serde_json::from_slice(&bytes).map_err(|err| Error::InvalidResponse {
		message: format!("{endpoint} response has an unexpected shape: {err}."),
	})
}

fn ensure_ids<'a, I>(endpoint: &str, ids: I) -> Result<()>
where
	I: IntoIterator<Item = &'a str>,
{
	if ids.into_iter().any(|id| id.trim().is_empty()) {
		return Err(Error::InvalidResponse {
			message: format!("{endpoint} response contains a record without an id."),
		});
	}

	Ok(())
}
