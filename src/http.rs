//! Transport primitives for provider calls.
//!
//! [`ProviderHttpClient`] is the authenticated-GET capability the identity pipeline consumes:
//! user-info, group-membership, and organization-name lookups all go through it. A send
//! failure is a [`TransportError`], while a failure to read the body after the status line
//! arrived is kept inside [`ProviderResponse::body`] so each caller decides how to degrade.
//!
//! [`ResponseMetadata`] and [`ResponseMetadataSlot`] capture the status and retry hint of
//! token-endpoint responses for the `oauth2`-driven exchange in [`crate::oauth`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`ProviderHttpClient::get`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Authenticated GET capability used for every provider call after the token exchange.
///
/// Implementations must be `Send + Sync + 'static` so a single client can back many concurrent
/// authentication attempts behind an `Arc`. They must not retry or follow up on failures; the
/// identity pipeline treats each call as a single shot.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Issues the GET and returns the status plus the (possibly unreadable) body.
	fn get(&self, request: GetRequest) -> HttpFuture<'_, ProviderResponse>;
}

/// Outbound GET request description.
#[derive(Clone, Debug)]
pub struct GetRequest {
	/// Target URL.
	pub url: Url,
	/// Extra headers, sent in insertion order.
	pub headers: Vec<(String, String)>,
	/// Bearer secret for the `Authorization` header.
	pub bearer: Option<TokenSecret>,
}
impl GetRequest {
	/// Creates an unauthenticated GET for `url`.
	pub fn new(url: Url) -> Self {
		Self { url, headers: Vec::new(), bearer: None }
	}

	/// Attaches a bearer secret.
	pub fn bearer(mut self, secret: TokenSecret) -> Self {
		self.bearer = Some(secret);

		self
	}

	/// Appends a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}
}

/// Status line plus body of a provider response.
#[derive(Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body, or the failure raised while reading it.
	pub body: Result<Vec<u8>, BodyReadError>,
}
impl ProviderResponse {
	/// Builds a response whose body was read successfully.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: Ok(body.into()) }
	}

	/// Builds a response whose body could not be read.
	pub fn unreadable(status: u16, error: BodyReadError) -> Self {
		Self { status, body: Err(error) }
	}

	/// Returns true only for `200 OK`; other 2xx codes are not accepted by providers' clients.
	pub fn is_ok(&self) -> bool {
		self.status == 200
	}

	/// Consumes the response and returns the body result.
	pub fn into_body(self) -> Result<Vec<u8>, BodyReadError> {
		self.body
	}
}

/// Failure raised while reading a response body after the status line arrived.
#[derive(Debug, ThisError)]
#[error("Failed to read the provider response body.")]
pub struct BodyReadError {
	#[source]
	source: BoxError,
}
impl BodyReadError {
	/// Wraps the transport-specific read failure.
	pub fn new(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self { source: Box::new(src) }
	}
}

/// Captures metadata from the most recent token-endpoint response for error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] serving both the token exchange and provider GETs.
///
/// Configure any custom [`ReqwestClient`] to disable redirect following: token endpoints answer
/// directly, and the user-info status must be observed as sent by the provider.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds an `oauth2` transport handle that records token-endpoint metadata in `slot`.
	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle(Arc::new(InstrumentedHttpClient { client: self.0.clone(), slot }))
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	fn get(&self, request: GetRequest) -> HttpFuture<'_, ProviderResponse> {
		Box::pin(async move {
			let GetRequest { url, headers, bearer } = request;
			let mut builder = self.0.get(url);

			if let Some(secret) = &bearer {
				builder = builder.bearer_auth(secret.expose());
			}
			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();

			match response.bytes().await {
				Ok(bytes) => Ok(ProviderResponse::new(status, bytes.to_vec())),
				Err(e) => Ok(ProviderResponse::unreadable(status, BodyReadError::new(e))),
			}
		})
	}
}

#[cfg(feature = "reqwest")]
pub(crate) struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// `oauth2` transport handle produced by [`ReqwestHttpClient`] for token exchanges.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let inner = Arc::clone(&self.0);

		Box::pin(async move {
			inner.slot.take();

			let response =
				inner.client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			inner.slot.store(ResponseMetadata {
				status: Some(status.as_u16()),
				retry_after: parse_retry_after(&headers),
			});

			let mut converted =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<i64>() {
		return Some(Duration::seconds(secs)).filter(|delay| delay.is_positive());
	}

	let delta = OffsetDateTime::parse(raw, &Rfc2822).ok()? - OffsetDateTime::now_utc();

	delta.is_positive().then_some(delta)
}
