//! Token exchange contract and its `oauth2`-backed implementation.
//!
//! The identity pipeline never speaks the OAuth 2.0 protocol itself. It consumes a
//! [`TokenExchange`] that turns an authorization code into an [`AccessToken`] and names the
//! user-info URL for that token. [`BasicTokenExchange`] is the stock implementation built on
//! the `oauth2` crate's `BasicClient` and the reqwest transport from [`crate::http`].

pub use oauth2;

// std
#[cfg(feature = "reqwest")] use std::borrow::Cow;
// crates.io
#[cfg(feature = "reqwest")]
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{_prelude::*, auth::AccessToken};
#[cfg(feature = "reqwest")]
use crate::{
	error::{ConfigError, TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{ClientAuthMethod, ProviderDescriptor},
};

#[cfg(feature = "reqwest")]
type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Boxed future returned by [`TokenExchange::exchange`].
pub type ExchangeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Exchanges an authorization code for an access token.
///
/// Implementations own every protocol concern (client authentication, PKCE, state checks).
/// Their errors reach the caller of
/// [`IdentityProvider::fetch_identity`](crate::provider::IdentityProvider::fetch_identity)
/// unchanged.
pub trait TokenExchange
where
	Self: Send + Sync,
{
	/// Redeems `code` for a token bound to `redirect_uri`.
	fn exchange<'a>(&'a self, code: &'a str, redirect_uri: &'a Url)
	-> ExchangeFuture<'a, AccessToken>;

	/// Resolves the user-info URL for `token`.
	///
	/// Providers that shard user info by token scope or region override this; the default
	/// returns the descriptor's endpoint untouched.
	fn user_info_endpoint(&self, token: &AccessToken, base: &Url) -> Url {
		let _ = token;

		base.clone()
	}
}

/// [`TokenExchange`] backed by `oauth2::basic::BasicClient` over reqwest.
#[cfg(feature = "reqwest")]
pub struct BasicTokenExchange {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	client_id: String,
	authorization_endpoint: Url,
	scope: Option<String>,
}
#[cfg(feature = "reqwest")]
impl BasicTokenExchange {
	/// Builds the exchange from the descriptor's authorization + token endpoints.
	///
	/// `client_secret` is ignored for [`ClientAuthMethod::None`].
	pub fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		match descriptor.preferred_client_auth_method {
			ClientAuthMethod::None => {},
			method => {
				if let Some(secret) = client_secret {
					oauth_client =
						oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
				}
				if method == ClientAuthMethod::ClientSecretPost {
					oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
				}
			},
		}

		Ok(Self {
			oauth_client,
			http_client,
			client_id: client_id.to_owned(),
			authorization_endpoint: descriptor.endpoints.authorization.clone(),
			scope: descriptor.scope_param(),
		})
	}

	/// Builds the authorize URL the end user is redirected to.
	///
	/// `state` is echoed verbatim; generating and checking it stays with the caller.
	pub fn authorization_url(&self, state: &str, redirect_uri: &Url) -> Url {
		let mut url = self.authorization_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", redirect_uri.as_str());

		if let Some(scope) = &self.scope {
			pairs.append_pair("scope", scope);
		}

		pairs.append_pair("state", state);

		drop(pairs);

		url
	}
}
#[cfg(feature = "reqwest")]
impl Debug for BasicTokenExchange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicTokenExchange")
			.field("client_id", &self.client_id)
			.field("authorization_endpoint", &self.authorization_endpoint.as_str())
			.field("scope", &self.scope)
			.finish()
	}
}
#[cfg(feature = "reqwest")]
impl TokenExchange for BasicTokenExchange {
	fn exchange<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: &'a Url,
	) -> ExchangeFuture<'a, AccessToken> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.instrumented(meta.clone());
			let redirect_url = RedirectUrl::new(redirect_uri.to_string())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;
			let response = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.set_redirect_uri(Cow::Owned(redirect_url))
				.request_async(&handle)
				.await
				.map_err(|err| map_request_error(meta.take(), err))?;

			map_token_response(response)
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_token_response(response: BasicTokenResponse) -> Result<AccessToken> {
	let mut token = AccessToken::bearer(response.access_token().secret().to_owned());

	token.token_type = response.token_type().as_ref().to_owned();

	if let Some(refresh) = response.refresh_token() {
		token = token.with_refresh_token(refresh.secret().to_owned());
	}
	if let Some(scopes) = response.scopes() {
		token = token.with_scope(scopes.iter().map(|scope| scope.as_str().to_owned()));
	}
	if let Some(expires_in) = response.expires_in() {
		let secs =
			i64::try_from(expires_in.as_secs()).map_err(|_| ConfigError::ExpiresInOutOfRange)?;
		let expires_at = token
			.issued_at
			.checked_add(Duration::seconds(secs))
			.ok_or(ConfigError::ExpiresInOutOfRange)?;

		token.expires_at = Some(expires_at);
	}

	Ok(token)
}

#[cfg(feature = "reqwest")]
fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let meta = meta.unwrap_or_default();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, &meta),
		RequestTokenError::Request(error) => map_transport_error(error, &meta),
		RequestTokenError::Parse(source, _body) =>
			TransientError::TokenResponseParse { source, status: meta.status }.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message,
			status: meta.status,
			retry_after: meta.retry_after,
		}
		.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_server_response_error(response: BasicErrorResponse, meta: &ResponseMetadata) -> Error {
	let code = response.error().as_ref().to_owned();
	let reason = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.clone(),
	};

	match code.as_str() {
		"invalid_grant" | "access_denied" => Error::InvalidGrant { reason },
		"invalid_client" | "unauthorized_client" => Error::InvalidClient { reason },
		_ => TransientError::TokenEndpoint {
			message: reason,
			status: meta.status,
			retry_after: meta.retry_after,
		}
		.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_transport_error(err: HttpClientError<ReqwestError>, meta: &ResponseMetadata) -> Error {
	match err {
		HttpClientError::Reqwest(inner) if inner.is_timeout() => TransientError::TokenEndpoint {
			message: "request timed out".into(),
			status: meta.status,
			retry_after: meta.retry_after,
		}
		.into(),
		HttpClientError::Reqwest(inner) if inner.is_builder() => ConfigError::from(*inner).into(),
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransientError::TokenEndpoint {
			message,
			status: meta.status,
			retry_after: meta.retry_after,
		}
		.into(),
		_ => TransientError::TokenEndpoint {
			message: "unrecognized HTTP client failure".into(),
			status: meta.status,
			retry_after: meta.retry_after,
		}
		.into(),
	}
}
