//! Crate-level error types shared by the token exchange, the provider façade, and the identity
//! parser.
//!
//! Only [`Error::Provider`] and [`Error::MalformedResponse`] are produced by the normalization
//! pipeline itself; every other variant originates from a collaborator (token exchange, HTTP
//! transport, configuration). Degraded-data conditions never surface here.

// self
use crate::{_prelude::*, auth::IdentifierError, provider::ProviderDescriptorError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// User-info endpoint answered with a non-200 status.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// User-info body lacks the fields required to identify the user.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure at the token endpoint.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider rejected the grant (e.g., bad or reused authorization code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
}

/// Non-200 answer from the provider's user-info endpoint.
///
/// The raw body is kept verbatim so callers can surface it for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message} (HTTP {http_status})")]
pub struct ProviderError {
	/// HTTP status returned by the provider.
	pub http_status: u16,
	/// Raw response body, decoded lossily as UTF-8.
	pub response_body: String,
	/// Fixed human-readable summary.
	pub message: String,
}
impl ProviderError {
	/// Message attached to every user-info failure.
	pub const USER_INFO_MESSAGE: &'static str = "Error getting the user info record.";

	/// Builds the error raised when the user-info endpoint answers with `http_status`.
	pub fn user_info(http_status: u16, response_body: impl Into<String>) -> Self {
		Self {
			http_status,
			response_body: response_body.into(),
			message: Self::USER_INFO_MESSAGE.into(),
		}
	}
}

/// User-info payload problems that make the attempt unusable.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// Body is not JSON or does not have the expected shape.
	#[error("User info response could not be parsed.")]
	InvalidJson {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Top-level `user` object is absent.
	#[error("User info response is missing the `user` object.")]
	MissingUser,
	/// `user.userid` is absent or empty.
	#[error("User info response is missing `user.userid`.")]
	MissingUserId,
	/// `user.userid` was rejected by identifier validation.
	#[error("User info response carries an invalid `user.userid`.")]
	InvalidUserId {
		/// Underlying validation failure.
		#[source]
		source: IdentifierError,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] ProviderDescriptorError),
	/// Descriptor endpoint cannot be handed to the OAuth client.
	#[error("Descriptor contains an invalid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Secondary identifier pattern failed to compile for the configured scheme.
	#[error("Secondary identifier pattern for scheme `{scheme}` is invalid.")]
	InvalidSecondaryIdPattern {
		/// Scheme the pattern was built for.
		scheme: String,
		/// Underlying regex failure.
		#[source]
		source: regex::Error,
	},
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants at the token endpoint.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO) while sending a request.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
