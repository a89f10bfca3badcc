//! Access tokens returned by the token exchange and reused for every provider call.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping bearer material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(<redacted>)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Bearer token obtained for a single authentication attempt.
///
/// The same token authenticates the user-info, group-membership, and organization-name calls.
/// Nothing in this crate persists it; [`UserRecord`](crate::identity::UserRecord) hands it back
/// to the caller together with the normalized identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer secret presented in `Authorization` headers.
	pub secret: TokenSecret,
	/// Token type reported by the token endpoint (usually `bearer`).
	pub token_type: String,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Scopes granted by the provider, if reported.
	pub scope: Vec<String>,
	/// Instant the token endpoint answered.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry derived from `expires_in`, if reported.
	pub expires_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Creates a bearer token issued now with no refresh token, scope, or expiry.
	pub fn bearer(secret: impl Into<String>) -> Self {
		Self {
			secret: TokenSecret::new(secret),
			token_type: "bearer".into(),
			refresh_token: None,
			scope: Vec::new(),
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, secret: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the expiry relative to [`issued_at`](Self::issued_at); an overflowing offset clears it.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_at = self.issued_at.checked_add(expires_in);

		self
	}

	/// Replaces the granted scopes.
	pub fn with_scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Bearer value for `Authorization` headers.
	pub fn bearer_token(&self) -> &str {
		self.secret.expose()
	}

	/// Returns true when an expiry is known and has passed at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| now >= expires_at)
	}
}
