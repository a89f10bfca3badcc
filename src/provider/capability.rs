//! Identity provider contract consumed by the surrounding authentication framework.

// self
use crate::{_prelude::*, auth::ProviderId, identity::CanonicalIdentity};

/// Boxed future returned by [`IdentityProvider::fetch_identity`].
pub type IdentityFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// An external identity provider selectable at login.
///
/// The descriptive accessors feed the login screen and account pages; only
/// [`fetch_identity`](Self::fetch_identity) talks to the network.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Stable provider identifier.
	fn id(&self) -> &ProviderId;

	/// Localized provider title.
	fn title(&self) -> String;

	/// Localized label of the persistent user id.
	fn persistent_id_name(&self) -> String;

	/// Localized tooltip describing the persistent user id.
	fn persistent_id_description(&self) -> String;

	/// URL prefix that turns a persistent id into a profile link, if the provider has one.
	fn persistent_id_url_prefix(&self) -> Option<&str> {
		None
	}

	/// Logo resource, if the provider ships one.
	fn logo(&self) -> Option<&str> {
		None
	}

	/// Whether the persistent id is shown to users as their identifier.
	fn is_display_identifier(&self) -> bool {
		false
	}

	/// Redeems an authorization response for a normalized identity.
	///
	/// `state` is the value echoed by the provider; validating it against the value issued with
	/// the authorize redirect is the caller's job.
	fn fetch_identity<'a>(
		&'a self,
		code: &'a str,
		state: &'a str,
		redirect_uri: &'a Url,
	) -> IdentityFuture<'a, CanonicalIdentity>;
}
