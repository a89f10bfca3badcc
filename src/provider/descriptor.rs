//! Provider descriptor data structures shared by the token exchange and the identity pipeline.
//!
//! A descriptor is the crate's configuration surface: it names the provider, lists the five
//! HTTPS endpoints an authentication attempt touches, and carries the quirks that steer
//! normalization. Descriptors are serde-friendly so they can be loaded from configuration files.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Identifier of the Dataporten provider.
pub const DATAPORTEN_PROVIDER_ID: &str = "dataporten";

const DATAPORTEN_AUTHORIZATION: &str = "https://auth.dataporten.no/oauth/authorization";
const DATAPORTEN_TOKEN: &str = "https://auth.dataporten.no/oauth/token";
const DATAPORTEN_USER_INFO: &str = "https://auth.dataporten.no/userinfo";
const DATAPORTEN_GROUPS: &str = "https://groups-api.dataporten.no/groups/me/groups";
const DATAPORTEN_ORGANIZATIONS: &str = "https://api.dataporten.no/orgs/";

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// Public clients that send no secret.
	None,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// User-info endpoint returning the `user` object.
	pub user_info: Url,
	/// Group-membership endpoint for the authenticated user.
	pub groups: Url,
	/// Base of the organization lookup; the organization id is appended as a path segment.
	pub organizations: Url,
}
impl ProviderEndpoints {
	/// Resolves the lookup URL for `organization_id` (e.g. `fc:org:uit.no`).
	///
	/// The id is appended as one percent-encoded path segment, so ids containing `/` cannot
	/// escape the organizations base.
	pub fn organization(&self, organization_id: &str) -> Option<Url> {
		let mut url = self.organizations.clone();

		url.path_segments_mut().ok()?.pop_if_empty().push(organization_id);

		Some(url)
	}
}

/// Immutable provider descriptor consumed by the token exchange and the identity pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scopes requested in the authorize URL; empty means the client registration decides.
	#[serde(default)]
	pub scopes: Vec<String>,
	/// Preferred client authentication mechanism.
	#[serde(default)]
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	#[serde(default)]
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Descriptor for the production Dataporten (Feide) endpoints.
	pub fn dataporten() -> Result<Self, ProviderDescriptorError> {
		let id = ProviderId::new(DATAPORTEN_PROVIDER_ID)
			.map_err(|source| ProviderDescriptorError::InvalidId { source })?;

		Self::builder(id)
			.authorization_endpoint(parse_endpoint("authorization", DATAPORTEN_AUTHORIZATION)?)
			.token_endpoint(parse_endpoint("token", DATAPORTEN_TOKEN)?)
			.user_info_endpoint(parse_endpoint("user_info", DATAPORTEN_USER_INFO)?)
			.groups_endpoint(parse_endpoint("groups", DATAPORTEN_GROUPS)?)
			.organizations_endpoint(parse_endpoint("organizations", DATAPORTEN_ORGANIZATIONS)?)
			.build()
	}

	/// Joins the configured scopes with the quirk delimiter, or `None` when no scope is set.
	pub fn scope_param(&self) -> Option<String> {
		if self.scopes.is_empty() {
			return None;
		}

		let mut buf = [0; 4];
		let delimiter: &str = self.quirks.scope_delimiter.encode_utf8(&mut buf);

		Some(self.scopes.join(delimiter))
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidUrl { endpoint, source })
}
