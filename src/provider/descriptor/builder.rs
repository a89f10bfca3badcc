// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderId},
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A required endpoint was never set.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A preset endpoint failed to parse.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidUrl {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The organizations endpoint cannot take extra path segments.
	#[error("The organizations endpoint cannot be used as a base URL: {url}.")]
	OrganizationsNotBase {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A preset identifier failed validation.
	#[error("Descriptor identifier is invalid.")]
	InvalidId {
		/// Underlying validation failure.
		#[source]
		source: IdentifierError,
	},
	/// The secondary identifier scheme must be non-empty.
	#[error("Secondary identifier scheme cannot be empty.")]
	EmptySecondaryIdScheme,
	/// The organization group type must be non-empty.
	#[error("Organization group type cannot be empty.")]
	EmptyOrganizationGroupType,
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// User-info endpoint.
	pub user_info_endpoint: Option<Url>,
	/// Group-membership endpoint.
	pub groups_endpoint: Option<Url>,
	/// Organization lookup base.
	pub organizations_endpoint: Option<Url>,
	/// Scopes requested in the authorize URL.
	pub scopes: Vec<String>,
	/// Preferred client authentication method for the token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			user_info_endpoint: None,
			groups_endpoint: None,
			organizations_endpoint: None,
			scopes: Vec::new(),
			preferred_client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the user-info endpoint.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Sets the group-membership endpoint.
	pub fn groups_endpoint(mut self, url: Url) -> Self {
		self.groups_endpoint = Some(url);

		self
	}

	/// Sets the organization lookup base.
	pub fn organizations_endpoint(mut self, url: Url) -> Self {
		self.organizations_endpoint = Some(url);

		self
	}

	/// Adds scopes requested in the authorize URL.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let endpoints = ProviderEndpoints {
			authorization: require("authorization", self.authorization_endpoint)?,
			token: require("token", self.token_endpoint)?,
			user_info: require("user_info", self.user_info_endpoint)?,
			groups: require("groups", self.groups_endpoint)?,
			organizations: require("organizations", self.organizations_endpoint)?,
		};
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints,
			scopes: self.scopes,
			preferred_client_auth_method: self.preferred_client_auth_method,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	pub fn validate(&self) -> Result<(), ProviderDescriptorError> {
		let endpoints = &self.endpoints;

		validate_endpoint("authorization", &endpoints.authorization)?;
		validate_endpoint("token", &endpoints.token)?;
		validate_endpoint("user_info", &endpoints.user_info)?;
		validate_endpoint("groups", &endpoints.groups)?;
		validate_endpoint("organizations", &endpoints.organizations)?;

		if endpoints.organizations.cannot_be_a_base() {
			return Err(ProviderDescriptorError::OrganizationsNotBase {
				url: endpoints.organizations.to_string(),
			});
		}
		if self.quirks.secondary_id_scheme.is_empty() {
			return Err(ProviderDescriptorError::EmptySecondaryIdScheme);
		}
		if self.quirks.organization_group_type.is_empty() {
			return Err(ProviderDescriptorError::EmptyOrganizationGroupType);
		}
		if self.quirks.scope_delimiter.is_control() {
			return Err(ProviderDescriptorError::InvalidScopeDelimiter {
				delimiter: self.quirks.scope_delimiter,
			});
		}

		Ok(())
	}
}

fn require(endpoint: &'static str, url: Option<Url>) -> Result<Url, ProviderDescriptorError> {
	url.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
