// self
use crate::_prelude::*;

/// Provider-specific conventions that steer identity normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Scheme prefix of the secondary identifier carrying `<local>@<domain>` (e.g. `feide`).
	pub secondary_id_scheme: String,
	/// Group `type` marking organization entries in the group-membership payload.
	pub organization_group_type: String,
	/// `Accept-Language` value used for the organization-name lookup.
	pub organization_name_language: String,
	/// Character used to join scopes in the authorize URL.
	pub scope_delimiter: char,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			secondary_id_scheme: "feide".into(),
			organization_group_type: "fc:org".into(),
			organization_name_language: "en-US".into(),
			scope_delimiter: ' ',
		}
	}
}
