//! Canonical identity records handed back to callers.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, PersistentUserId, ProviderId},
	identity::BaseIdentity,
};

/// Provider-agnostic identity produced by a successful authentication attempt.
///
/// Text fields are never absent: anything the provider did not supply is an empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalIdentity {
	/// Provider that vouched for the user.
	pub provider_id: ProviderId,
	/// Stable provider-scoped user id.
	pub persistent_user_id: PersistentUserId,
	/// Local username.
	pub username: String,
	/// First name.
	pub first_name: String,
	/// Last name.
	pub last_name: String,
	/// Primary email address.
	pub email: String,
	/// Organization the user belongs to.
	pub affiliation: String,
	/// Position within the organization; this provider never reports one.
	pub position: String,
	/// Every known email address.
	pub emails: BTreeSet<String>,
}

/// Identity plus the token that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
	/// Normalized identity.
	pub identity: CanonicalIdentity,
	/// Access token obtained during the exchange.
	pub token: AccessToken,
}

/// Merges a parsed identity with the resolved group affiliation.
///
/// A non-empty `group_affiliation` wins over the domain label taken from the secondary
/// identifier.
pub fn assemble(base: &BaseIdentity, group_affiliation: &str) -> CanonicalIdentity {
	let affiliation = if group_affiliation.is_empty() {
		base.domain_affiliation.clone()
	} else {
		group_affiliation.to_owned()
	};
	let emails = if base.email.is_empty() {
		BTreeSet::new()
	} else {
		BTreeSet::from([base.email.clone()])
	};

	CanonicalIdentity {
		provider_id: base.provider_id.clone(),
		persistent_user_id: base.persistent_user_id.clone(),
		username: base.username.clone(),
		first_name: base.first_name.clone(),
		last_name: base.last_name.clone(),
		email: base.email.clone(),
		affiliation,
		position: String::new(),
		emails,
	}
}
