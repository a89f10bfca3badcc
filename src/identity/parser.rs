//! User-info parsing: raw provider JSON into a [`BaseIdentity`].

// crates.io
use regex::Regex;
use serde::Deserializer;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{PersistentUserId, ProviderId},
	error::{ConfigError, MalformedResponseError},
};

#[derive(Deserialize)]
struct RawUserInfo {
	#[serde(default)]
	user: Option<RawUser>,
}

#[derive(Deserialize)]
struct RawUser {
	#[serde(default)]
	userid: Option<String>,
	#[serde(default, deserialize_with = "first_string")]
	userid_sec: Option<String>,
	#[serde(default, deserialize_with = "string_or_empty")]
	name: String,
	#[serde(default, deserialize_with = "string_or_empty")]
	email: String,
}

// Anything but a JSON string reads as empty.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Value::deserialize(deserializer)?.as_str().unwrap_or_default().to_owned())
}

// First element of an array, when that element is a string.
fn first_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;

	Ok(value
		.as_array()
		.and_then(|values| values.first())
		.and_then(Value::as_str)
		.map(str::to_owned))
}

/// Fields extracted from the user-info payload before affiliation is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseIdentity {
	/// Provider that issued the payload.
	pub provider_id: ProviderId,
	/// Provider-scoped stable user id (`user.userid`).
	pub persistent_user_id: PersistentUserId,
	/// Local part of the first secondary identifier, or empty.
	pub username: String,
	/// First name-token of the display name (or the whole name).
	pub first_name: String,
	/// Last name-token of the display name, or empty.
	pub last_name: String,
	/// Email address, or empty.
	pub email: String,
	/// Domain label of the first secondary identifier, used when no group affiliation exists.
	pub domain_affiliation: String,
}

/// Compiled `^<scheme>:<local>@<domain>...$` matcher for secondary identifiers.
///
/// The local part is the shortest alphanumeric run before `@`; the domain is the alphanumeric
/// run right after it, so `feide:andreas@uninett.no` yields `andreas` and `uninett`.
#[derive(Clone, Debug)]
pub struct SecondaryIdPattern(Regex);
impl SecondaryIdPattern {
	/// Compiles the matcher for `scheme` (escaped, so `fc:x` stays literal).
	pub fn new(scheme: &str) -> Result<Self, ConfigError> {
		let pattern = format!(r"^{}:([A-Za-z0-9]+?)@([A-Za-z0-9]*).*$", regex::escape(scheme));

		Regex::new(&pattern).map(Self).map_err(|source| ConfigError::InvalidSecondaryIdPattern {
			scheme: scheme.to_owned(),
			source,
		})
	}
}

/// Username and domain pulled out of a secondary identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecondaryIdParts {
	/// Local part before `@`.
	pub username: String,
	/// Alphanumeric domain label after `@`.
	pub domain: String,
}

/// Splits `value` with `pattern`; a non-matching identifier yields empty parts.
pub fn decompose_secondary_id(pattern: &SecondaryIdPattern, value: &str) -> SecondaryIdParts {
	let Some(captures) = pattern.0.captures(value) else {
		return SecondaryIdParts::default();
	};
	let group = |idx| captures.get(idx).map_or("", |m| m.as_str()).to_owned();

	SecondaryIdParts { username: group(1), domain: group(2) }
}

/// Splits a display name on single spaces into `(first, last)`.
///
/// One token (or none) keeps the whole name as the first name. Two or more tokens keep the
/// first and last ones; middle names are dropped. Trailing empty tokens are ignored, so
/// `"Ada "` counts as a single token.
pub fn split_display_name(name: &str) -> (String, String) {
	let mut tokens = name.split(' ').collect::<Vec<_>>();

	while tokens.len() > 1 && tokens.last().is_some_and(|token| token.is_empty()) {
		tokens.pop();
	}

	match tokens.as_slice() {
		[first, .., last] => ((*first).to_owned(), (*last).to_owned()),
		_ => (name.to_owned(), String::new()),
	}
}

/// Parses user-info bodies for a single provider.
#[derive(Clone, Debug)]
pub struct IdentityParser {
	provider_id: ProviderId,
	pattern: SecondaryIdPattern,
}
impl IdentityParser {
	/// Creates a parser for `provider_id` whose secondary identifiers use `scheme`.
	pub fn new(provider_id: ProviderId, scheme: &str) -> Result<Self, ConfigError> {
		Ok(Self { provider_id, pattern: SecondaryIdPattern::new(scheme)? })
	}

	/// Extracts the base identity from a user-info body.
	///
	/// Only an unparsable body or a missing `user` / `user.userid` is an error; every other
	/// field that is absent or not a string degrades to an empty string.
	pub fn parse(&self, body: &[u8]) -> Result<BaseIdentity> {
		let deserializer = &mut serde_json::Deserializer::from_slice(body);
		let raw: RawUserInfo = serde_path_to_error::deserialize(deserializer)
			.map_err(|source| MalformedResponseError::InvalidJson { source })?;
		let user = raw.user.ok_or(MalformedResponseError::MissingUser)?;
		let userid = user
			.userid
			.filter(|userid| !userid.is_empty())
			.ok_or(MalformedResponseError::MissingUserId)?;
		let persistent_user_id = PersistentUserId::new(userid)
			.map_err(|source| MalformedResponseError::InvalidUserId { source })?;
		let parts = user
			.userid_sec
			.map(|value| decompose_secondary_id(&self.pattern, &value))
			.unwrap_or_default();
		let (first_name, last_name) = split_display_name(&user.name);

		Ok(BaseIdentity {
			provider_id: self.provider_id.clone(),
			persistent_user_id,
			username: parts.username,
			first_name,
			last_name,
			email: user.email,
			domain_affiliation: parts.domain,
		})
	}
}
