//! Organization affiliation resolution from group membership.
//!
//! Every failure in here degrades: an unreachable groups endpoint, a non-200 status, or a body
//! that is not a JSON array yields an empty affiliation, and a failed organization-name lookup
//! falls back to the group's legal name. Nothing on this path can fail an authentication attempt.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	http::{GetRequest, ProviderHttpClient},
	obs,
	provider::{ProviderDescriptor, ProviderEndpoints},
};

/// One entry of the group-membership payload.
///
/// Fields that are missing, `null`, or not strings read as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupEntry {
	/// Group identifier (`fc:org:uit.no` for organizations).
	pub id: String,
	/// Group type (`fc:org`, `fc:adhoc`, ...).
	pub kind: String,
	/// Registered legal name of the organization.
	pub legal_name: String,
	/// Display name shown by the provider.
	pub display_name: String,
}
impl GroupEntry {
	/// Reads an entry out of one element of the group array.
	pub fn from_value(value: &Value) -> Self {
		Self {
			id: string_field(value, "id").to_owned(),
			kind: string_field(value, "type").to_owned(),
			legal_name: string_field(value, "eduOrgLegalName").to_owned(),
			display_name: string_field(value, "displayName").to_owned(),
		}
	}
}

fn string_field<'a>(value: &'a Value, key: &str) -> &'a str {
	value.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Returns the first group whose `type` equals `organization_type`.
///
/// Entries are inspected in order and only up to the match, so whatever follows the
/// organization group is never read.
pub fn select_organization(groups: &[Value], organization_type: &str) -> Option<GroupEntry> {
	groups
		.iter()
		.find(|group| string_field(group, "type") == organization_type)
		.map(GroupEntry::from_value)
}

/// Resolves the display affiliation of an authenticated user.
#[derive(Clone)]
pub struct AffiliationResolver {
	endpoints: ProviderEndpoints,
	organization_type: String,
	language: String,
	http_client: Arc<dyn ProviderHttpClient>,
}
impl AffiliationResolver {
	/// Creates a resolver bound to the descriptor's group and organization endpoints.
	pub fn new(descriptor: &ProviderDescriptor, http_client: Arc<dyn ProviderHttpClient>) -> Self {
		Self {
			endpoints: descriptor.endpoints.clone(),
			organization_type: descriptor.quirks.organization_group_type.clone(),
			language: descriptor.quirks.organization_name_language.clone(),
			http_client,
		}
	}

	/// Returns the affiliation for the token's owner, or an empty string.
	///
	/// The first organization group wins. Its localized name is preferred; an empty or failed
	/// lookup falls back to `eduOrgLegalName`. The token authenticates the group listing only;
	/// the organization lookup is a public call and carries no credentials.
	pub async fn resolve(&self, token: &AccessToken) -> String {
		let Some(organization) = self.first_organization(token).await else {
			return String::new();
		};

		match self.english_name(&organization.id).await {
			Some(name) if !name.is_empty() => name,
			_ => organization.legal_name,
		}
	}

	async fn first_organization(&self, token: &AccessToken) -> Option<GroupEntry> {
		let request = GetRequest::new(self.endpoints.groups.clone()).bearer(token.secret.clone());
		let body = self.fetch("groups", request).await?;
		let groups = match serde_json::from_slice::<Vec<Value>>(&body) {
			Ok(groups) => groups,
			Err(e) => {
				obs::degraded("groups", e);

				return None;
			},
		};

		select_organization(&groups, &self.organization_type)
	}

	async fn english_name(&self, organization_id: &str) -> Option<String> {
		if organization_id.is_empty() {
			obs::degraded("organization", "organization group has no id");

			return None;
		}

		let Some(url) = self.endpoints.organization(organization_id) else {
			obs::degraded("organization", "organizations endpoint cannot take path segments");

			return None;
		};
		let request = GetRequest::new(url).header("Accept-Language", self.language.as_str());
		let body = self.fetch("organization", request).await?;

		match serde_json::from_slice::<Value>(&body) {
			Ok(org) => Some(string_field(&org, "name").to_owned()),
			Err(e) => {
				obs::degraded("organization", e);

				None
			},
		}
	}

	async fn fetch(&self, stage: &'static str, request: GetRequest) -> Option<Vec<u8>> {
		let response = match self.http_client.get(request).await {
			Ok(response) => response,
			Err(e) => {
				obs::degraded(stage, e);

				return None;
			},
		};
		let status = response.status;

		if !response.is_ok() {
			obs::degraded(stage, format_args!("HTTP {status}"));

			return None;
		}

		match response.into_body() {
			Ok(body) => {
				obs::response_received(stage, status, body.len());

				Some(body)
			},
			Err(e) => {
				obs::degraded(stage, e);

				None
			},
		}
	}
}
impl Debug for AffiliationResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AffiliationResolver")
			.field("groups", &self.endpoints.groups.as_str())
			.field("organizations", &self.endpoints.organizations.as_str())
			.field("organization_type", &self.organization_type)
			.field("language", &self.language)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::io::{Error as IoError, ErrorKind};
	// self
	use super::*;
	use crate::{
		error::TransportError,
		http::{BodyReadError, HttpFuture, ProviderResponse},
	};

	type Scripted = Result<ProviderResponse, TransportError>;
	type Handler = Box<dyn Fn(&GetRequest) -> Scripted + Send + Sync>;

	struct ScriptedClient {
		handler: Handler,
		seen: Mutex<Vec<GetRequest>>,
	}
	impl ScriptedClient {
		fn new<F>(handler: F) -> Arc<Self>
		where
			F: 'static + Fn(&GetRequest) -> Scripted + Send + Sync,
		{
			Arc::new(Self { handler: Box::new(handler), seen: Mutex::new(Vec::new()) })
		}

		fn paths(&self) -> Vec<String> {
			self.seen.lock().iter().map(|request| request.url.path().to_owned()).collect()
		}
	}
	impl ProviderHttpClient for ScriptedClient {
		fn get(&self, request: GetRequest) -> HttpFuture<'_, ProviderResponse> {
			let result = (self.handler)(&request);

			self.seen.lock().push(request);

			Box::pin(async move { result })
		}
	}

	fn resolver(client: Arc<ScriptedClient>) -> AffiliationResolver {
		let descriptor =
			ProviderDescriptor::dataporten().expect("Dataporten preset should validate.");

		AffiliationResolver::new(&descriptor, client)
	}

	fn groups_body() -> Vec<u8> {
		serde_json::json!([
			{ "id": "fc:adhoc:1", "type": "fc:adhoc", "displayName": "Book club" },
			{
				"id": "fc:org:uit.no",
				"type": "fc:org",
				"displayName": "UiT",
				"eduOrgLegalName": "UiT Norges arktiske universitet"
			},
			{ "id": "fc:org:ntnu.no", "type": "fc:org", "eduOrgLegalName": "NTNU" }
		])
		.to_string()
		.into_bytes()
	}

	fn is_groups(request: &GetRequest) -> bool {
		request.url.path() == "/groups/me/groups"
	}

	#[tokio::test]
	async fn english_name_wins_over_legal_name() {
		let client = ScriptedClient::new(|request| {
			if is_groups(request) {
				return Ok(ProviderResponse::new(200, groups_body()));
			}

			assert_eq!(request.url.as_str(), "https://api.dataporten.no/orgs/fc:org:uit.no");
			assert_eq!(request.headers, vec![("Accept-Language".to_owned(), "en-US".to_owned())]);

			Ok(ProviderResponse::new(200, br#"{"name":"UiT The Arctic University of Norway"}"#))
		});
		let token = AccessToken::bearer("access");
		let affiliation = resolver(client.clone()).resolve(&token).await;

		assert_eq!(affiliation, "UiT The Arctic University of Norway");
		assert_eq!(client.paths(), vec!["/groups/me/groups", "/orgs/fc:org:uit.no"]);

		let seen = client.seen.lock();

		assert_eq!(seen[0].bearer.as_ref().map(|secret| secret.expose()), Some("access"));
		assert!(seen[1].bearer.is_none(), "Organization lookup must not carry the token.");
	}

	#[tokio::test]
	async fn failed_or_empty_name_lookup_falls_back_to_legal_name() {
		let responses: [fn() -> Scripted; 6] = [
			|| Ok(ProviderResponse::new(404, b"not found".to_vec())),
			|| Ok(ProviderResponse::new(200, br#"{"name":""}"#.to_vec())),
			|| Ok(ProviderResponse::new(200, br#"{"name":null}"#.to_vec())),
			|| Ok(ProviderResponse::new(200, b"<html>".to_vec())),
			|| {
				Ok(ProviderResponse::unreadable(
					200,
					BodyReadError::new(IoError::new(ErrorKind::UnexpectedEof, "eof")),
				))
			},
			|| Err(TransportError::network(IoError::new(ErrorKind::ConnectionReset, "reset"))),
		];

		for response in responses {
			let client = ScriptedClient::new(move |request| {
				if is_groups(request) {
					Ok(ProviderResponse::new(200, groups_body()))
				} else {
					response()
				}
			});
			let affiliation = resolver(client).resolve(&AccessToken::bearer("access")).await;

			assert_eq!(affiliation, "UiT Norges arktiske universitet");
		}
	}

	#[tokio::test]
	async fn missing_organization_yields_empty_affiliation() {
		let client = ScriptedClient::new(|_| {
			Ok(ProviderResponse::new(200, br#"[{"id":"fc:adhoc:1","type":"fc:adhoc"}]"#))
		});
		let affiliation = resolver(client.clone()).resolve(&AccessToken::bearer("access")).await;

		assert_eq!(affiliation, "");
		assert_eq!(client.paths(), vec!["/groups/me/groups"]);
	}

	#[tokio::test]
	async fn group_failures_yield_empty_affiliation() {
		let responses: [fn() -> Scripted; 4] = [
			|| Ok(ProviderResponse::new(403, b"forbidden".to_vec())),
			|| Ok(ProviderResponse::new(200, b"{\"not\":\"an array\"}".to_vec())),
			|| Ok(ProviderResponse::new(200, b"[]".to_vec())),
			|| Err(TransportError::network(IoError::new(ErrorKind::TimedOut, "timeout"))),
		];

		for response in responses {
			let client = ScriptedClient::new(move |_| response());
			let affiliation = resolver(client.clone()).resolve(&AccessToken::bearer("access")).await;

			assert_eq!(affiliation, "");
			assert_eq!(client.paths().len(), 1);
		}
	}

	#[tokio::test]
	async fn organization_without_id_skips_the_name_lookup() {
		let client = ScriptedClient::new(|_| {
			Ok(ProviderResponse::new(200, br#"[{"id":null,"type":"fc:org","eduOrgLegalName":"Acme"}]"#))
		});
		let affiliation = resolver(client.clone()).resolve(&AccessToken::bearer("access")).await;

		assert_eq!(affiliation, "Acme");
		assert_eq!(client.paths().len(), 1);
	}

	#[tokio::test]
	async fn malformed_entries_after_the_organization_are_ignored() {
		let client = ScriptedClient::new(|request| {
			if is_groups(request) {
				let body = serde_json::json!([
					{ "id": "fc:org:uit.no", "type": "fc:org", "eduOrgLegalName": "UiT" },
					{ "id": "fc:adhoc:1", "type": "fc:adhoc", "displayName": { "nb": "Lesesirkel" } },
					42
				]);

				return Ok(ProviderResponse::new(200, body.to_string().into_bytes()));
			}

			Ok(ProviderResponse::new(503, b"unavailable".to_vec()))
		});
		let affiliation = resolver(client.clone()).resolve(&AccessToken::bearer("access")).await;

		assert_eq!(affiliation, "UiT");
		assert_eq!(client.paths(), vec!["/groups/me/groups", "/orgs/fc:org:uit.no"]);
	}

	#[tokio::test]
	async fn mistyped_group_fields_read_as_empty() {
		let client = ScriptedClient::new(|request| {
			if is_groups(request) {
				let body = serde_json::json!([
					"fc:org",
					{ "id": "fc:unit:1", "type": ["fc:org"], "eduOrgLegalName": "Unit" },
					{ "id": 7, "type": "fc:org", "eduOrgLegalName": "Acme" }
				]);

				return Ok(ProviderResponse::new(200, body.to_string().into_bytes()));
			}

			Ok(ProviderResponse::new(200, br#"{"name":"Unreachable"}"#.to_vec()))
		});
		let affiliation = resolver(client.clone()).resolve(&AccessToken::bearer("access")).await;

		assert_eq!(affiliation, "Acme");
		assert_eq!(client.paths(), vec!["/groups/me/groups"]);
	}

	#[test]
	fn selection_picks_the_first_matching_type() {
		let groups: Vec<Value> =
			serde_json::from_slice(&groups_body()).expect("Group fixture should parse.");
		let selected =
			select_organization(&groups, "fc:org").expect("An organization should be selected.");

		assert_eq!(selected.id, "fc:org:uit.no");
		assert_eq!(selected.legal_name, "UiT Norges arktiske universitet");
		assert_eq!(selected.display_name, "UiT");
		assert_eq!(GroupEntry::from_value(&groups[0]).legal_name, "");
		assert!(select_organization(&groups, "fc:unit").is_none());
	}
}
