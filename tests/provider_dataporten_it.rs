// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_identity::{
	_preludet::*,
	auth::ProviderId,
	provider::{IdentityProvider, ProviderDescriptor},
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
const BEARER: &str = "Bearer access-it";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = ProviderId::new("dataporten")
		.expect("Provider identifier should be valid for Dataporten test.");
	let endpoint = |path: &str| {
		Url::parse(&server.url(path)).expect("Mock endpoint should parse successfully.")
	};

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(endpoint("/oauth/authorization"))
		.token_endpoint(endpoint("/oauth/token"))
		.user_info_endpoint(endpoint("/userinfo"))
		.groups_endpoint(endpoint("/groups/me/groups"))
		.organizations_endpoint(endpoint("/orgs/"))
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn redirect_uri() -> Url {
	Url::parse("https://app.example.com/callback").expect("Redirect URI should parse successfully.")
}

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-it\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await
}

async fn mock_user_info(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", BEARER);
			then.status(200).header("content-type", "application/json").json_body(json!({
				"user": {
					"userid": "76a7a061-3c55-430d-8ee0-6f82ec42501f",
					"userid_sec": ["feide:andreas@uninett.no"],
					"name": "Andreas \u{00C5}kre Solberg",
					"email": "andreas.solberg@uninett.no",
					"profilephoto": "p:a3019954-902f-45a3-b4ee-bca7b48ab507"
				},
				"audience": "e8160a77-58f8-4006-8ee5-ab64d17a5b1e"
			}));
		})
		.await
}

async fn mock_groups(server: &MockServer, groups: serde_json::Value) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/groups/me/groups").header("authorization", BEARER);
			then.status(200).header("content-type", "application/json").json_body(groups);
		})
		.await
}

fn uit_groups() -> serde_json::Value {
	json!([
		{ "id": "fc:adhoc:7f2b", "type": "fc:adhoc", "displayName": "Study group" },
		{
			"id": "fc:org:uit.no",
			"type": "fc:org",
			"displayName": "UiT",
			"eduOrgLegalName": "UiT Norges Arktiske Universitet"
		}
	])
}

#[tokio::test]
async fn organization_name_failure_falls_back_to_legal_name() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let token = mock_token(&server).await;
	let user_info = mock_user_info(&server).await;
	let groups = mock_groups(&server, uit_groups()).await;
	let organization = server
		.mock_async(|when, then| {
			when.method(GET).path("/orgs/fc:org:uit.no");
			then.status(500).body("upstream unavailable");
		})
		.await;
	let identity = provider
		.fetch_identity("valid-code", "state-it", &redirect_uri())
		.await
		.expect("Identity fetch should succeed.");

	token.assert_async().await;
	user_info.assert_async().await;
	groups.assert_async().await;
	organization.assert_async().await;

	assert_eq!(identity.provider_id.as_ref(), "dataporten");
	assert_eq!(&*identity.persistent_user_id, "76a7a061-3c55-430d-8ee0-6f82ec42501f");
	assert_eq!(identity.affiliation, "UiT Norges Arktiske Universitet");
	assert_eq!(identity.username, "andreas");
	assert_eq!(identity.first_name, "Andreas");
	assert_eq!(identity.last_name, "Solberg");
	assert_eq!(identity.email, "andreas.solberg@uninett.no");
	assert_eq!(identity.emails, BTreeSet::from(["andreas.solberg@uninett.no".to_owned()]));
	assert_eq!(identity.position, "");
}

#[tokio::test]
async fn organization_name_lookup_sends_language_without_token_and_wins() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let _token = mock_token(&server).await;
	let _user_info = mock_user_info(&server).await;
	let _groups = mock_groups(&server, uit_groups()).await;
	let organization = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/orgs/fc:org:uit.no")
				.header("accept-language", "en-US")
				.header_missing("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "name": "UiT The Arctic University of Norway" }));
		})
		.await;
	let record = provider
		.fetch_user_record("valid-code", "state-it", &redirect_uri())
		.await
		.expect("User record fetch should succeed.");

	organization.assert_calls_async(1).await;

	assert_eq!(record.identity.affiliation, "UiT The Arctic University of Norway");
	assert_eq!(record.token.bearer_token(), "access-it");
	assert!(record.token.expires_at.is_some());
}

#[tokio::test]
async fn forbidden_groups_fall_back_to_domain_label() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let _token = mock_token(&server).await;
	let _user_info = mock_user_info(&server).await;
	let groups = server
		.mock_async(|when, then| {
			when.method(GET).path("/groups/me/groups");
			then.status(403).body("{\"message\":\"Forbidden\"}");
		})
		.await;
	let identity = provider
		.fetch_identity("valid-code", "state-it", &redirect_uri())
		.await
		.expect("Identity fetch should succeed despite the group failure.");

	groups.assert_calls_async(1).await;

	assert_eq!(identity.affiliation, "uninett");
	assert_eq!(identity.username, "andreas");
}

#[tokio::test]
async fn missing_user_info_is_a_provider_error() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let _token = mock_token(&server).await;
	let user_info = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(404).body("no such user");
		})
		.await;
	let groups = mock_groups(&server, uit_groups()).await;
	let err = provider
		.fetch_identity("valid-code", "state-it", &redirect_uri())
		.await
		.expect_err("A 404 from user-info should fail the fetch.");

	user_info.assert_calls_async(1).await;
	groups.assert_calls_async(0).await;

	let Error::Provider(provider_err) = err else {
		panic!("Unexpected error variant: {err:?}.");
	};

	assert_eq!(provider_err.http_status, 404);
	assert_eq!(provider_err.response_body, "no such user");
	assert_eq!(provider_err.message, "Error getting the user info record.");
}

#[tokio::test]
async fn non_organization_groups_fall_back_to_domain_label() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let _token = mock_token(&server).await;
	let _user_info = mock_user_info(&server).await;
	let _groups = mock_groups(
		&server,
		json!([
			{ "id": "fc:org:uninett.no:unit:AVD-U2", "type": "fc:orgunit", "displayName": "Tjenester" },
			{ "id": "fc:org:uninett.no:unit:AVD-U3", "type": "fc:orgunit", "displayName": "Drift" }
		]),
	)
	.await;
	let identity = provider
		.fetch_identity("valid-code", "state-it", &redirect_uri())
		.await
		.expect("Identity fetch should succeed without an organization group.");

	assert_eq!(identity.affiliation, "uninett");
}

#[tokio::test]
async fn rejected_grant_skips_provider_calls() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"Code already redeemed\"}",
			);
		})
		.await;
	let user_info = mock_user_info(&server).await;
	let err = provider
		.fetch_identity("used-code", "state-it", &redirect_uri())
		.await
		.expect_err("A rejected grant should fail the fetch.");

	token.assert_calls_async(1).await;
	user_info.assert_calls_async(0).await;

	assert!(matches!(err, Error::InvalidGrant { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn user_info_without_userid_is_malformed() {
	let server = MockServer::start_async().await;
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let _token = mock_token(&server).await;
	let _user_info = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "user": { "name": "Nobody" } }));
		})
		.await;
	let err = provider
		.fetch_identity("valid-code", "state-it", &redirect_uri())
		.await
		.expect_err("A user without an id should fail the fetch.");

	assert!(matches!(err, Error::MalformedResponse(_)), "Unexpected error: {err:?}.");
}

#[test]
fn descriptive_metadata_is_localized() {
	let server = MockServer::start();
	let provider = build_reqwest_test_provider(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);

	assert_eq!(provider.id().as_ref(), "dataporten");
	assert_eq!(provider.title(), "Dataporten");
	assert_eq!(provider.persistent_id_name(), "Dataporten ID");
	assert_eq!(provider.persistent_id_description(), "The unique Dataporten user identifier.");
	assert!(provider.persistent_id_url_prefix().is_none());
	assert!(provider.logo().is_none());
	assert!(!provider.is_display_identifier());
}
