//! Dataporten (Feide) identity provider.
//!
//! One authentication attempt runs strictly in sequence: token exchange, user-info GET,
//! group-membership GET, and at most one organization-name GET. Only the first two can fail the
//! attempt; the affiliation lookups degrade as described in [`crate::identity::affiliation`].

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::{ConfigError, ProviderError},
	http::{GetRequest, ProviderHttpClient},
	identity::{self, AffiliationResolver, CanonicalIdentity, IdentityParser, UserRecord},
	oauth::TokenExchange,
	obs::{self, FetchOutcome, FetchSpan},
	provider::{IdentityFuture, IdentityProvider, Localizer, ProviderDescriptor},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::BasicTokenExchange};

const TITLE_KEY: &str = "auth.providers.title";
const PERSISTENT_ID_NAME_KEY: &str = "auth.providers.persistentUserIdName";
const PERSISTENT_ID_TOOLTIP_KEY: &str = "auth.providers.persistentUserIdTooltip";

/// Identity provider for Dataporten and other providers sharing its payload shapes.
///
/// Instances hold no per-attempt state, so one provider can serve any number of concurrent
/// attempts.
#[derive(Clone)]
pub struct DataportenProvider {
	descriptor: ProviderDescriptor,
	token_exchange: Arc<dyn TokenExchange>,
	http_client: Arc<dyn ProviderHttpClient>,
	localizer: Arc<dyn Localizer>,
	parser: IdentityParser,
	resolver: AffiliationResolver,
}
impl DataportenProvider {
	/// Wires the provider from explicit collaborators.
	///
	/// Fails when the descriptor does not validate or its secondary-id scheme cannot be compiled.
	pub fn with_collaborators(
		descriptor: ProviderDescriptor,
		token_exchange: Arc<dyn TokenExchange>,
		http_client: Arc<dyn ProviderHttpClient>,
		localizer: Arc<dyn Localizer>,
	) -> Result<Self> {
		descriptor.validate().map_err(ConfigError::from)?;

		let parser =
			IdentityParser::new(descriptor.id.clone(), &descriptor.quirks.secondary_id_scheme)?;
		let resolver = AffiliationResolver::new(&descriptor, http_client.clone());

		Ok(Self { descriptor, token_exchange, http_client, localizer, parser, resolver })
	}

	/// Builds a provider whose token exchange and GETs share one reqwest client.
	///
	/// The client never follows redirects so every status is observed as the provider sent it.
	#[cfg(feature = "reqwest")]
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		localizer: Arc<dyn Localizer>,
	) -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::from)?;
		let http_client = ReqwestHttpClient::with_client(client);
		let exchange = BasicTokenExchange::from_descriptor(
			&descriptor,
			client_id,
			client_secret,
			http_client.clone(),
		)?;

		Self::with_collaborators(descriptor, Arc::new(exchange), Arc::new(http_client), localizer)
	}

	/// Descriptor backing this provider.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Runs one authentication attempt and returns the identity with its access token.
	///
	/// Token-exchange errors propagate unchanged. A user-info status other than `200` becomes
	/// [`ProviderError`] carrying the raw body; an unreadable body counts as empty.
	/// `state` is not inspected; validating the echoed value is the caller's job.
	pub async fn fetch_user_record(
		&self,
		code: &str,
		_state: &str,
		redirect_uri: &Url,
	) -> Result<UserRecord> {
		let provider = self.descriptor.id.as_ref();
		let span = FetchSpan::new(provider, "fetch_user_record");

		obs::record_fetch_outcome(provider, FetchOutcome::Attempt);

		let result = span
			.instrument(async {
				let token = self.token_exchange.exchange(code, redirect_uri).await?;
				let url = self
					.token_exchange
					.user_info_endpoint(&token, &self.descriptor.endpoints.user_info);
				let response =
					self.http_client.get(GetRequest::new(url).bearer(token.secret.clone())).await?;
				let status = response.status;
				let ok = response.is_ok();
				let body = response.into_body().unwrap_or_else(|e| {
					obs::degraded("user_info", e);

					Vec::new()
				});

				obs::response_received("user_info", status, body.len());

				if !ok {
					return Err(
						ProviderError::user_info(status, String::from_utf8_lossy(&body)).into()
					);
				}

				let base = self.parser.parse(&body)?;
				let affiliation = self.resolver.resolve(&token).await;

				Ok(UserRecord { identity: identity::assemble(&base, &affiliation), token })
			})
			.await;

		match &result {
			Ok(_) => obs::record_fetch_outcome(provider, FetchOutcome::Success),
			Err(_) => obs::record_fetch_outcome(provider, FetchOutcome::Failure),
		}

		result
	}

	fn label(&self, prefix: &str) -> String {
		self.localizer.lookup(&format!("{prefix}.{}", self.descriptor.id))
	}
}
impl IdentityProvider for DataportenProvider {
	fn id(&self) -> &ProviderId {
		&self.descriptor.id
	}

	fn title(&self) -> String {
		self.label(TITLE_KEY)
	}

	fn persistent_id_name(&self) -> String {
		self.label(PERSISTENT_ID_NAME_KEY)
	}

	fn persistent_id_description(&self) -> String {
		self.label(PERSISTENT_ID_TOOLTIP_KEY)
	}

	fn fetch_identity<'a>(
		&'a self,
		code: &'a str,
		state: &'a str,
		redirect_uri: &'a Url,
	) -> IdentityFuture<'a, CanonicalIdentity> {
		Box::pin(async move {
			self.fetch_user_record(code, state, redirect_uri).await.map(|record| record.identity)
		})
	}
}
impl Debug for DataportenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DataportenProvider")
			.field("descriptor", &self.descriptor)
			.field("parser", &self.parser)
			.field("resolver", &self.resolver)
			.finish_non_exhaustive()
	}
}
