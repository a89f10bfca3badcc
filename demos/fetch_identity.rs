//! Prints the Dataporten authorize URL and, once `DATAPORTEN_CODE` holds the code from the
//! callback, redeems it for a normalized identity.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth2_identity::{
	http::ReqwestHttpClient,
	oauth::BasicTokenExchange,
	provider::{BundleLocalizer, DataportenProvider, IdentityProvider, ProviderDescriptor},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = env::var("DATAPORTEN_CLIENT_ID")
		.map_err(|_| eyre!("Set DATAPORTEN_CLIENT_ID to the registered client id."))?;
	let client_secret = env::var("DATAPORTEN_CLIENT_SECRET").ok();
	let redirect_uri = Url::parse("http://localhost:8080/oauth/callback")?;
	let mut descriptor = ProviderDescriptor::dataporten()?;

	descriptor.scopes = vec!["userid".into(), "profile".into(), "email".into(), "groups".into()];

	let exchange = BasicTokenExchange::from_descriptor(
		&descriptor,
		&client_id,
		client_secret.as_deref(),
		ReqwestHttpClient::default(),
	)?;

	println!("Send your user to {}.", exchange.authorization_url("demo-state", &redirect_uri));

	let Ok(code) = env::var("DATAPORTEN_CODE") else {
		println!("Re-run with DATAPORTEN_CODE set to the returned code to fetch the identity.");

		return Ok(());
	};
	let localizer = BundleLocalizer::default()
		.with_entry("auth.providers.title.dataporten", "Dataporten")
		.with_entry("auth.providers.persistentUserIdName.dataporten", "Dataporten ID");
	let provider =
		DataportenProvider::new(descriptor, &client_id, client_secret.as_deref(), Arc::new(localizer))?;
	let identity = provider.fetch_identity(&code, "demo-state", &redirect_uri).await?;

	println!("{} ({}): {identity:#?}", provider.title(), provider.persistent_id_name());

	Ok(())
}
