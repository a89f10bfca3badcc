//! Exchange an OAuth 2.0 authorization grant for a normalized identity record from federated
//! identity providers that split user info and group membership across endpoints.
//!
//! The crate is organized leaf-first: [`identity`] holds the normalization pipeline (parser,
//! affiliation resolver, record assembler), [`provider`] wires that pipeline to a concrete
//! provider variant, and [`oauth`] + [`http`] define the collaborator contracts for the token
//! exchange and authenticated GETs.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod http;
pub mod identity;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestHttpClient,
		oauth::BasicTokenExchange,
		provider::{BundleLocalizer, DataportenProvider, ProviderDescriptor},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`DataportenProvider`] whose token exchange and provider GETs both run
	/// through the insecure reqwest client used across integration tests.
	pub fn build_reqwest_test_provider(
		descriptor: ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
	) -> DataportenProvider {
		let http_client = test_reqwest_http_client();
		let exchange = BasicTokenExchange::from_descriptor(
			&descriptor,
			client_id,
			Some(client_secret),
			http_client.clone(),
		)
		.expect("Token exchange should build from the test descriptor.");
		let localizer = BundleLocalizer::default()
			.with_entry("auth.providers.title.dataporten", "Dataporten")
			.with_entry("auth.providers.persistentUserIdName.dataporten", "Dataporten ID")
			.with_entry(
				"auth.providers.persistentUserIdTooltip.dataporten",
				"The unique Dataporten user identifier.",
			);

		DataportenProvider::with_collaborators(
			descriptor,
			Arc::new(exchange),
			Arc::new(http_client),
			Arc::new(localizer),
		)
		.expect("Dataporten provider should build from the test descriptor.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
