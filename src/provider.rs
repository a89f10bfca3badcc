//! Provider-facing descriptors (data) and identity providers (behavior).
//!
//! `descriptor` exposes validated configuration (`ProviderDescriptor`): HTTPS-only endpoints,
//! client authentication preferences, and normalization quirks. `capability` defines
//! [`IdentityProvider`], the contract the surrounding authentication framework calls, and
//! `dataporten` implements it for Dataporten/Feide.

pub mod capability;
pub mod dataporten;
pub mod descriptor;
pub mod localization;

pub use capability::*;
pub use dataporten::*;
pub use descriptor::*;
pub use localization::*;
