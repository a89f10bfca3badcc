//! Localization contract for human-facing provider labels.
//!
//! Labels never influence identity normalization; they only feed the descriptive metadata of
//! [`IdentityProvider`](crate::provider::IdentityProvider).

// self
use crate::_prelude::*;

/// Resolves a bundle key into a localized string.
pub trait Localizer
where
	Self: Send + Sync,
{
	/// Returns the localized label for `key`.
	fn lookup(&self, key: &str) -> String;
}

/// Map-backed [`Localizer`] that echoes the key when no entry exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BundleLocalizer(BTreeMap<String, String>);
impl BundleLocalizer {
	/// Adds or replaces an entry.
	pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}
}
impl<K, V> FromIterator<(K, V)> for BundleLocalizer
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}
impl Localizer for BundleLocalizer {
	fn lookup(&self, key: &str) -> String {
		self.0.get(key).cloned().unwrap_or_else(|| key.to_owned())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn missing_keys_echo_back() {
		let bundle: BundleLocalizer = [("auth.providers.title.dataporten", "Dataporten")]
			.into_iter()
			.collect();

		assert_eq!(bundle.lookup("auth.providers.title.dataporten"), "Dataporten");
		assert_eq!(bundle.lookup("auth.providers.title.other"), "auth.providers.title.other");
	}
}
