//! Immutable credential set required to mint signed assertions.

// std
use std::{
	env, fs,
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, error::ConfigError};

const ENV_CLIENT_ID: &str = "SEARCHADS_CLIENT_ID";
const ENV_TEAM_ID: &str = "SEARCHADS_TEAM_ID";
const ENV_KEY_ID: &str = "SEARCHADS_KEY_ID";
const ENV_PRIVATE_KEY_PATH: &str = "SEARCHADS_PRIVATE_KEY_PATH";
const ENV_ORG_ID: &str = "SEARCHADS_ORG_ID";

/// Immutable identity material used to mint signed assertions and scope API calls.
///
/// Loaded once at startup and never mutated afterwards. The private key is read
/// lazily from disk on the first mint and cached for the process lifetime; the key
/// is immutable, so re-reads buy nothing.
pub struct CredentialSet {
	client_id: String,
	team_id: String,
	key_id: String,
	private_key_path: PathBuf,
	org_id: i64,
	key_material: Mutex<Option<String>>,
}
impl CredentialSet {
	/// Returns a builder collecting the five required identity fields.
	pub fn builder() -> CredentialSetBuilder {
		CredentialSetBuilder::default()
	}

	/// Client identifier presented to the token endpoint.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Team identifier used as the assertion issuer.
	pub fn team_id(&self) -> &str {
		&self.team_id
	}

	/// Key identifier stamped into the assertion header.
	pub fn key_id(&self) -> &str {
		&self.key_id
	}

	/// Path of the PEM-encoded private key on disk.
	pub fn private_key_path(&self) -> &Path {
		&self.private_key_path
	}

	/// Numeric organization identifier carried in the org-context header.
	pub fn org_id(&self) -> i64 {
		self.org_id
	}

	/// Returns the PEM-encoded private key, reading it from disk on first use.
	///
	/// A failed read is not cached; the next call retries the file.
	pub fn key_material(&self) -> Result<String> {
		let mut slot = self.key_material.lock();

		if let Some(pem) = slot.as_ref() {
			return Ok(pem.clone());
		}

		let pem =
			fs::read_to_string(&self.private_key_path).map_err(|source| Error::KeyMaterial {
				path: self.private_key_path.display().to_string(),
				source,
			})?;

		*slot = Some(pem.clone());

		Ok(pem)
	}
}
impl Debug for CredentialSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialSet")
			.field("client_id", &self.client_id)
			.field("team_id", &self.team_id)
			.field("key_id", &self.key_id)
			.field("private_key_path", &self.private_key_path)
			.field("org_id", &self.org_id)
			.field("key_material", &"<redacted>")
			.finish()
	}
}

/// Builder for [`CredentialSet`].
///
/// `build` fails fast with the first absent field named, before any I/O runs.
#[derive(Clone, Debug, Default)]
pub struct CredentialSetBuilder {
	client_id: Option<String>,
	team_id: Option<String>,
	key_id: Option<String>,
	private_key_path: Option<PathBuf>,
	org_id: Option<i64>,
}
impl CredentialSetBuilder {
	/// Seeds the builder from the `SEARCHADS_*` environment variables.
	///
	/// Unset variables leave the corresponding field absent so `build` can name it;
	/// a non-numeric organization identifier fails immediately.
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut builder = Self::default();

		if let Ok(value) = env::var(ENV_CLIENT_ID) {
			builder = builder.client_id(value);
		}
		if let Ok(value) = env::var(ENV_TEAM_ID) {
			builder = builder.team_id(value);
		}
		if let Ok(value) = env::var(ENV_KEY_ID) {
			builder = builder.key_id(value);
		}
		if let Ok(value) = env::var(ENV_PRIVATE_KEY_PATH) {
			builder = builder.private_key_path(value);
		}
		if let Ok(value) = env::var(ENV_ORG_ID) {
			let parsed = value
				.parse::<i64>()
				.map_err(|_| ConfigError::InvalidOrgId { value: value.clone() })?;

			builder = builder.org_id(parsed);
		}

		Ok(builder)
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the team identifier.
	pub fn team_id(mut self, value: impl Into<String>) -> Self {
		self.team_id = Some(value.into());

		self
	}

	/// Sets the key identifier.
	pub fn key_id(mut self, value: impl Into<String>) -> Self {
		self.key_id = Some(value.into());

		self
	}

	/// Sets the private-key path.
	pub fn private_key_path(mut self, value: impl Into<PathBuf>) -> Self {
		self.private_key_path = Some(value.into());

		self
	}

	/// Sets the numeric organization identifier.
	pub fn org_id(mut self, value: i64) -> Self {
		self.org_id = Some(value);

		self
	}

	/// Consumes the builder, failing with the first absent field named.
	pub fn build(self) -> Result<CredentialSet, ConfigError> {
		let client_id = self.client_id.ok_or(ConfigError::MissingField { field: "client_id" })?;
		let team_id = self.team_id.ok_or(ConfigError::MissingField { field: "team_id" })?;
		let key_id = self.key_id.ok_or(ConfigError::MissingField { field: "key_id" })?;
		let private_key_path = self
			.private_key_path
			.ok_or(ConfigError::MissingField { field: "private_key_path" })?;
		let org_id = self.org_id.ok_or(ConfigError::MissingField { field: "org_id" })?;

		Ok(CredentialSet {
			client_id,
			team_id,
			key_id,
			private_key_path,
			org_id,
			key_material: Mutex::new(None),
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn full_builder() -> CredentialSetBuilder {
		CredentialSet::builder()
			.client_id("SEARCHADS.client")
			.team_id("SEARCHADS.team")
			.key_id("key-1")
			.private_key_path("/tmp/key.pem")
			.org_id(42)
	}

	#[test]
	fn build_succeeds_with_all_fields() {
		let credentials =
			full_builder().build().expect("Fully populated builder should succeed.");

		assert_eq!(credentials.client_id(), "SEARCHADS.client");
		assert_eq!(credentials.team_id(), "SEARCHADS.team");
		assert_eq!(credentials.key_id(), "key-1");
		assert_eq!(credentials.org_id(), 42);
	}

	#[test]
	fn build_names_each_missing_field() {
		let cases: [(CredentialSetBuilder, &str); 5] = [
			(full_builder_without(|b| b.client_id = None), "client_id"),
			(full_builder_without(|b| b.team_id = None), "team_id"),
			(full_builder_without(|b| b.key_id = None), "key_id"),
			(full_builder_without(|b| b.private_key_path = None), "private_key_path"),
			(full_builder_without(|b| b.org_id = None), "org_id"),
		];

		for (builder, expected) in cases {
			match builder.build() {
				Err(ConfigError::MissingField { field }) => assert_eq!(field, expected),
				other => panic!("Expected a missing `{expected}` error, got {other:?}."),
			}
		}
	}

	#[test]
	fn debug_output_redacts_key_material() {
		let credentials =
			full_builder().build().expect("Fully populated builder should succeed.");

		assert!(format!("{credentials:?}").contains("<redacted>"));
	}

	#[test]
	fn unreadable_key_is_a_key_material_error() {
		let credentials = full_builder()
			.private_key_path("/nonexistent/key.pem")
			.build()
			.expect("Builder with a bogus key path should still build.");

		match credentials.key_material() {
			Err(Error::KeyMaterial { path, .. }) => assert_eq!(path, "/nonexistent/key.pem"),
			other => panic!("Expected a key material error, got {other:?}."),
		}
	}

	fn full_builder_without(strip: impl FnOnce(&mut CredentialSetBuilder)) -> CredentialSetBuilder {
		let mut builder = full_builder();

		strip(&mut builder);

		builder
	}
}
