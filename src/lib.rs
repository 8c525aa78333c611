//! Typed client for the Apple Search Ads REST API—signed-assertion authentication, cached
//! bearer tokens, an envelope-normalizing transport, and selector/report request builders.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod obs;
pub mod query;
pub mod report;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{auth::CredentialSet, client::Client};

	/// Filesystem path of the ES256 private-key fixture shared across tests.
	pub const TEST_KEY_PATH: &str =
		concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/es256_private_key.pem");
	/// Filesystem path of the matching public key, used to verify minted assertions.
	pub const TEST_PUBLIC_KEY_PATH: &str =
		concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/es256_public_key.pem");
	/// Organization identifier baked into [`test_credentials`].
	pub const TEST_ORG_ID: i64 = 1234567;

	/// Builds a credential set pointing at the test key fixture.
	pub fn test_credentials() -> CredentialSet {
		CredentialSet::builder()
			.client_id("SEARCHADS.test-client")
			.team_id("SEARCHADS.test-team")
			.key_id("test-key-id")
			.private_key_path(TEST_KEY_PATH)
			.org_id(TEST_ORG_ID)
			.build()
			.expect("Test credential set should build successfully.")
	}

	/// Builds a client whose API base and token endpoint both point at `server_url`.
	///
	/// The API base lands under `/api/v4/` and the token endpoint under
	/// `/auth/oauth2/token`, mirroring the production URL layout on the mock host.
	pub fn build_mock_client(server_url: &str) -> Client {
		Client::builder(test_credentials())
			.base_url(format!("{server_url}/api/v4/"))
			.token_endpoint(format!("{server_url}/auth/oauth2/token"))
			.build()
			.expect("Mock-backed client should build successfully.")
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, searchads_bridge as _, tokio as _};
