//! Signed-assertion minting for the client-credentials exchange.
//!
//! An assertion is a short-lived ES256-signed claim set, keyed to one credential set
//! and presented exactly once as the client secret of a token exchange. Minting is a
//! pure function of the credential set and the supplied clock; it caches nothing
//! (caching happens one layer up in [`TokenCache`](crate::auth::TokenCache)) and is
//! re-mintable on demand.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{_prelude::*, auth::CredentialSet};

/// Audience claim fixed by the upstream identity service.
pub const ASSERTION_AUDIENCE: &str = "https://appleid.apple.com";
/// Assertion lifetime; the maximum the upstream token issuer accepts.
pub const ASSERTION_LIFETIME: Duration = Duration::seconds(86_400);

/// Claim set carried by a freshly minted assertion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Issuer; the team identifier.
	pub iss: String,
	/// Issued-at instant, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry instant, seconds since the Unix epoch.
	pub exp: i64,
	/// Audience; the fixed upstream identity endpoint.
	pub aud: String,
	/// Subject; the client identifier.
	pub sub: String,
}
impl AssertionClaims {
	/// Builds the claim set for `credentials` as of `now`.
	pub fn new(credentials: &CredentialSet, now: OffsetDateTime) -> Self {
		Self {
			iss: credentials.team_id().to_owned(),
			iat: now.unix_timestamp(),
			exp: (now + ASSERTION_LIFETIME).unix_timestamp(),
			aud: ASSERTION_AUDIENCE.to_owned(),
			sub: credentials.client_id().to_owned(),
		}
	}
}

/// Mints a compact ES256-signed assertion for `credentials` as of `now`.
///
/// The only side effect is the first key-material read, which
/// [`CredentialSet`] caches for the process lifetime.
pub fn mint(credentials: &CredentialSet, now: OffsetDateTime) -> Result<String> {
	let pem = credentials.key_material()?;
	let key = EncodingKey::from_ec_pem(pem.as_bytes()).map_err(|source| Error::Signing { source })?;
	let mut header = Header::new(Algorithm::ES256);

	header.kid = Some(credentials.key_id().to_owned());

	let claims = AssertionClaims::new(credentials, now);

	jsonwebtoken::encode(&header, &claims, &key).map_err(|source| Error::Signing { source })
}
