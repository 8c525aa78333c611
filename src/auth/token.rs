//! Bearer-token caching and the client-credentials exchange.

// self
use crate::{
	_prelude::*,
	auth::{CredentialSet, assertion},
	error::TransportError,
	obs::RequestSpan,
};

/// Fixed scope requested during every token exchange.
pub const TOKEN_SCOPE: &str = "searchadsorg";
/// Minimum validity a cached token must retain at the moment it is returned.
pub const SAFETY_MARGIN: Duration = Duration::minutes(5);
/// Production token endpoint of the upstream identity service.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://appleid.apple.com/auth/oauth2/token";

/// Redacting wrapper around the opaque bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);
impl BearerToken {
	/// Wraps a freshly exchanged token value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Formats the token as an `Authorization` header value.
	pub fn authorization_value(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerToken").field(&"<redacted>").finish()
	}
}
impl Display for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Cached bearer credential plus its absolute expiry.
#[derive(Clone, Debug)]
pub struct CachedToken {
	/// Opaque access token returned by the token endpoint.
	pub access_token: BearerToken,
	/// Absolute instant after which the upstream stops accepting the token.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Returns `true` while the token keeps at least [`SAFETY_MARGIN`] of validity.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now + SAFETY_MARGIN < self.expires_at
	}
}

#[derive(Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	expires_in: i64,
}

/// Cache guarding the single process-wide bearer credential.
///
/// Owned by the client instance rather than a language-level global so tests can
/// construct isolated caches without cross-test contamination. Warm-path reads
/// never touch the network; refreshes are serialized behind a single-flight guard
/// so concurrent cold starts trigger exactly one exchange. An expired token is
/// replaced in place, never merely dropped.
pub struct TokenCache {
	http: ReqwestClient,
	endpoint: Url,
	slot: Mutex<Option<CachedToken>>,
	refresh: AsyncMutex<()>,
}
impl TokenCache {
	/// Creates a cache that exchanges tokens against `endpoint`.
	pub fn new(http: ReqwestClient, endpoint: Url) -> Self {
		Self { http, endpoint, slot: Mutex::new(None), refresh: AsyncMutex::new(()) }
	}

	/// Returns a bearer token with at least [`SAFETY_MARGIN`] of remaining validity.
	///
	/// A fresh cached token is returned without network traffic. Otherwise a new
	/// assertion is minted, exchanged, and the replacement stored; a failed
	/// exchange leaves the cache untouched.
	pub async fn access_token(&self, credentials: &CredentialSet) -> Result<BearerToken> {
		if let Some(cached) = self.fresh_token_at(OffsetDateTime::now_utc()) {
			return Ok(cached);
		}

		let _refresh = self.refresh.lock().await;
		// Re-check after acquiring the guard: another caller may have finished the
		// exchange while this one waited.
		let now = OffsetDateTime::now_utc();

		if let Some(cached) = self.fresh_token_at(now) {
			return Ok(cached);
		}

		let span = RequestSpan::new("token_exchange", self.endpoint.as_str());
		let exchanged = span.instrument(self.exchange(credentials, now)).await?;

		*self.slot.lock() = Some(exchanged.clone());

		Ok(exchanged.access_token)
	}

	/// Unconditionally drops the cached token; the next call performs a fresh
	/// exchange. Used for testing and forced rotation.
	pub fn clear(&self) {
		*self.slot.lock() = None;
	}

	fn fresh_token_at(&self, now: OffsetDateTime) -> Option<BearerToken> {
		self.slot
			.lock()
			.as_ref()
			.filter(|cached| cached.is_fresh_at(now))
			.map(|cached| cached.access_token.clone())
	}

	async fn exchange(
		&self,
		credentials: &CredentialSet,
		now: OffsetDateTime,
	) -> Result<CachedToken> {
		let client_secret = assertion::mint(credentials, now)?;
		let form = [
			("grant_type", "client_credentials"),
			("client_id", credentials.client_id()),
			("client_secret", client_secret.as_str()),
			("scope", TOKEN_SCOPE),
		];
		let response = self
			.http
			.post(self.endpoint.clone())
			.form(&form)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();
		let body = response.text().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(Error::Authentication { status: status.as_u16(), body });
		}

		let mut deserializer = serde_json::Deserializer::from_str(&body);
		let parsed: TokenEndpointResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::MalformedResponse { raw: body.clone(), source })?;

		Ok(CachedToken {
			access_token: BearerToken::new(parsed.access_token),
			expires_at: now + Duration::seconds(parsed.expires_in),
		})
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("endpoint", &self.endpoint.as_str())
			.field("cached", &self.slot.lock().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = BearerToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "BearerToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(token.authorization_value(), "Bearer super-secret");
	}

	#[test]
	fn safety_margin_boundary_is_exclusive() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let four_minutes = CachedToken {
			access_token: BearerToken::new("short"),
			expires_at: now + Duration::minutes(4),
		};
		let six_minutes = CachedToken {
			access_token: BearerToken::new("long"),
			expires_at: now + Duration::minutes(6),
		};
		let exact_margin = CachedToken {
			access_token: BearerToken::new("edge"),
			expires_at: now + SAFETY_MARGIN,
		};

		assert!(!four_minutes.is_fresh_at(now));
		assert!(six_minutes.is_fresh_at(now));
		assert!(!exact_margin.is_fresh_at(now));
	}
}
