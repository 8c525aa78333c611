//! Generic authenticated REST client for the upstream advertising API.
//!
//! The client is resource-domain-agnostic: it knows nothing about campaigns,
//! keywords, or reports. Call sites supply paths and bodies; the client obtains a
//! bearer token, attaches the org-scoping context header, and normalizes every
//! response into [`Envelope`] or one classified error.

pub mod envelope;
pub use envelope::{ApiErrorEntry, Envelope, ErrorPayload, Pagination};

// crates.io
use reqwest::{RequestBuilder, header};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, CredentialSet, TokenCache, token::DEFAULT_TOKEN_ENDPOINT},
	error::{ConfigError, TransportError},
	obs::RequestSpan,
};

/// Production base URL, version prefix included.
pub const DEFAULT_BASE_URL: &str = "https://api.searchads.apple.com/api/v4/";
/// Header carrying the numeric organization identifier on every scoped call.
pub const ORG_CONTEXT_HEADER: &str = "X-AP-Context";

/// Authenticated REST client issuing envelope-normalized requests.
///
/// One instance owns the shared HTTP connection pool and the token cache; clone
/// handles are not provided, callers share the instance behind [`Arc`] instead so
/// all requests reuse the same cached bearer token.
#[derive(Debug)]
pub struct Client {
	http: ReqwestClient,
	base_url: Url,
	credentials: Arc<CredentialSet>,
	tokens: TokenCache,
}
impl Client {
	/// Returns a builder for the provided credential set.
	pub fn builder(credentials: CredentialSet) -> ClientBuilder {
		ClientBuilder::new(credentials)
	}

	/// Credential set this client was constructed with.
	pub fn credentials(&self) -> &CredentialSet {
		&self.credentials
	}

	/// Returns a bearer token with the full safety margin of remaining validity,
	/// exchanging a fresh one when needed.
	pub async fn access_token(&self) -> Result<BearerToken> {
		self.tokens.access_token(&self.credentials).await
	}

	/// Drops the cached bearer token; the next call performs a fresh exchange.
	pub fn clear_token_cache(&self) {
		self.tokens.clear();
	}

	/// Issues an org-scoped GET request.
	pub async fn get<T>(&self, path: &str) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
	{
		let url = self.endpoint(path)?;

		self.execute(self.http.get(url), path, "get", true).await
	}

	/// Issues an org-scoped GET request with `query` appended to the URL.
	///
	/// Parameter order is preserved as supplied; the upstream treats it as
	/// order-insensitive.
	pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
		Q: Serialize + ?Sized,
	{
		let url = self.endpoint(path)?;

		self.execute(self.http.get(url).query(query), path, "get", true).await
	}

	/// Issues a GET request without the org-context header.
	///
	/// Only the account-discovery endpoint predates org scoping and needs this
	/// variant; everything else goes through [`get`](Self::get).
	pub async fn get_unscoped<T>(&self, path: &str) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
	{
		let url = self.endpoint(path)?;

		self.execute(self.http.get(url), path, "get", false).await
	}

	/// Issues an org-scoped POST request with a JSON body.
	pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
		B: Serialize + ?Sized,
	{
		let url = self.endpoint(path)?;

		self.execute(self.http.post(url).json(body), path, "post", true).await
	}

	/// Issues an org-scoped PUT request with a JSON body.
	pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
		B: Serialize + ?Sized,
	{
		let url = self.endpoint(path)?;

		self.execute(self.http.put(url).json(body), path, "put", true).await
	}

	/// Issues an org-scoped DELETE request.
	pub async fn delete<T>(&self, path: &str) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
	{
		let url = self.endpoint(path)?;

		self.execute(self.http.delete(url), path, "delete", true).await
	}

	fn endpoint(&self, path: &str) -> Result<Url> {
		let relative = path.trim_start_matches('/');

		self.base_url.join(relative).map_err(|source| {
			ConfigError::InvalidEndpoint { value: path.to_owned(), source }.into()
		})
	}

	async fn execute<T>(
		&self,
		builder: RequestBuilder,
		path: &str,
		stage: &'static str,
		org_scoped: bool,
	) -> Result<Envelope<T>>
	where
		T: DeserializeOwned,
	{
		let token = self.tokens.access_token(&self.credentials).await?;
		let mut builder = builder
			.header(header::AUTHORIZATION, token.authorization_value())
			.header(header::CONTENT_TYPE, "application/json");

		if org_scoped {
			builder =
				builder.header(ORG_CONTEXT_HEADER, format!("orgId={}", self.credentials.org_id()));
		}

		let span = RequestSpan::new(stage, path);

		span.instrument(async move {
			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let raw = response.text().await.map_err(TransportError::from)?;

			envelope::classify(status, &raw)
		})
		.await
	}
}

/// Builder performing the validating half of two-phase client construction.
///
/// All configuration problems surface here, before any network call; a built
/// [`Client`] never re-validates per request and there is no lazy construction to
/// silently retry.
#[derive(Debug)]
pub struct ClientBuilder {
	credentials: CredentialSet,
	base_url: String,
	token_endpoint: String,
	http: Option<ReqwestClient>,
}
impl ClientBuilder {
	fn new(credentials: CredentialSet) -> Self {
		Self {
			credentials,
			base_url: DEFAULT_BASE_URL.into(),
			token_endpoint: DEFAULT_TOKEN_ENDPOINT.into(),
			http: None,
		}
	}

	/// Overrides the API base URL (primarily for tests against a mock server).
	pub fn base_url(mut self, value: impl Into<String>) -> Self {
		self.base_url = value.into();

		self
	}

	/// Overrides the token endpoint.
	pub fn token_endpoint(mut self, value: impl Into<String>) -> Self {
		self.token_endpoint = value.into();

		self
	}

	/// Supplies a pre-configured HTTP client shared with other components.
	pub fn http_client(mut self, client: ReqwestClient) -> Self {
		self.http = Some(client);

		self
	}

	/// Validates the endpoints and produces a ready [`Client`].
	pub fn build(self) -> Result<Client> {
		let mut base_url = parse_endpoint(&self.base_url)?;

		// `Url::join` replaces the final segment unless the base path ends with a
		// slash, which would silently drop the version prefix.
		if !base_url.path().ends_with('/') {
			let normalized = format!("{}/", base_url.path());

			base_url.set_path(&normalized);
		}

		let token_endpoint = parse_endpoint(&self.token_endpoint)?;
		let http = self.http.unwrap_or_default();
		let tokens = TokenCache::new(http.clone(), token_endpoint);

		Ok(Client { http, base_url, credentials: Arc::new(self.credentials), tokens })
	}
}

fn parse_endpoint(value: &str) -> Result<Url> {
	Url::parse(value)
		.map_err(|source| ConfigError::InvalidEndpoint { value: value.to_owned(), source }.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn builder_rejects_invalid_endpoints() {
		let err = Client::builder(test_credentials())
			.base_url("not a url")
			.build()
			.expect_err("A malformed base URL must fail construction.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidEndpoint { .. })));
	}

	#[test]
	fn base_url_gains_a_trailing_slash() {
		let client = Client::builder(test_credentials())
			.base_url("https://api.example.com/api/v4")
			.build()
			.expect("Client with a slashless base URL should build.");
		let url = client.endpoint("campaigns").expect("Relative path should join cleanly.");

		assert_eq!(url.as_str(), "https://api.example.com/api/v4/campaigns");
	}

	#[test]
	fn leading_slashes_do_not_escape_the_version_prefix() {
		let client = Client::builder(test_credentials())
			.base_url("https://api.example.com/api/v4/")
			.build()
			.expect("Client with the default-shaped base URL should build.");
		let url = client.endpoint("/campaigns/42").expect("Path should join cleanly.");

		assert_eq!(url.as_str(), "https://api.example.com/api/v4/campaigns/42");
	}
}
