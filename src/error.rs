//! Classified error types shared across the auth, transport, and reporting layers.
//!
//! Nothing here is retried or recovered internally: every failure propagates to the
//! immediate caller as exactly one classified [`Error`], and a call either fully
//! succeeds with a decoded envelope or fully fails. Presentation (logging, display)
//! is the caller's decision.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; raised synchronously, before any I/O.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Private-key material could not be read from disk.
	#[error("Private key at `{path}` is unreadable.")]
	KeyMaterial {
		/// Path the credential set points at.
		path: String,
		/// Underlying filesystem failure.
		#[source]
		source: std::io::Error,
	},
	/// The client assertion could not be signed (bad PEM, wrong curve).
	#[error("Client assertion could not be signed.")]
	Signing {
		/// Underlying signer failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Token endpoint rejected the exchange with a non-2xx status.
	#[error("Token endpoint returned HTTP {status}: {body}")]
	Authentication {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Upstream response body, verbatim.
		body: String,
	},
	/// A non-empty response body failed to decode as JSON.
	///
	/// The raw text is preserved verbatim; it is often the only diagnostic available.
	#[error("Upstream returned a non-JSON response: {raw}")]
	MalformedResponse {
		/// Raw response text, never discarded.
		raw: String,
		/// Structured decoding failure with the path that broke.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Upstream API returned a non-2xx status.
	///
	/// The message is synthesized from the structured error payload when one is
	/// present and is stable for identical upstream payloads.
	#[error("{message}")]
	Api {
		/// HTTP status code returned by the upstream API.
		status: u16,
		/// Synthesized, human-readable error message.
		message: String,
	},
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised before any network call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required credential field was not supplied.
	#[error("Missing required configuration field `{field}`.")]
	MissingField {
		/// Name of the absent field.
		field: &'static str,
	},
	/// An endpoint string could not be parsed as a URL.
	#[error("Endpoint `{value}` is not a valid URL.")]
	InvalidEndpoint {
		/// Offending endpoint string.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The organization identifier could not be parsed as an integer.
	#[error("Organization identifier `{value}` is not numeric.")]
	InvalidOrgId {
		/// Offending identifier string.
		value: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}
