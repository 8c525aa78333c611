//! Uniform response envelope decoding and error-message synthesis.

// self
use crate::_prelude::*;

/// Uniform wrapper every upstream reply is normalized into.
///
/// Successful replies carry `data` (and `pagination` on listing endpoints);
/// failure replies carry `error`. The client only decodes and classifies this
/// shape, it never mutates it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>", serialize = "T: Serialize"))]
pub struct Envelope<T> {
	/// Decoded payload; absent for empty-body successes such as deletes.
	#[serde(default)]
	pub data: Option<T>,
	/// Pagination metadata echoed by listing endpoints.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pagination: Option<Pagination>,
	/// Structured error payload present on failure responses.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
}
impl<T> Envelope<T> {
	/// Envelope representing an empty-body success.
	pub fn empty() -> Self {
		Self { data: None, pagination: None, error: None }
	}
}

/// Pagination block echoed by listing endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	/// Total number of matching results upstream.
	pub total_results: u64,
	/// Zero-based index of the first returned item.
	pub start_index: u64,
	/// Page size used for this reply.
	pub items_per_page: u64,
}

/// Upstream error field, which arrives as either a list or a single object.
///
/// Absence is modeled by the surrounding `Option` on [`Envelope::error`], so the
/// three wire shapes (none, single, list) are all matched explicitly instead of
/// being probed at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
	/// List-shaped error field.
	List(Vec<ApiErrorEntry>),
	/// Single-object error field.
	Single(ApiErrorEntry),
}
impl ErrorPayload {
	/// Synthesizes the stable, single-line message for this payload.
	///
	/// List entries are joined with `"; "`; identical payloads always produce
	/// identical messages.
	pub fn to_message(&self) -> String {
		match self {
			Self::List(entries) =>
				entries.iter().map(ApiErrorEntry::to_message).collect::<Vec<_>>().join("; "),
			Self::Single(entry) => entry.to_message(),
		}
	}
}

/// Single structured error entry returned by the upstream API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorEntry {
	/// Upstream error code.
	#[serde(default)]
	pub message_code: String,
	/// Human-readable description.
	#[serde(default)]
	pub message: String,
	/// Offending request field, when the upstream names one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub field: Option<String>,
}
impl ApiErrorEntry {
	/// Formats the entry as `"<messageCode>: <message> (field: <field>)"`, the
	/// field segment omitted when absent.
	pub fn to_message(&self) -> String {
		match &self.field {
			Some(field) => format!("{}: {} (field: {})", self.message_code, self.message, field),
			None => format!("{}: {}", self.message_code, self.message),
		}
	}
}

/// Classifies a raw upstream response into an envelope or one classified error.
///
/// Raw body text is read first, before any status-based branching, so failure
/// diagnostics are never lost:
///
/// - empty body + 2xx → empty envelope (`data: None`);
/// - empty body + non-2xx → [`Error::Api`] with the HTTP fallback message;
/// - non-empty body that is not valid JSON → [`Error::MalformedResponse`]
///   carrying the text verbatim;
/// - valid JSON + non-2xx → [`Error::Api`] with the synthesized message;
/// - valid JSON + 2xx → the parsed envelope, pagination included, unchanged.
pub(crate) fn classify<T>(status: StatusCode, raw: &str) -> Result<Envelope<T>>
where
	T: serde::de::DeserializeOwned,
{
	if raw.trim().is_empty() {
		if status.is_success() {
			return Ok(Envelope::empty());
		}

		return Err(Error::Api { status: status.as_u16(), message: fallback_message(status, raw) });
	}

	let mut deserializer = serde_json::Deserializer::from_str(raw);
	let parsed: Envelope<T> = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::MalformedResponse { raw: raw.to_owned(), source })?;

	if !status.is_success() {
		let message = parsed
			.error
			.as_ref()
			.map(ErrorPayload::to_message)
			.unwrap_or_else(|| fallback_message(status, raw));

		return Err(Error::Api { status: status.as_u16(), message });
	}

	Ok(parsed)
}

fn fallback_message(status: StatusCode, raw: &str) -> String {
	let reason = status.canonical_reason().unwrap_or("Unknown Status");

	format!("HTTP {}: {reason} - Response: {raw}", status.as_u16())
}
