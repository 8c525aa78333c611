//! Selector construction for the upstream "find" and reporting endpoints.
//!
//! Pure data assembly: field names are never validated locally, the upstream
//! service is the source of truth and answers unknown fields with a structured
//! error. Everything serializes camelCase to match the wire.

// self
use crate::_prelude::*;

/// Default page size for entity search endpoints.
pub const ENTITY_SEARCH_LIMIT: u32 = 20;
/// Default page size for keyword and report listings, whose result sets are
/// typically far larger than entity searches.
pub const LISTING_LIMIT: u32 = 1000;

/// Closed set of comparison operators accepted by selector conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
	/// Exact equality against a single value.
	Equals,
	/// Membership in the supplied value list.
	In,
	/// Strictly less than the supplied value.
	LessThan,
	/// Strictly greater than the supplied value.
	GreaterThan,
	/// Prefix match against a single value.
	#[serde(rename = "STARTSWITH")]
	StartsWith,
	/// Intersection with the supplied value list is non-empty.
	ContainsAny,
	/// The supplied value list is fully contained.
	ContainsAll,
}

/// Sort direction for an order-by clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
	/// Smallest values first.
	Ascending,
	/// Largest values first.
	Descending,
}

/// Single server-side filter condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
	/// Field the condition filters on.
	pub field: String,
	/// Comparison operator.
	pub operator: Operator,
	/// Operand values; single-element for scalar comparisons.
	pub values: Vec<String>,
}
impl Condition {
	/// Builds a condition.
	pub fn new(
		field: impl Into<String>,
		operator: Operator,
		values: impl IntoIterator<Item = impl Into<String>>,
	) -> Self {
		Self {
			field: field.into(),
			operator,
			values: values.into_iter().map(Into::into).collect(),
		}
	}
}

/// Sort clause applied server-side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
	/// Field to sort on.
	pub field: String,
	/// Sort direction.
	pub sort_order: SortOrder,
}
impl OrderBy {
	/// Builds a sort clause.
	pub fn new(field: impl Into<String>, sort_order: SortOrder) -> Self {
		Self { field: field.into(), sort_order }
	}
}

/// Offset/limit pagination block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorPagination {
	/// Zero-based offset of the first result.
	pub offset: u32,
	/// Maximum number of results per page.
	pub limit: u32,
}

/// Canonical filter/sort/paginate descriptor consumed by find and report
/// endpoints. Built fresh per query call via [`Selector::builder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
	/// Filter conditions, combined conjunctively upstream.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub conditions: Vec<Condition>,
	/// Specific fields to return; empty returns the upstream default set.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub fields: Vec<String>,
	/// Sort clauses, applied in order.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub order_by: Vec<OrderBy>,
	/// Result pagination.
	pub pagination: SelectorPagination,
}
impl Selector {
	/// Returns a builder with offset 0 and the entity-search page size.
	pub fn builder() -> SelectorBuilder {
		SelectorBuilder::default()
	}
}

/// Builder assembling [`Selector`] values; pure data assembly, infallible.
#[derive(Clone, Debug)]
pub struct SelectorBuilder {
	conditions: Vec<Condition>,
	fields: Vec<String>,
	order_by: Vec<OrderBy>,
	offset: u32,
	limit: u32,
}
impl SelectorBuilder {
	/// Appends a filter condition.
	pub fn condition(
		mut self,
		field: impl Into<String>,
		operator: Operator,
		values: impl IntoIterator<Item = impl Into<String>>,
	) -> Self {
		self.conditions.push(Condition::new(field, operator, values));

		self
	}

	/// Restricts the returned fields.
	pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.fields = fields.into_iter().map(Into::into).collect();

		self
	}

	/// Appends a sort clause.
	pub fn order_by(mut self, field: impl Into<String>, sort_order: SortOrder) -> Self {
		self.order_by.push(OrderBy::new(field, sort_order));

		self
	}

	/// Overrides the zero-based result offset (defaults to 0).
	pub fn offset(mut self, offset: u32) -> Self {
		self.offset = offset;

		self
	}

	/// Overrides the page size (defaults to [`ENTITY_SEARCH_LIMIT`]; listing
	/// call sites pass [`LISTING_LIMIT`]).
	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = limit;

		self
	}

	/// Produces the canonical [`Selector`] shape.
	pub fn build(self) -> Selector {
		Selector {
			conditions: self.conditions,
			fields: self.fields,
			order_by: self.order_by,
			pagination: SelectorPagination { offset: self.offset, limit: self.limit },
		}
	}
}
impl Default for SelectorBuilder {
	fn default() -> Self {
		Self {
			conditions: Vec::new(),
			fields: Vec::new(),
			order_by: Vec::new(),
			offset: 0,
			limit: ENTITY_SEARCH_LIMIT,
		}
	}
}
