//! Report request assembly and upstream-mandated parameter normalization.
//!
//! The upstream imposes two mutual exclusions between aggregation totals and time
//! granularity; [`ReportingRequestBuilder::build`] applies them after the caller's
//! raw intent is captured and before anything is sent, identically for every report
//! level (campaign, ad group, keyword, search term).

// self
use crate::{
	_prelude::*,
	query::{LISTING_LIMIT, OrderBy, Selector, SortOrder},
};

/// Field the default report ordering sorts on.
pub const DEFAULT_ORDER_FIELD: &str = "impressions";

/// Time-bucketing resolution requested for a performance report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
	/// One row per hour.
	Hourly,
	/// One row per day.
	Daily,
	/// One row per week.
	Weekly,
	/// One row per month.
	Monthly,
}

/// Fully normalized reporting request, ready to send upstream.
///
/// Only obtainable through [`ReportingRequestBuilder`], so the invariants below
/// hold for every value of this type:
///
/// - without `granularity`, `return_row_totals` is `true`;
/// - with `granularity`, `return_grand_totals` is `false`;
/// - the selector always carries at least one order-by clause.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingRequest {
	/// Inclusive report start date; validated upstream, opaque here.
	pub start_time: String,
	/// Inclusive report end date; validated upstream, opaque here.
	pub end_time: String,
	/// Row filtering, ordering, and pagination.
	pub selector: Selector,
	/// Dimensions to group rows by.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub group_by: Vec<String>,
	/// IANA time zone the report is bucketed in.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time_zone: Option<String>,
	/// Requested time-series granularity.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub granularity: Option<Granularity>,
	/// Whether per-row totals are returned.
	pub return_row_totals: bool,
	/// Whether grand totals are returned.
	pub return_grand_totals: bool,
	/// Whether zero-metric records are included.
	pub return_records_with_no_metrics: bool,
}
impl ReportingRequest {
	/// Returns a builder for the given reporting window.
	pub fn builder(
		start_time: impl Into<String>,
		end_time: impl Into<String>,
	) -> ReportingRequestBuilder {
		ReportingRequestBuilder {
			start_time: start_time.into(),
			end_time: end_time.into(),
			selector: None,
			group_by: Vec::new(),
			time_zone: None,
			granularity: None,
			return_row_totals: None,
			return_grand_totals: None,
			return_records_with_no_metrics: false,
		}
	}
}

/// Builder capturing caller intent before normalization.
#[derive(Clone, Debug)]
pub struct ReportingRequestBuilder {
	start_time: String,
	end_time: String,
	selector: Option<Selector>,
	group_by: Vec<String>,
	time_zone: Option<String>,
	granularity: Option<Granularity>,
	return_row_totals: Option<bool>,
	return_grand_totals: Option<bool>,
	return_records_with_no_metrics: bool,
}
impl ReportingRequestBuilder {
	/// Overrides the selector (defaults to an unfiltered selector with the
	/// listing page size).
	pub fn selector(mut self, selector: Selector) -> Self {
		self.selector = Some(selector);

		self
	}

	/// Sets the grouping dimensions.
	pub fn group_by(mut self, dimensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.group_by = dimensions.into_iter().map(Into::into).collect();

		self
	}

	/// Sets the report time zone.
	pub fn time_zone(mut self, zone: impl Into<String>) -> Self {
		self.time_zone = Some(zone.into());

		self
	}

	/// Requests a time-series granularity.
	pub fn granularity(mut self, granularity: Granularity) -> Self {
		self.granularity = Some(granularity);

		self
	}

	/// Records the caller's row-totals intent; overridden by normalization for
	/// ungrouped reports.
	pub fn return_row_totals(mut self, value: bool) -> Self {
		self.return_row_totals = Some(value);

		self
	}

	/// Records the caller's grand-totals intent; overridden by normalization for
	/// granular reports.
	pub fn return_grand_totals(mut self, value: bool) -> Self {
		self.return_grand_totals = Some(value);

		self
	}

	/// Includes records with no metrics (defaults to `false`).
	pub fn return_records_with_no_metrics(mut self, value: bool) -> Self {
		self.return_records_with_no_metrics = value;

		self
	}

	/// Consumes the builder, applying the upstream's mutual-exclusion rules.
	///
	/// Without a granularity, row totals are forced on regardless of caller
	/// input; with one, grand totals are forced off. A selector without any
	/// order-by clause gains the deterministic default ordering
	/// (impressions, descending).
	pub fn build(self) -> ReportingRequest {
		let mut selector = self
			.selector
			.unwrap_or_else(|| Selector::builder().limit(LISTING_LIMIT).build());

		if selector.order_by.is_empty() {
			selector.order_by.push(OrderBy::new(DEFAULT_ORDER_FIELD, SortOrder::Descending));
		}

		let return_row_totals = match self.granularity {
			None => true,
			Some(_) => self.return_row_totals.unwrap_or(false),
		};
		let return_grand_totals = match self.granularity {
			Some(_) => false,
			None => self.return_grand_totals.unwrap_or(true),
		};

		ReportingRequest {
			start_time: self.start_time,
			end_time: self.end_time,
			selector,
			group_by: self.group_by,
			time_zone: self.time_zone,
			granularity: self.granularity,
			return_row_totals,
			return_grand_totals,
			return_records_with_no_metrics: self.return_records_with_no_metrics,
		}
	}
}
