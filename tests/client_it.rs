// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use searchads_bridge::{
	_preludet::*,
	error::Error,
	query::{Operator, Selector},
	report::{Granularity, ReportingRequest},
};

const TOKEN_PATH: &str = "/auth/oauth2/token";
const TOKEN_BODY: &str =
	"{\"access_token\":\"bearer-token\",\"token_type\":\"Bearer\",\"expires_in\":3600}";

async fn mock_token_endpoint(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
}

#[tokio::test]
async fn get_attaches_bearer_and_org_context_headers() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v4/campaigns")
				.header("authorization", "Bearer bearer-token")
				.header("x-ap-context", format!("orgId={TEST_ORG_ID}"));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"id\":1}]}");
		})
		.await;
	let envelope = client
		.get::<Value>("campaigns")
		.await
		.expect("Scoped GET should succeed with both headers attached.");

	assert_eq!(envelope.data, Some(json!([{"id": 1}])));

	mock.assert_async().await;
}

#[tokio::test]
async fn get_with_appends_query_parameters() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v4/campaigns")
				.query_param("limit", "1000")
				.query_param("offset", "0");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[]}");
		})
		.await;
	let _ = client
		.get_with::<Value, _>("campaigns", &[("limit", "1000"), ("offset", "0")])
		.await
		.expect("GET with query parameters should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn account_discovery_omits_the_org_context_header() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;

	// Created first so a request wrongly carrying the header is captured here
	// instead of falling through to the general mock below.
	let scoped = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/acls").header_exists("x-ap-context");
			then.status(500).body("org context header must not reach this endpoint");
		})
		.await;
	let unscoped = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/acls").header("authorization", "Bearer bearer-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"orgName\":\"Test Org\"}]}");
		})
		.await;
	let envelope = client
		.get_unscoped::<Value>("acls")
		.await
		.expect("Unscoped account discovery should succeed.");

	assert_eq!(envelope.data, Some(json!([{"orgName": "Test Org"}])));

	scoped.assert_calls_async(0).await;
	unscoped.assert_calls_async(1).await;
}

#[tokio::test]
async fn post_sends_the_json_body() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;

	let selector = Selector::builder()
		.condition("countriesOrRegions", Operator::ContainsAny, ["US"])
		.build();
	let expected =
		serde_json::to_value(&selector).expect("Selector should serialize for the matcher.");
	let mock = server
		.mock_async(move |when, then| {
			when.method(POST)
				.path("/api/v4/campaigns/find")
				.header("content-type", "application/json")
				.json_body(expected);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[],\"pagination\":{\"totalResults\":0,\"startIndex\":0,\"itemsPerPage\":20}}");
		})
		.await;
	let envelope = client
		.post::<Value, _>("campaigns/find", &selector)
		.await
		.expect("Find POST should succeed.");
	let pagination = envelope.pagination.expect("Listing reply should carry pagination.");

	assert_eq!(pagination.total_results, 0);
	assert_eq!(pagination.items_per_page, 20);

	mock.assert_async().await;
}

#[tokio::test]
async fn normalized_report_request_reaches_the_wire() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;

	let request = ReportingRequest::builder("2025-01-01", "2025-01-31")
		.granularity(Granularity::Daily)
		.return_grand_totals(true)
		.build();
	let expected =
		serde_json::to_value(&request).expect("Report request should serialize for the matcher.");

	// The builder already forced grand totals off and injected the default
	// ordering; the matcher pins both on the outgoing body.
	assert_eq!(expected["returnGrandTotals"], json!(false));
	assert_eq!(
		expected["selector"]["orderBy"],
		json!([{"field": "impressions", "sortOrder": "DESCENDING"}])
	);

	let mock = server
		.mock_async(move |when, then| {
			when.method(POST).path("/api/v4/reports/campaigns").json_body(expected);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"reportingDataResponse\":{\"row\":[]}}}");
		})
		.await;
	let _ = client
		.post::<Value, _>("reports/campaigns", &request)
		.await
		.expect("Report POST should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn put_updates_and_returns_the_envelope() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(PUT).path("/api/v4/campaigns/42").json_body(json!({"name": "Renamed"}));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"id\":42,\"name\":\"Renamed\"}}");
		})
		.await;
	let envelope = client
		.put::<Value, _>("campaigns/42", &json!({"name": "Renamed"}))
		.await
		.expect("Update PUT should succeed.");

	assert_eq!(envelope.data, Some(json!({"id": 42, "name": "Renamed"})));

	mock.assert_async().await;
}

#[tokio::test]
async fn delete_with_empty_body_yields_absent_data() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v4/campaigns/42");
			then.status(200);
		})
		.await;
	let envelope = client
		.delete::<Value>("campaigns/42")
		.await
		.expect("An empty-body delete must classify as success.");

	assert!(envelope.data.is_none());

	mock.assert_async().await;
}

#[tokio::test]
async fn structured_error_list_is_synthesized_exactly() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/campaigns");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":[{\"messageCode\":\"INVALID_ARG\",\"message\":\"bad field\",\"field\":\"name\"}]}",
			);
		})
		.await;

	let err = client
		.post::<Value, _>("campaigns", &json!({"name": ""}))
		.await
		.expect_err("A structured upstream failure must raise an API error.");

	match err {
		Error::Api { status, message } => {
			assert_eq!(status, 400);
			assert_eq!(message, "INVALID_ARG: bad field (field: name)");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn empty_error_body_uses_the_http_fallback_message() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/campaigns");
			then.status(403);
		})
		.await;

	let err = client
		.get::<Value>("campaigns")
		.await
		.expect_err("A bare 403 must raise an API error.");

	match err {
		Error::Api { status, message } => {
			assert_eq!(status, 403);
			assert_eq!(message, "HTTP 403: Forbidden - Response: ");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn non_json_api_response_is_preserved_verbatim() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));

	mock_token_endpoint(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/campaigns");
			then.status(200).header("content-type", "text/html").body("<html>proxy says no</html>");
		})
		.await;

	let err = client
		.get::<Value>("campaigns")
		.await
		.expect_err("A non-JSON body must raise a malformed response error.");

	match err {
		Error::MalformedResponse { raw, .. } => assert_eq!(raw, "<html>proxy says no</html>"),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn one_token_exchange_serves_many_requests() {
	let server = MockServer::start_async().await;
	let client = build_mock_client(&server.url(""));
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/campaigns");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[]}");
		})
		.await;

	for _ in 0..3 {
		let _ = client.get::<Value>("campaigns").await.expect("Scoped GET should succeed.");
	}

	token.assert_calls_async(1).await;
	api.assert_calls_async(3).await;
}
