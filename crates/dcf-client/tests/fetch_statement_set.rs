use dcf_client::{Config, Error, FundamentalsClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, function: &str, status: u16, body: Value) {
  Mock::given(method("GET"))
    .and(path("/query"))
    .and(query_param("function", function))
    .and(query_param("symbol", "IBM"))
    .and(query_param("apikey", "test_key"))
    .respond_with(ResponseTemplate::new(status).set_body_json(body))
    .mount(server)
    .await;
}

fn client(server: &MockServer) -> FundamentalsClient {
  let config = Config { max_retries: 0, ..Config::default_with_key("test_key".to_string()) }
    .with_base_url(server.uri());
  FundamentalsClient::new(config).unwrap()
}

fn statement(dates: &[&str]) -> Value {
  let reports: Vec<Value> = dates
    .iter()
    .map(|d| json!({"fiscalDateEnding": d, "reportedCurrency": "USD", "totalRevenue": "1000"}))
    .collect();
  json!({"symbol": "IBM", "annualReports": reports, "quarterlyReports": []})
}

async fn mount_statements(server: &MockServer) {
  mount(
    server,
    "OVERVIEW",
    200,
    json!({"Symbol": "IBM", "Name": "International Business Machines", "MarketCapitalization": "170000000000"}),
  )
  .await;
  mount(server, "INCOME_STATEMENT", 200, statement(&["2024-12-31", "2023-12-31"])).await;
  mount(server, "BALANCE_SHEET", 200, statement(&["2024-12-31"])).await;
  mount(server, "CASH_FLOW", 200, statement(&["2024-12-31"])).await;
}

#[tokio::test]
async fn test_fetch_statement_set() {
  let server = MockServer::start().await;
  mount_statements(&server).await;
  mount(
    &server,
    "GLOBAL_QUOTE",
    200,
    json!({"Global Quote": {"01. symbol": "IBM", "05. price": "185.20", "08. previous close": "184.00"}}),
  )
  .await;

  let set = client(&server).fetch_statement_set("IBM").await.unwrap();

  assert_eq!(set.overview.name.as_deref(), Some("International Business Machines"));
  assert_eq!(set.income_statement.len(), 2);
  assert_eq!(set.balance_sheet.len(), 1);
  assert_eq!(set.cash_flow.len(), 1);
  assert_eq!(set.income_statement.latest().and_then(|r| r.period_end()), Some("2024-12-31"));
  let quote = set.quote.expect("quote");
  assert_eq!(quote.price(), Some(&json!("185.20")));
}

#[tokio::test]
async fn test_failed_quote_leaves_quote_empty() {
  let server = MockServer::start().await;
  mount_statements(&server).await;
  mount(&server, "GLOBAL_QUOTE", 500, json!({})).await;

  let set = client(&server).fetch_statement_set("IBM").await.unwrap();
  assert!(set.quote.is_none());
  assert_eq!(set.income_statement.len(), 2);
}

#[tokio::test]
async fn test_provider_error_message() {
  let server = MockServer::start().await;
  mount(
    &server,
    "OVERVIEW",
    200,
    json!({"Error Message": "Invalid API call. Please retry or visit the documentation"}),
  )
  .await;

  let err = client(&server).fetch_statement_set("IBM").await.unwrap_err();
  assert!(matches!(err, Error::Api(_)), "got {err:?}");
}

#[tokio::test]
async fn test_http_error_status() {
  let server = MockServer::start().await;
  mount(&server, "INCOME_STATEMENT", 503, json!({})).await;

  let err = client(&server).fundamentals().income_statement("IBM").await.unwrap_err();
  match err {
    Error::Http(msg) => assert!(msg.contains("503"), "{msg}"),
    other => panic!("expected Http error, got {other:?}"),
  }
}

#[tokio::test]
async fn test_call_frequency_note() {
  let server = MockServer::start().await;
  mount(
    &server,
    "CASH_FLOW",
    200,
    json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}),
  )
  .await;

  let err = client(&server).fundamentals().cash_flow("IBM").await.unwrap_err();
  assert!(matches!(err, Error::RateLimit(_)));
}
