use iscslayer_api::Client;
use iscslayer_lib::{assemble_record, PortalSession, RetryConfig, SlayerError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 1,
        base_delay_ms: 10,
        max_delay_ms: 20,
    }
}

fn session(server: &MockServer) -> PortalSession {
    PortalSession::new(Client::with_base_url(&server.uri()).unwrap())
        .with_retry_config(fast_retry())
}

fn summary_page(policy_number: &str, app_id: &str) -> String {
    format!(
        "<html><body><table class='table searchResults'><tbody>\
         <tr class='itemRow rowEven' data-id='{app_id}'>\
         <td><input type='checkbox' value='{app_id}'></td>\
         <td><a href='/amp/detail/view/{app_id}'>{app_id}</a></td>\
         <td>{policy_number}</td>\
         <td><span class='label label-success'>Active</span></td>\
         <td>Acme Widgets &amp; Sons LLC</td>\
         <td>TX</td>\
         <td>Contractors GL</td>\
         <td>$1,250.00</td>\
         <td>06/13/2025</td>\
         </tr></tbody></table></body></html>"
    )
}

fn empty_results_page() -> String {
    "<html><body><table class='table searchResults'><tbody></tbody></table></body></html>"
        .to_string()
}

fn detail_page_with_term(term: &str) -> String {
    format!(
        "<html><body><dl class='dl-horizontal'>\
         <dt>Status:</dt><dd>Active</dd>\
         <dt>Policy Term:</dt>\n<dd> {term} </dd>\
         </dl></body></html>"
    )
}

fn cancelled_detail_page(term: &str, cancelled: &str) -> String {
    format!(
        "<html><body><dl class='dl-horizontal'>\
         <dt>Status:</dt><dd>Cancelled</dd>\
         <dt>Policy Term:</dt>\n<dd> {term} </dd>\
         <dt>Cancellation Date:</dt>\n<dd> {cancelled} </dd>\
         </dl></body></html>"
    )
}

async fn mount_summary(server: &MockServer, policy_number: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/amp/search/advancedsearch"))
        .and(query_param("policy_number", policy_number))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, app_id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/amp/detail/view/{}", app_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn merges_detail_dates_over_summary() {
    let server = MockServer::start().await;
    mount_summary(&server, "SCB-GL-000077835", summary_page("SCB-GL-000077835", "482913")).await;
    mount_detail(&server, "482913", detail_page_with_term("06/13/2025 - 06/13/2026")).await;

    let session = session(&server);
    let record = assemble_record(&session, "SCB-GL-000077835").await.unwrap();

    assert_eq!(record.policy_number, "SCB-GL-000077835");
    assert_eq!(record.app_id, "482913");
    assert_eq!(record.status, "Active");
    assert_eq!(record.applicant_company, "Acme Widgets & Sons LLC");
    assert_eq!(record.state, "TX");
    assert_eq!(record.program, "Contractors GL");
    assert_eq!(record.total_cost, "$1,250.00");
    assert_eq!(record.effective_date, "06/13/2025");
    assert_eq!(record.expiration_date, "06/13/2026");
    assert_eq!(record.cancellation_date, None);
}

#[tokio::test]
async fn not_found_when_search_has_no_row() {
    let server = MockServer::start().await;
    mount_summary(&server, "SCB-GL-000000000", empty_results_page()).await;

    let session = session(&server);
    let result = assemble_record(&session, "SCB-GL-000000000").await;

    match result {
        Err(err) => assert!(err.is_not_found()),
        Ok(_) => panic!("expected a not-found failure"),
    }
}

#[tokio::test]
async fn detail_failure_degrades_to_summary_only() {
    let server = MockServer::start().await;
    mount_summary(&server, "SCB-GL-000077888", summary_page("SCB-GL-000077888", "482914")).await;
    Mock::given(method("GET"))
        .and(path("/amp/detail/view/482914"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let session = session(&server);
    let record = assemble_record(&session, "SCB-GL-000077888").await.unwrap();

    // Summary data survives; the detail-only fields stay empty.
    assert_eq!(record.effective_date, "06/13/2025");
    assert_eq!(record.expiration_date, "");
    assert_eq!(record.cancellation_date, None);
}

#[tokio::test]
async fn extraction_miss_keeps_summary_effective_date() {
    let server = MockServer::start().await;
    mount_summary(&server, "SCB-GL-000077925", summary_page("SCB-GL-000077925", "482915")).await;
    mount_detail(
        &server,
        "482915",
        "<html><body><p>Nothing date-shaped here</p></body></html>".to_string(),
    )
    .await;

    let session = session(&server);
    let record = assemble_record(&session, "SCB-GL-000077925").await.unwrap();

    assert_eq!(record.effective_date, "06/13/2025");
    assert_eq!(record.expiration_date, "");
}

#[tokio::test]
async fn cancellation_date_is_additive() {
    let server = MockServer::start().await;
    mount_summary(&server, "SCB-GL-000078314", summary_page("SCB-GL-000078314", "482916")).await;
    mount_detail(
        &server,
        "482916",
        cancelled_detail_page("06/13/2025 - 06/13/2026", "03/15/2025"),
    )
    .await;

    let session = session(&server);
    let record = assemble_record(&session, "SCB-GL-000078314").await.unwrap();

    assert_eq!(record.cancellation_date.as_deref(), Some("03/15/2025"));
    assert_eq!(record.expiration_date, "06/13/2026");
}

#[tokio::test]
async fn summary_retry_recovers_from_transient_error() {
    let server = MockServer::start().await;
    // First attempt fails, the single retry lands on the real page.
    Mock::given(method("GET"))
        .and(path("/amp/search/advancedsearch"))
        .respond_with(ResponseTemplate::new(500).set_body_string("flaky"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_summary(&server, "SCB-GL-000077835", summary_page("SCB-GL-000077835", "482913")).await;
    mount_detail(&server, "482913", detail_page_with_term("06/13/2025 - 06/13/2026")).await;

    let session = session(&server);
    let record = assemble_record(&session, "SCB-GL-000077835").await.unwrap();
    assert_eq!(record.expiration_date, "06/13/2026");
}

#[tokio::test]
async fn summary_failure_after_retry_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/amp/search/advancedsearch"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let session = session(&server);
    let result = assemble_record(&session, "SCB-GL-000077835").await;
    assert!(matches!(result, Err(SlayerError::Api(_))));
}

#[tokio::test]
async fn assembly_is_deterministic() {
    let server = MockServer::start().await;
    mount_summary(&server, "SCB-GL-000077835", summary_page("SCB-GL-000077835", "482913")).await;
    mount_detail(&server, "482913", detail_page_with_term("06/13/2025 - 06/13/2026")).await;

    let session = session(&server);
    let first = assemble_record(&session, "SCB-GL-000077835").await.unwrap();
    let second = assemble_record(&session, "SCB-GL-000077835").await.unwrap();
    assert_eq!(first, second);
}
