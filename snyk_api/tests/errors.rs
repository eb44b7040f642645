use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use snyk_api::types::Document;
use snyk_api::{Api, ApiError, BaseOptions, Client, Error, ErrorResponse, ListOptions, Method, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn response(status: u16, request_id: Option<&str>) -> Response {
    Response {
        method: Method::GET,
        url: Url::parse("https://api.example/rest/somepath").unwrap(),
        status: StatusCode::from_u16(status).unwrap(),
        headers: HeaderMap::new(),
        snyk_request_id: request_id.map(str::to_string),
        links: None,
    }
}

fn api_error(title: Option<&str>, detail: &str) -> ApiError {
    ApiError {
        detail: detail.to_string(),
        id: None,
        status: "401".to_string(),
        title: title.map(str::to_string),
    }
}

async fn fetch_error(status: u16, body: &str) -> Error {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/123"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-token").unwrap();
    client
        .get::<Document<serde_json::Value>, _>(Api::Rest, "orgs/123", &BaseOptions::new("2024-10-15"))
        .await
        .unwrap_err()
}

/// Serves one connection with `raw` as the whole reply, then closes it.
async fn serve_raw_once(raw: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket.write_all(raw).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{}", addr)
}

// -- message formatting --

#[test]
fn message_without_request_id() {
    let err = ErrorResponse {
        response: response(401, None),
        errors: vec![api_error(Some(""), "Invalid auth token provided")],
    };
    assert_eq!(
        err.to_string(),
        "GET https://api.example/rest/somepath: 401 Invalid auth token provided"
    );
}

#[test]
fn message_with_request_id() {
    let err = ErrorResponse {
        response: response(401, Some("abc-123")),
        errors: vec![api_error(None, "Invalid auth token provided")],
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"GET https://api.example/rest/somepath: 401 (snyk-request-id: abc-123) Invalid auth token provided"
    );
}

#[test]
fn message_joins_titles_in_order() {
    let err = ErrorResponse {
        response: response(400, None),
        errors: vec![api_error(Some("A"), "first"), api_error(Some("B"), "second")],
    };
    assert_eq!(
        err.to_string(),
        "GET https://api.example/rest/somepath: 400 A, B"
    );
}

#[test]
fn message_uses_first_detail_line_when_title_missing() {
    let err = ErrorResponse {
        response: response(400, None),
        errors: vec![
            api_error(None, "line one\nline two"),
            api_error(Some("Title"), "ignored"),
        ],
    };
    assert_eq!(
        err.to_string(),
        "GET https://api.example/rest/somepath: 400 line one, Title"
    );
}

#[test]
fn message_without_errors_has_no_trailing_text() {
    let err = ErrorResponse {
        response: response(502, Some("r-1")),
        errors: Vec::new(),
    };
    assert_eq!(
        err.to_string(),
        "GET https://api.example/rest/somepath: 502 (snyk-request-id: r-1)"
    );
}

#[test]
fn api_variant_displays_as_error_response() {
    let err = Error::from(ErrorResponse {
        response: response(401, None),
        errors: vec![api_error(None, "Invalid auth token provided")],
    });
    assert_eq!(
        err.to_string(),
        "GET https://api.example/rest/somepath: 401 Invalid auth token provided"
    );
    assert_eq!(err.status(), Some(401));
}

// -- normalization over HTTP --

#[tokio::test]
async fn rest_error_body_is_normalized() {
    let err = fetch_error(403, &load_fixture("error_rest.json")).await;
    let resp = err.as_error_response().expect("expected Error::Api");

    assert_eq!(resp.response.status.as_u16(), 403);
    assert_eq!(resp.errors.len(), 2);
    assert_eq!(
        resp.errors[0].id.as_deref(),
        Some("f16c31b5-6129-4571-add8-d589da9be524")
    );
    assert_eq!(resp.errors[0].title.as_deref(), Some("Forbidden"));
    assert_eq!(resp.errors[0].status, "403");
    assert_eq!(resp.errors[1].detail, "Token is missing the org.read permission");
    assert_eq!(resp.errors[1].title, None);
    assert!(err
        .to_string()
        .ends_with("/orgs/123?version=2024-10-15: 403 Forbidden, Token is missing the org.read permission"));
}

#[tokio::test]
async fn details_field_is_coalesced_into_detail() {
    let body = r#"{"errors":[{"status":"400","details":"limit must be at most 100"}]}"#;
    let err = fetch_error(400, body).await;
    let resp = err.as_error_response().unwrap();
    assert_eq!(resp.errors[0].detail, "limit must be at most 100");
}

#[tokio::test]
async fn rest_error_with_empty_fields_still_parses() {
    let body = r#"{"errors":[{"detail":"","status":"","title":""}]}"#;
    let err = fetch_error(409, body).await;
    let resp = err.as_error_response().unwrap();
    assert_eq!(resp.errors, vec![ApiError::default()]);
}

#[tokio::test]
async fn legacy_error_body_is_normalized() {
    let err = fetch_error(401, &load_fixture("error_legacy.json")).await;
    let resp = err.as_error_response().unwrap();

    assert_eq!(
        resp.errors,
        vec![ApiError {
            detail: "Invalid auth token provided".to_string(),
            id: None,
            status: "401".to_string(),
            title: None,
        }]
    );
    assert!(err.to_string().ends_with(": 401 Invalid auth token provided"));
}

#[tokio::test]
async fn empty_error_body_gives_empty_error_list() {
    let err = fetch_error(503, "").await;
    let resp = err.as_error_response().unwrap();
    assert!(resp.errors.is_empty());
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn plain_text_error_body_is_kept_verbatim() {
    let err = fetch_error(502, "Bad Gateway: upstream timed out").await;

    match &err {
        Error::UndecodableError { status, body } => {
            assert_eq!(*status, 502);
            assert_eq!(body, "Bad Gateway: upstream timed out");
        }
        other => panic!("expected UndecodableError, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "failed to decode Snyk API error response; status: 502, body: Bad Gateway: upstream timed out"
    );
    assert!(err.as_error_response().is_none());
}

#[tokio::test]
async fn json_without_known_shape_is_undecodable() {
    let err = fetch_error(500, r#"{"oops": true}"#).await;
    assert!(matches!(err, Error::UndecodableError { status: 500, .. }));
}

#[tokio::test]
async fn request_id_header_is_captured() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/orgs/123"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("snyk-request-id", "6f1c0f9e-req")
                .set_body_string(r#"{"errors":[{"status":"404","title":"Not Found","detail":"org not found"}]}"#),
        )
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-token").unwrap();
    let err = client
        .request_empty(Method::DELETE, Api::Rest, "orgs/123", None::<&()>)
        .await
        .unwrap_err();

    let url = format!("{}/orgs/123", mock_server.uri());
    assert_eq!(
        err.to_string(),
        format!("DELETE {}: 404 (snyk-request-id: 6f1c0f9e-req) Not Found", url)
    );
}

#[tokio::test]
async fn unreadable_error_body_gives_empty_error_list() {
    let base = serve_raw_once(
        b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nabc",
    )
    .await;

    let client = Client::with_base_url(&base, "test-token").unwrap();
    let err = client
        .list_page::<serde_json::Value>(Api::Rest, "orgs", &ListOptions::new("2024-10-15"))
        .await
        .unwrap_err();

    let resp = err.as_error_response().expect("expected Error::Api");
    assert!(resp.errors.is_empty());
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn unreadable_success_body_is_a_transport_error() {
    let base = serve_raw_once(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"data\"").await;

    let client = Client::with_base_url(&base, "test-token").unwrap();
    let result = client
        .list_page::<serde_json::Value>(Api::Rest, "orgs", &ListOptions::new("2024-10-15"))
        .await;
    assert!(matches!(result, Err(Error::Transport(_))));
}
