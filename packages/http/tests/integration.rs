use std::time::Duration;

use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webfs_http::{Error, HttpExecutor, HttpRequest, ReqwestExecutor};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_get_buffers_full_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello, world"))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/hello", server.uri())).unwrap();

    let response = tokio::task::spawn_blocking(move || {
        let executor = ReqwestExecutor::new().unwrap();
        executor
            .execute(&HttpRequest::get(url), "webfs-test", TIMEOUT)
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    assert_eq!(&response.body[..], b"hello, world");
}

#[tokio::test]
async fn test_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "hjdicks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/ua", server.uri())).unwrap();

    let response = tokio::task::spawn_blocking(move || {
        let executor = ReqwestExecutor::new().unwrap();
        executor
            .execute(&HttpRequest::get(url), "hjdicks", TIMEOUT)
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(&response.body[..], b"matched");
}

#[tokio::test]
async fn test_sends_host_and_custom_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/host"))
        .and(header("host", "example.org"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/host", server.uri())).unwrap();

    let response = tokio::task::spawn_blocking(move || {
        let executor = ReqwestExecutor::new().unwrap();
        let request = HttpRequest::get(url)
            .with_host("example.org")
            .with_header("X-Trace", "abc");
        executor.execute(&request, "webfs", TIMEOUT).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(response.status, 204);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_response_headers_are_grouped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cookies"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "a=1")
                .append_header("Set-Cookie", "b=2")
                .insert_header("Content-Type", "text/plain"),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/cookies", server.uri())).unwrap();

    let response = tokio::task::spawn_blocking(move || {
        let executor = ReqwestExecutor::new().unwrap();
        executor
            .execute(&HttpRequest::get(url), "webfs", TIMEOUT)
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(
        response.headers.get("set-cookie").unwrap(),
        &["a=1".to_string(), "b=2".to_string()]
    );
    assert_eq!(
        response.headers.get("content-type").unwrap(),
        &["text/plain".to_string()]
    );
}

#[tokio::test]
async fn test_non_success_status_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();

    let response = tokio::task::spawn_blocking(move || {
        let executor = ReqwestExecutor::new().unwrap();
        executor
            .execute(&HttpRequest::get(url), "webfs", TIMEOUT)
            .unwrap()
    })
    .await
    .unwrap();

    assert!(response.is_client_error());
    assert_eq!(&response.body[..], b"gone");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();

    let result = tokio::task::spawn_blocking(move || {
        let executor = ReqwestExecutor::new().unwrap();
        executor.execute(
            &HttpRequest::get(url),
            "webfs",
            Duration::from_millis(100),
        )
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(Error::Timeout { .. })));
}
