//! Status checking and error routing of `fetch_checked`.

use core::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use dom::Document;
use fetch::{Body, Client, FetchConfig, FetchError, FetchOptions, RecordingTransport, Request, Response, fetch_checked};
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (RecordingTransport, Client) {
    let transport = RecordingTransport::new();
    let client = Client::new(transport.clone(), FetchConfig::default());
    (transport, client)
}

/// Tests a plain text fetch
#[tokio::test]
async fn test_text_body() -> Result<()> {
    init_logging();
    let (transport, client) = setup();
    transport.push_response(Response::new(200, "OK").with_body("hello"));
    let url = client.config().api_endpoint(&["item"])?;

    let body = fetch_checked(&client, Request::get(url.clone()), FetchOptions::new()).await?;
    assert_eq!(body, Body::Text("hello".to_owned()));
    assert_eq!(transport.requests().first().map(|request| request.url.clone()), Some(url));
    Ok(())
}

/// Tests JSON parsing of the body
#[tokio::test]
async fn test_json_body() -> Result<()> {
    init_logging();
    let (transport, client) = setup();
    transport.push_response(Response::new(200, "OK").with_body(r#"[{"id": "a"}]"#));
    let url = client.config().api_endpoint(&["item"])?;

    let body = fetch_checked(&client, Request::get(url), FetchOptions::new().json()).await?;
    assert_eq!(body.as_json(), Some(&json!([{"id": "a"}])));
    Ok(())
}

/// Tests that a failure status is written into the error target
#[tokio::test]
async fn test_status_error_routed() -> Result<()> {
    init_logging();
    let (transport, client) = setup();
    let document = Document::new();
    let target = document.create_element("div");
    document.append_text(target, "old content")?;
    transport.push_response(Response::new(404, "Not Found").with_body("missing"));

    let url = client.config().api_endpoint(&["item", "9"])?;
    let result = fetch_checked(&client, Request::get(url), FetchOptions::new().error_target(&document, target)).await;
    assert_eq!(
        result,
        Err(FetchError::Status {
            status: 404,
            status_text: "Not Found".to_owned()
        })
    );
    assert_eq!(document.text_content(target), "Error: 404 Not Found");
    Ok(())
}

/// Tests that the response handler sees the response before the status check
#[tokio::test]
async fn test_response_handler_runs_first() -> Result<()> {
    init_logging();
    let (transport, client) = setup();
    transport.push_response(Response::new(500, "Internal Server Error"));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let handler_seen = Rc::clone(&seen);

    let url = client.config().api_endpoint(&["item"])?;
    let options = FetchOptions::new().response_handler(move |response| {
        handler_seen.borrow_mut().push(response.status);
        Ok(())
    });
    let result = fetch_checked(&client, Request::get(url), options).await;
    assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
    assert_eq!(*seen.borrow(), vec![500]);
    Ok(())
}

/// Tests transport and body failures
#[tokio::test]
async fn test_transport_and_body_errors() -> Result<()> {
    init_logging();
    let (transport, client) = setup();
    let document = Document::new();
    let target = document.create_element("div");
    transport.push_error(FetchError::Transport("connection refused".to_owned()));
    transport.push_response(Response::new(200, "OK").with_body("not json"));

    let url = client.config().api_endpoint(&["item"])?;
    let options = FetchOptions::new().error_target(&document, target).json();
    let first = fetch_checked(&client, Request::get(url.clone()), options.clone()).await;
    assert!(matches!(first, Err(FetchError::Transport(_))));
    assert_eq!(document.text_content(target), "NetworkError: connection refused");

    let second = fetch_checked(&client, Request::get(url), options).await;
    assert!(matches!(second, Err(FetchError::Body(_))));
    assert!(document.text_content(target).starts_with("SyntaxError: "));
    Ok(())
}
