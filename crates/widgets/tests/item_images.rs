//! Item-image widget flows against a recording transport.

use core::cell::Cell;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use component::{PanelSession, properties};
use dom::{Document, HostFunction, NodeId, SelectedFile};
use fetch::{Client, FetchConfig, Method, RecordingTransport, Response};
use forms::RESPONSE_WIDGET_CLASS;
use serde_json::json;
use tokio::task::{LocalSet, yield_now};
use widgets::{ItemImage, ItemImageWidgets, ItemImagesCommand};

const PAGE: &str = r#"
<div class="left">
    <x-item-images-button text="Images" item_id="42"></x-item-images-button>
    <x-item-images-button text="Images" item_id="43"></x-item-images-button>
</div>
<div class="right"></div>
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn settle() {
    for _ in 0..16 {
        yield_now().await;
    }
}

struct Fixture {
    document: Document,
    transport: RecordingTransport,
    widgets: ItemImageWidgets,
}

impl Fixture {
    fn new() -> Result<Self> {
        let transport = RecordingTransport::new();
        let client = Client::new(transport.clone(), FetchConfig::default());
        Ok(Self {
            document: Document::new(),
            widgets: ItemImageWidgets::new(&client)?,
            transport,
        })
    }

    fn mounted_container(&self) -> Result<NodeId> {
        let container = self.document.create_element("div");
        self.document.append_child(self.document.root(), container)?;
        Ok(container)
    }

    fn last_request_line(&self) -> Option<String> {
        self.transport
            .requests()
            .last()
            .map(|request| format!("{} {}", request.method, request.url))
    }
}

fn image(id: &str, alt_text: &str) -> ItemImage {
    ItemImage {
        id: id.to_owned(),
        item_id: "42".to_owned(),
        alt_text: alt_text.to_owned(),
        priority: 0,
        original_file_name: "lamp.png".to_owned(),
    }
}

fn counter() -> (Rc<Cell<u32>>, HostFunction) {
    let count = Rc::new(Cell::new(0));
    let calls = Rc::clone(&count);
    let function = HostFunction::from_action(move || {
        calls.set(calls.get() + 1);
        Ok(())
    });
    (count, function)
}

fn button_of(document: &Document, host: NodeId) -> Result<NodeId> {
    document
        .elements_by_tag_name(host, "button")
        .first()
        .copied()
        .ok_or_else(|| anyhow!("element has no button"))
}

/// Tests that the images button toggles the panel and loads the list
#[tokio::test]
async fn test_images_button_toggles_panel() -> Result<()> {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let fixture = Fixture::new()?;
            let document = &fixture.document;
            let session = PanelSession::new();
            fixture.widgets.define_images_button(document, session.clone())?;
            document.append_html(document.root(), PAGE)?;

            let hosts = document.elements_by_tag_name(document.root(), "x-item-images-button");
            assert_eq!(hosts.len(), 2);
            assert_eq!(document.text_content(hosts[0]), "Images");
            let panel = document.elements_by_class_name(document.root(), "right")[0];

            fixture.transport.push_response(
                Response::new(200, "OK").with_body(serde_json::to_vec(&[image("7", "front"), image("8", "")])?),
            );
            document.click(button_of(document, hosts[0])?)?;
            settle().await;
            assert_eq!(
                fixture.last_request_line().as_deref(),
                Some("GET https://127.0.0.1:1443/api/item/42/image")
            );
            assert_eq!(session.open_key().as_deref(), Some("42"));
            let items = document.elements_by_tag_name(panel, "li");
            assert_eq!(items.len(), 2);
            let link = document.elements_by_tag_name(items[0], "a")[0];
            assert_eq!(
                document.get_attribute(link, "href").as_deref(),
                Some("https://127.0.0.1:1443/volatile/images/42_7_lamp.png")
            );
            assert!(document.text_content(items[0]).starts_with("7 [front]X"));
            assert!(document.text_content(panel).contains("Item images"));

            // Another item replaces the open panel.
            fixture.transport.push_response(Response::new(200, "OK").with_body("[]"));
            document.click(button_of(document, hosts[1])?)?;
            settle().await;
            assert_eq!(session.open_key().as_deref(), Some("43"));
            assert!(document.elements_by_tag_name(panel, "li").is_empty());
            let list = document.elements_by_tag_name(panel, "ol")[0];
            assert_eq!(document.text_content(list), "None");
            assert_eq!(document.elements_by_tag_name(panel, "h2").len(), 1);

            // Clicking the open item again closes it without a request.
            document.click(button_of(document, hosts[1])?)?;
            settle().await;
            assert_eq!(session.open_key(), None);
            assert!(document.children(panel).is_empty());
            assert_eq!(fixture.transport.requests().len(), 2);
            Ok(())
        })
        .await
}

/// Tests that a failed load is reported in the panel and a later load recovers
#[tokio::test]
async fn test_images_list_failure_and_refetch() -> Result<()> {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let fixture = Fixture::new()?;
            let container = fixture.mounted_container()?;
            let list = fixture
                .widgets
                .images_list()
                .call(&fixture.document, properties! { "item_id" => "42" })?;
            list.append_self(container)?;

            fixture.transport.push_response(Response::new(503, "Service Unavailable"));
            list.dispatch(ItemImagesCommand::Fetch)?;
            settle().await;
            assert!(
                fixture
                    .document
                    .text_content(container)
                    .contains("Error: 503 Service Unavailable")
            );

            fixture
                .transport
                .push_response(Response::new(200, "OK").with_body(json!([image("7", "front")]).to_string()));
            list.dispatch(ItemImagesCommand::Fetch)?;
            settle().await;
            assert!(!fixture.document.text_content(container).contains("Error"));
            assert_eq!(fixture.document.elements_by_tag_name(container, "li").len(), 1);
            Ok(())
        })
        .await
}

/// Tests deleting an image: request, status widget and refetch
#[tokio::test]
async fn test_list_item_delete() -> Result<()> {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let fixture = Fixture::new()?;
            let container = fixture.mounted_container()?;
            let (refetches, refetch_images) = counter();
            let entry = fixture.widgets.list_item().call(
                &fixture.document,
                properties! {
                    "item_image" => image("7", "front").to_property()?,
                    "refetch_images" => refetch_images,
                },
            )?;
            entry.append_self(container)?;

            fixture.transport.push_response(Response::new(204, "No Content"));
            fixture.document.click(button_of(&fixture.document, container)?)?;
            settle().await;
            assert_eq!(
                fixture.last_request_line().as_deref(),
                Some("DELETE https://127.0.0.1:1443/api/item/42/image/7")
            );
            assert_eq!(refetches.get(), 1);
            assert!(
                fixture
                    .document
                    .text_content(container)
                    .contains("Response status: 204 No Content")
            );

            fixture.transport.push_response(Response::new(500, "Internal Server Error"));
            entry.dispatch(ItemImagesCommand::Delete)?;
            settle().await;
            assert_eq!(refetches.get(), 1);
            let text = fixture.document.text_content(container);
            assert!(text.contains("Error: 500 Internal Server Error"));
            assert!(text.contains("Response status: 500 Internal Server Error"));
            Ok(())
        })
        .await
}

/// Tests upload validation and the upload request
#[tokio::test]
async fn test_upload_form() -> Result<()> {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let fixture = Fixture::new()?;
            let document = &fixture.document;
            let container = fixture.mounted_container()?;
            let (refetches, refetch_images) = counter();
            let form = fixture.widgets.upload_form().call(
                document,
                properties! { "item_id" => "42", "refetch_images" => refetch_images },
            )?;
            form.append_self(container)?;

            let inputs = document.elements_by_tag_name(container, "input");
            let (alt_text_input, file_input) = (inputs[0], inputs[1]);
            let divs = document.elements_by_tag_name(container, "div");
            let error_container = divs[1];

            form.dispatch(ItemImagesCommand::Upload)?;
            assert_eq!(document.text_content(error_container), "Alt text required");

            document.set_attribute(alt_text_input, "value", "front view")?;
            form.dispatch(ItemImagesCommand::Upload)?;
            assert_eq!(document.text_content(error_container), "File required");
            assert!(fixture.transport.requests().is_empty());

            document.set_files(file_input, vec![SelectedFile::new("lamp.png", b"PNG".as_slice())])?;
            fixture.transport.push_response(Response::new(201, "Created"));
            form.dispatch(ItemImagesCommand::Upload)?;
            assert_eq!(document.text_content(error_container), "");
            settle().await;

            let requests = fixture.transport.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].method, Method::POST);
            assert_eq!(
                requests[0].url.as_str(),
                "https://127.0.0.1:1443/api/item/42/image?alt_text=front+view&original_file_name=lamp.png"
            );
            assert_eq!(requests[0].body.as_deref(), Some(b"PNG".as_slice()));
            assert_eq!(refetches.get(), 1);
            assert!(document.text_content(container).contains("Response status: 201 Created"));
            Ok(())
        })
        .await
}

/// Tests that deletions and uploads share one status widget definition
#[tokio::test]
async fn test_status_widget_is_shared() -> Result<()> {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let fixture = Fixture::new()?;
            let shared = fixture.widgets.clone();
            assert!(shared.response_widget().ptr_eq(fixture.widgets.response_widget()));

            let container = fixture.mounted_container()?;
            let entry = fixture
                .widgets
                .list_item()
                .call(&fixture.document, properties! { "item_image" => image("7", "").to_property()? })?;
            entry.append_self(container)?;
            fixture.transport.push_response(Response::new(204, "No Content"));
            fixture.transport.push_response(Response::new(204, "No Content"));
            entry.dispatch(ItemImagesCommand::Delete)?;
            entry.dispatch(ItemImagesCommand::Delete)?;
            settle().await;

            let statuses = fixture.document.elements_by_class_name(container, RESPONSE_WIDGET_CLASS);
            assert_eq!(statuses.len(), 2);
            assert_ne!(statuses[0], statuses[1]);
            Ok(())
        })
        .await
}
