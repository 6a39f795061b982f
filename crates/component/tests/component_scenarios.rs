//! Direct invocation of built components.

use anyhow::Result;
use component::{Command, ComponentBuilder, ComponentError, component, properties};
use dom::{Document, HostValue};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

enum ButtonCommand {
    Click,
    Relabel(String),
}

impl Command for ButtonCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Relabel(_) => "set_text",
        }
    }

    fn into_arguments(self) -> Vec<HostValue> {
        match self {
            Self::Click => Vec::new(),
            Self::Relabel(text) => vec![text.into()],
        }
    }
}

fn go_button() -> Result<ComponentBuilder> {
    let builder = component();
    builder
        .properties(properties! { "text" => "Go" })?
        .factory(|context| {
            let document = context.document().clone();
            let button = document.create_element("button");
            document.set_text_content(button, context.properties().require_str("text")?)?;
            context.append(button)?;

            let click_document = document.clone();
            context.add_action("click", move || click_document.set_text_content(button, "Clicked"));
            context.add_callback("set_text", move |arguments| {
                let text = arguments.first().map(ToString::to_string).unwrap_or_default();
                document.set_text_content(button, &text)?;
                Ok(HostValue::Undefined)
            });
            Ok(())
        })?;
    Ok(builder)
}

/// Tests that clicking one instance leaves the other untouched
#[test]
fn test_go_clicked_two_instances() -> Result<()> {
    init_logging();
    let document = Document::new();
    let button = go_button()?.build();
    let instance_a = button.instantiate(&document)?;
    let instance_b = button.instantiate(&document)?;

    instance_a.invoke("click", Vec::new())?;
    assert_eq!(instance_a.text_content(), "Clicked");
    assert_eq!(instance_b.text_content(), "Go");

    instance_b.dispatch(ButtonCommand::Relabel("Stop".to_owned()))?;
    assert_eq!(instance_b.text_content(), "Stop");
    instance_b.dispatch(ButtonCommand::Click)?;
    assert_eq!(instance_b.text_content(), "Clicked");
    Ok(())
}

/// Tests shallow merging of defaults and the resulting declared key set
#[test]
fn test_properties_merge() -> Result<()> {
    init_logging();
    let builder = component();
    builder
        .properties(properties! { "a" => 1.0, "b" => 2.0 })?
        .properties(properties! { "b" => 5.0 })?;
    let built = builder.build();
    assert_eq!(
        *built.definition().property_defaults(),
        properties! { "a" => 1.0, "b" => 5.0 }
    );
    Ok(())
}

/// Tests the three frozen-configuration errors
#[test]
fn test_frozen_configuration() -> Result<()> {
    init_logging();
    let builder = go_button()?;
    let first = builder.build();
    assert!(first.ptr_eq(&builder.build()));

    let errors = [
        builder.properties(properties! { "c" => 3.0 }).err(),
        builder.shadowed(true).err(),
        builder.factory(|_context| Ok(())).err(),
    ];
    for (error, operation) in errors.into_iter().zip(["properties", "shadowed", "factory"]) {
        assert_eq!(error, Some(ComponentError::ConfigurationFrozen { operation }));
    }
    assert_eq!(
        ComponentError::ConfigurationFrozen { operation: "factory" }.to_string(),
        "ConfigurationFrozenError: cannot call `factory` after the component was built"
    );
    Ok(())
}

/// Tests mounting and unmounting an instance
#[test]
fn test_append_and_remove_self() -> Result<()> {
    init_logging();
    let document = Document::new();
    let container = document.create_element("div");
    document.append_child(document.root(), container)?;
    let instance = go_button()?.build().call(&document, properties! { "text" => "Run" })?;

    instance.append_self(container)?;
    assert_eq!(document.text_content(container), "Run");
    assert!(instance.elements().iter().all(|node| document.is_connected(*node)));

    instance.remove_self();
    assert_eq!(document.text_content(container), "");
    assert_eq!(instance.text_content(), "Run");
    Ok(())
}
