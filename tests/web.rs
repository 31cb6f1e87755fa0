#![cfg(target_arch = "wasm32")]

use medea_constraints_playground::{
    media::{
        CaptureRequest, ConstraintName, ConstraintSet, ConstraintValue,
        MediaDevices as _, MediaKind, MediaTrack as _,
    },
    platform::{self, WebMediaDevices},
    conf::ConfError,
    Conf, ConstraintsPlayground,
};
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

/// Appends a new `<div>` with the provided `id` to the document body.
fn mount_root(id: &str) -> HtmlElement {
    let document = platform::window().document().unwrap();
    let root: HtmlElement =
        document.create_element("div").unwrap().unchecked_into();
    root.set_id(id);
    document.body().unwrap().append_child(&root).unwrap();
    root
}

#[wasm_bindgen_test]
fn undefined_config_is_default() {
    assert_eq!(Conf::from_js(&JsValue::UNDEFINED).unwrap(), Conf::default());
    assert_eq!(Conf::from_js(&JsValue::NULL).unwrap(), Conf::default());
}

#[wasm_bindgen_test]
fn reads_config_object() {
    let config =
        js_sys::JSON::parse(r#"{"rootElementId": "app", "autoplay": false}"#)
            .unwrap();

    let conf = Conf::from_js(&config).unwrap();

    assert_eq!(conf.root_element_id, "app");
    assert!(!conf.autoplay);
}

#[wasm_bindgen_test]
fn rejects_malformed_config_object() {
    let config = js_sys::JSON::parse(r#"{"autoplay": "sure"}"#).unwrap();

    let err = Conf::from_js(&config).unwrap_err();

    assert!(matches!(err.as_ref(), ConfError::Parse(_)));
}

#[wasm_bindgen_test]
fn rejects_cyclic_config_object() {
    let config = js_sys::Object::new();
    js_sys::Reflect::set(&config, &JsValue::from_str("self"), &config)
        .unwrap();

    let err = Conf::from_js(&config).unwrap_err();

    assert!(matches!(err.as_ref(), ConfError::NotSerializable(_)));
}

#[wasm_bindgen_test]
fn discovers_supported_constraints() {
    let supported = WebMediaDevices.supported_constraints().unwrap();

    assert!(supported.contains(&ConstraintName::Width.into()));
}

#[wasm_bindgen_test]
async fn applies_constraints_to_camera_track() {
    let tracks = WebMediaDevices
        .get_user_media(CaptureRequest {
            video: true,
            audio: Some(false),
        })
        .await
        .unwrap();
    assert_eq!(tracks.len(), 1);
    let track = &tracks[0];
    assert_eq!(track.kind(), MediaKind::Video);

    let constraints = ConstraintSet::from_entries(vec![(
        ConstraintName::Width,
        ConstraintValue::UnsignedLong(320),
    )]);
    track.apply_constraints(&constraints).await.unwrap();

    assert!(track.settings().get("width").is_some());
    track.stop();
}

#[wasm_bindgen_test]
async fn mounts_and_disposes_page() {
    let root = mount_root("playground-root");
    let config = js_sys::JSON::parse(
        r#"{
            "rootElementId": "playground-root",
            "logLevel": "DEBUG",
            "initialConstraints": {"width": 640}
        }"#,
    )
    .unwrap();

    let playground = ConstraintsPlayground::new(config).unwrap();

    assert_eq!(root.child_element_count(), 1);
    assert!(root.get_elements_by_tag_name("li").length() > 0);
    assert_eq!(playground.constraints(), r#"{"width":640}"#);
    assert!(!playground.is_enabled());

    playground.update_constraint("width", JsValue::NULL);
    assert_eq!(playground.constraints(), "{}");

    playground.dispose();
    assert_eq!(root.child_element_count(), 0);
    root.remove();
}

#[wasm_bindgen_test]
fn fails_without_root_element() {
    let config =
        js_sys::JSON::parse(r#"{"rootElementId": "missing-root"}"#).unwrap();

    assert!(ConstraintsPlayground::new(config).is_err());
}
