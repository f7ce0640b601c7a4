#![no_main]

use core_types::ComponentId;
use html::Document;
use libfuzzer_sys::fuzz_target;
use renderer::{RendererConfig, WebRenderer};

fuzz_target!(|data: &[u8]| {
    let mut doc = Document::with_body();
    let Some(body) = doc.body() else {
        return;
    };
    let app = doc.create_element("div");
    doc.set_attribute(app, "id", "app");
    if doc.append_child(body, app).is_err() {
        return;
    }

    let mut renderer = WebRenderer::new(RendererConfig::default(), doc);
    if renderer.attach_root_component("#app", ComponentId(1)).is_err() {
        return;
    }
    // Errors are fine; panics are not. The second pass hits the
    // non-pending root path.
    let _ = renderer.apply_batch(data);
    let _ = renderer.apply_batch(data);
});
