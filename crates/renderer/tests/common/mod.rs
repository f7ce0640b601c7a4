#![allow(dead_code)]

use batch::{BatchBuilder, Edit};
use bus::Bus;
use core_types::ComponentId;
use html::snapshot::DomSnapshot;
use html::{Document, NodeId};
use renderer::{RendererConfig, WebRenderer};

pub const ROOT: ComponentId = ComponentId(1);

/// A renderer over `<body><div id="app"></div></body>` with [`ROOT`]
/// attached to `#app`.
pub fn app() -> (WebRenderer, NodeId) {
    app_with(RendererConfig::default())
}

pub fn app_with(config: RendererConfig) -> (WebRenderer, NodeId) {
    let mut doc = Document::with_body();
    let body = doc.body().unwrap();
    let app = doc.create_element("div");
    doc.set_attribute(app, "id", "app");
    doc.append_child(body, app).unwrap();
    let mut renderer = WebRenderer::new(config, doc);
    let attached = renderer.attach_root_component("#app", ROOT).unwrap();
    assert_eq!(attached, app);
    (renderer, app)
}

/// Same as [`app`], with outbound messages captured on a bus.
pub fn connected_app() -> (WebRenderer, NodeId, Bus) {
    let (mut renderer, app) = app();
    let bus = Bus::new();
    renderer.connect(bus.client_tx.clone());
    (renderer, app, bus)
}

pub fn lines(renderer: &WebRenderer, node: NodeId) -> Vec<String> {
    DomSnapshot::children(renderer.document(), node)
        .as_lines()
        .to_vec()
}

pub fn prepend(sibling_index: u32, reference_frame_index: u32) -> Edit {
    Edit::PrependFrame {
        sibling_index,
        reference_frame_index,
    }
}

/// Build a single-diff batch for [`ROOT`].
pub fn root_batch(build: impl FnOnce(&mut BatchBuilder) -> Vec<Edit>) -> Vec<u8> {
    let mut builder = BatchBuilder::new();
    let edits = build(&mut builder);
    builder.component_diff(ROOT, edits);
    builder.build()
}

/// `<ul>` holding one `<li>` per label.
pub fn render_list(renderer: &mut WebRenderer, labels: &[&str]) {
    let bytes = root_batch(|b| {
        let ul = b.element("ul", 1 + 2 * labels.len() as u32);
        for label in labels {
            b.element("li", 2);
            b.text(label);
        }
        vec![prepend(0, ul)]
    });
    renderer.apply_batch(&bytes).unwrap();
}
