#[path = "common/mod.rs"]
mod support;

use batch::{BatchBuilder, Edit};
use core_types::{ComponentId, EventHandlerId};
use html::Document;
use renderer::{RendererConfig, WebRenderer};
use support::{ROOT, app, lines, prepend, render_list, root_batch};

fn permute(entries: &[(u32, u32)]) -> Vec<u8> {
    root_batch(|_| {
        let mut edits = vec![Edit::StepIn { sibling_index: 0 }];
        edits.extend(entries.iter().map(|&(from, to)| Edit::PermutationListEntry {
            sibling_index: from,
            move_to_sibling_index: to,
        }));
        edits.push(Edit::PermutationListEnd);
        edits.push(Edit::StepOut);
        edits
    })
}

fn list_text(renderer: &WebRenderer) -> Vec<String> {
    let doc = renderer.document();
    let app = doc.query_selector("ul").unwrap().unwrap();
    doc.children(app)
        .iter()
        .map(|&li| doc.text_content(li))
        .collect()
}

fn logical_text(renderer: &WebRenderer) -> Vec<String> {
    let doc = renderer.document();
    let ul = doc.query_selector("ul").unwrap().unwrap();
    renderer
        .renderer()
        .logical()
        .children(ul)
        .iter()
        .map(|&li| doc.text_content(li))
        .collect()
}

#[test]
fn swapping_first_and_last_reverses_three_children() {
    let (mut renderer, _) = app();
    render_list(&mut renderer, &["a", "b", "c"]);

    renderer.apply_batch(&permute(&[(0, 2), (2, 0)])).unwrap();
    assert_eq!(list_text(&renderer), ["c", "b", "a"]);
    assert_eq!(logical_text(&renderer), ["c", "b", "a"]);
}

#[test]
fn identity_permutation_changes_nothing() {
    let (mut renderer, app) = app();
    render_list(&mut renderer, &["a", "b", "c"]);
    let before = lines(&renderer, app);

    renderer
        .apply_batch(&permute(&[(0, 0), (1, 1), (2, 2)]))
        .unwrap();
    assert_eq!(lines(&renderer, app), before);
    assert_eq!(logical_text(&renderer), ["a", "b", "c"]);
}

#[test]
fn rotation_moves_each_child_once() {
    let (mut renderer, _) = app();
    render_list(&mut renderer, &["a", "b", "c", "d"]);

    renderer
        .apply_batch(&permute(&[(0, 1), (1, 2), (2, 3), (3, 0)]))
        .unwrap();
    assert_eq!(list_text(&renderer), ["d", "a", "b", "c"]);
    assert_eq!(logical_text(&renderer), ["d", "a", "b", "c"]);
}

#[test]
fn permutation_moves_component_ranges_whole() {
    let (mut renderer, app) = app();
    let (first, second) = (ComponentId(2), ComponentId(3));
    let mut builder = BatchBuilder::new();
    let a = builder.component(first, 1);
    let b = builder.component(second, 1);
    let one = builder.text("1a");
    let two = builder.text("1b");
    let three = builder.text("2");
    builder.component_diff(ROOT, vec![prepend(0, a), prepend(1, b)]);
    builder.component_diff(first, vec![prepend(0, one), prepend(1, two)]);
    builder.component_diff(second, vec![prepend(0, three)]);
    renderer.apply_batch(&builder.build()).unwrap();
    assert_eq!(
        lines(&renderer, app),
        ["<!-- ! -->", "\"1a\"", "\"1b\"", "<!-- ! -->", "\"2\""]
    );

    let bytes = root_batch(|_| {
        vec![
            Edit::PermutationListEntry {
                sibling_index: 0,
                move_to_sibling_index: 1,
            },
            Edit::PermutationListEntry {
                sibling_index: 1,
                move_to_sibling_index: 0,
            },
            Edit::PermutationListEnd,
        ]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(
        lines(&renderer, app),
        ["<!-- ! -->", "\"2\"", "<!-- ! -->", "\"1a\"", "\"1b\""]
    );
    let logical = renderer.renderer().logical().children(app).to_vec();
    assert_eq!(
        logical,
        [
            renderer.renderer().component_location(second).unwrap(),
            renderer.renderer().component_location(first).unwrap(),
        ]
    );
}

#[test]
fn removing_a_container_leaves_no_side_state() {
    let (mut renderer, app) = app();
    let child = ComponentId(2);
    let mut builder = BatchBuilder::new();
    let placeholder = builder.component(child, 1);
    let text = builder.text("x");
    let button = builder.element("button", 3);
    builder.attribute_with("onclick", Some("h"), EventHandlerId(11));
    builder.attribute("__internal_stopPropagation_onclick", "");
    builder.component_diff(ROOT, vec![prepend(0, placeholder)]);
    builder.component_diff(child, vec![prepend(0, text), prepend(1, button)]);
    renderer.apply_batch(&builder.build()).unwrap();

    let logical = renderer.renderer().logical();
    let container = logical.child(app, 0).unwrap();
    let nested = logical.children(container).to_vec();
    assert_eq!(nested.len(), 2);
    assert!(renderer.renderer().delegator().tracks_element(nested[1]));
    assert!(renderer.renderer().delegator().store().is_listening("click"));

    let mut builder = BatchBuilder::new();
    builder.component_diff(ROOT, vec![Edit::RemoveFrame { sibling_index: 0 }]);
    builder.dispose_component(child);
    renderer.apply_batch(&builder.build()).unwrap();

    assert!(lines(&renderer, app).is_empty());
    let inner = renderer.renderer();
    for node in [container, nested[0], nested[1]] {
        assert!(!inner.logical().is_tracked(node), "{node} still tracked");
        assert!(!inner.delegator().tracks_element(node));
        assert!(!inner.has_deferred_value(node));
        assert!(!renderer.document().contains(node));
    }
    assert!(inner.delegator().store().is_empty());
    assert!(!inner.delegator().store().is_listening("click"));
    assert_eq!(inner.component_location(child), None);
    assert!(inner.logical().children(app).is_empty());
}

#[test]
fn removing_an_element_purges_its_descendants() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        let form = b.element("form", 4);
        b.element("input", 3);
        b.attribute("value", "typed");
        b.attribute_with("onchange", Some("h"), EventHandlerId(3));
        vec![prepend(0, form)]
    });
    renderer.apply_batch(&bytes).unwrap();
    let input = renderer.document().query_selector("input").unwrap().unwrap();
    assert!(renderer.renderer().has_deferred_value(input));

    let bytes = root_batch(|_| vec![Edit::RemoveFrame { sibling_index: 0 }]);
    renderer.apply_batch(&bytes).unwrap();
    assert!(lines(&renderer, app).is_empty());
    assert!(!renderer.renderer().has_deferred_value(input));
    assert!(!renderer.renderer().logical().is_tracked(input));
    assert!(renderer.renderer().delegator().store().is_empty());
}

#[test]
fn first_render_replaces_prerendered_children() {
    let mut doc = Document::with_body();
    let body = doc.body().unwrap();
    let app = doc.create_element("div");
    doc.set_attribute(app, "id", "app");
    let stale = doc.create_element("p");
    let stale_text = doc.create_text("loading");
    doc.append_child(body, app).unwrap();
    doc.append_child(app, stale).unwrap();
    doc.append_child(stale, stale_text).unwrap();

    let mut renderer = WebRenderer::new(RendererConfig::default(), doc);
    renderer.attach_root_component("#app", ROOT).unwrap();
    assert!(renderer.renderer().is_pending_root(ROOT));
    assert_eq!(lines(&renderer, app), ["<p>", "  \"loading\""]);

    renderer
        .apply_batch(&root_batch(|b| vec![prepend(0, b.text("ready"))]))
        .unwrap();
    assert_eq!(lines(&renderer, app), ["\"ready\""]);
    assert!(!renderer.renderer().is_pending_root(ROOT));
    assert!(!renderer.document().contains(stale));

    // Later renders keep existing content.
    renderer
        .apply_batch(&root_batch(|b| vec![prepend(1, b.text("more"))]))
        .unwrap();
    assert_eq!(lines(&renderer, app), ["\"ready\"", "\"more\""]);
}

#[test]
fn range_root_replaces_content_between_markers() {
    let mut doc = Document::with_body();
    let body = doc.body().unwrap();
    let before = doc.create_element("header");
    let start = doc.create_comment("start");
    let old = doc.create_text("prerendered");
    let end = doc.create_comment("end");
    let after = doc.create_element("footer");
    for node in [before, start, old, end, after] {
        doc.append_child(body, node).unwrap();
    }

    let mut renderer = WebRenderer::new(RendererConfig::default(), doc);
    renderer
        .attach_root_component_to_range(start, end, ROOT)
        .unwrap();
    renderer
        .apply_batch(&root_batch(|b| {
            let strong = b.element("strong", 2);
            b.text("live");
            vec![prepend(0, strong)]
        }))
        .unwrap();

    assert_eq!(
        lines(&renderer, body),
        [
            "<header>",
            "<!-- ! -->",
            "<strong>",
            "  \"live\"",
            "<footer>",
        ]
    );
    assert!(!renderer.document().contains(old));
    assert!(!renderer.document().contains(end));
    assert_eq!(renderer.renderer().logical().end(start), None);
}

#[test]
fn range_root_requires_sibling_markers() {
    let mut doc = Document::with_body();
    let body = doc.body().unwrap();
    let start = doc.create_comment("start");
    let wrapper = doc.create_element("div");
    let end = doc.create_comment("end");
    doc.append_child(body, start).unwrap();
    doc.append_child(body, wrapper).unwrap();
    doc.append_child(wrapper, end).unwrap();

    let mut renderer = WebRenderer::new(RendererConfig::default(), doc);
    assert!(
        renderer
            .attach_root_component_to_range(start, end, ROOT)
            .is_err()
    );
}

#[test]
fn focus_survives_reordering() {
    let (mut renderer, _) = app();
    let bytes = root_batch(|b| {
        let ul = b.element("ul", 5);
        b.element("li", 2);
        b.element("input", 1);
        b.element("li", 2);
        b.text("other");
        vec![prepend(0, ul)]
    });
    renderer.apply_batch(&bytes).unwrap();
    let input = renderer.document().query_selector("input").unwrap().unwrap();
    assert!(renderer.document_mut().focus(input));

    renderer.apply_batch(&permute(&[(0, 1), (1, 0)])).unwrap();
    assert_eq!(renderer.document().active_element(), Some(input));
}

#[test]
fn removing_the_focused_element_blurs() {
    let (mut renderer, _) = app();
    renderer
        .apply_batch(&root_batch(|b| vec![prepend(0, b.element("input", 1))]))
        .unwrap();
    let input = renderer.document().query_selector("input").unwrap().unwrap();
    renderer.document_mut().focus(input);

    renderer
        .apply_batch(&root_batch(|_| vec![Edit::RemoveFrame { sibling_index: 0 }]))
        .unwrap();
    assert_eq!(renderer.document().active_element(), None);
}
