#[path = "common/mod.rs"]
mod support;

use batch::{BatchBuilder, Edit};
use core_types::{ComponentId, EventHandlerId};
use renderer::{Malformed, Missing, RenderError, Unsupported};
use support::{ROOT, app, lines, prepend, render_list, root_batch};

#[test]
fn element_with_attribute_and_text() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        let div = b.element("div", 3);
        b.attribute("id", "x");
        b.text("hi");
        vec![prepend(0, div)]
    });
    renderer.apply_batch(&bytes).unwrap();

    assert_eq!(lines(&renderer, app), ["<div id=\"x\">", "  \"hi\""]);
    let div = renderer.renderer().logical().child(app, 0).unwrap();
    assert_eq!(renderer.renderer().logical().children(div).len(), 1);
}

#[test]
fn element_without_children_is_still_inserted() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        let hr = b.element("hr", 2);
        b.attribute("class", "rule");
        vec![prepend(0, hr)]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(lines(&renderer, app), ["<hr class=\"rule\">"]);
}

#[test]
fn inserts_and_removes_track_logical_child_counts() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        let a = b.text("a");
        let c = b.text("c");
        let bb = b.text("b");
        vec![prepend(0, a), prepend(1, c), prepend(1, bb)]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(lines(&renderer, app), ["\"a\"", "\"b\"", "\"c\""]);
    assert_eq!(renderer.renderer().logical().children(app).len(), 3);

    let bytes = root_batch(|_| {
        vec![
            Edit::RemoveFrame { sibling_index: 0 },
            Edit::RemoveFrame { sibling_index: 1 },
        ]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(lines(&renderer, app), ["\"b\""]);
    assert_eq!(renderer.renderer().logical().children(app).len(), 1);
}

#[test]
fn update_text_replaces_content() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| vec![prepend(0, b.text("before"))]);
    renderer.apply_batch(&bytes).unwrap();

    let bytes = root_batch(|b| {
        vec![Edit::UpdateText {
            sibling_index: 0,
            reference_frame_index: b.text("after"),
        }]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(lines(&renderer, app), ["\"after\""]);
}

#[test]
fn update_text_on_an_element_is_malformed() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| vec![prepend(0, b.element("p", 1))]);
    renderer.apply_batch(&bytes).unwrap();
    let p = renderer.renderer().logical().child(app, 0).unwrap();

    let bytes = root_batch(|b| {
        vec![Edit::UpdateText {
            sibling_index: 0,
            reference_frame_index: b.text("x"),
        }]
    });
    assert_eq!(
        renderer.apply_batch(&bytes),
        Err(RenderError::MalformedBatch(Malformed::NotText(p)))
    );
}

#[test]
fn step_in_and_out_address_nested_children() {
    let (mut renderer, app) = app();
    render_list(&mut renderer, &["one", "two"]);

    let bytes = root_batch(|b| {
        let three = b.element("li", 2);
        b.text("three");
        vec![
            Edit::StepIn { sibling_index: 0 },
            prepend(2, three),
            Edit::StepIn { sibling_index: 0 },
            Edit::UpdateText {
                sibling_index: 0,
                reference_frame_index: b.text("uno"),
            },
            Edit::StepOut,
            Edit::StepOut,
            prepend(1, b.text("after list")),
        ]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(
        lines(&renderer, app),
        [
            "<ul>",
            "  <li>",
            "    \"uno\"",
            "  <li>",
            "    \"two\"",
            "  <li>",
            "    \"three\"",
            "\"after list\"",
        ]
    );
}

#[test]
fn region_frames_insert_their_children_inline() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        let region = b.region(3);
        b.text("a");
        b.element("i", 1);
        vec![prepend(0, region), prepend(2, b.text("tail"))]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(lines(&renderer, app), ["\"a\"", "<i>", "\"tail\""]);
}

#[test]
fn nested_element_subtrees_are_skipped_after_insertion() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        let outer = b.element("div", 6);
        b.element("span", 2);
        b.text("inner");
        b.region(2);
        b.text("from region");
        b.text("last");
        vec![prepend(0, outer)]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(
        lines(&renderer, app),
        [
            "<div>",
            "  <span>",
            "    \"inner\"",
            "  \"from region\"",
            "  \"last\"",
        ]
    );
}

#[test]
fn child_components_render_after_their_comment() {
    let (mut renderer, app) = app();
    let child = ComponentId(2);
    let mut builder = BatchBuilder::new();
    let placeholder = builder.component(child, 1);
    let after = builder.text("after");
    let inner = builder.text("child content");
    builder.component_diff(ROOT, vec![prepend(0, placeholder), prepend(1, after)]);
    builder.component_diff(child, vec![prepend(0, inner)]);
    renderer.apply_batch(&builder.build()).unwrap();

    assert_eq!(
        lines(&renderer, app),
        ["<!-- ! -->", "\"child content\"", "\"after\""]
    );
    let container = renderer.renderer().logical().child(app, 0).unwrap();
    assert_eq!(renderer.renderer().component_location(child), Some(container));
}

#[test]
fn markup_is_parsed_into_a_container() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        vec![
            prepend(0, b.markup("<b>bold</b> &amp; plain")),
            prepend(1, b.text("end")),
        ]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(
        lines(&renderer, app),
        ["<!-- ! -->", "<b>", "  \"bold\"", "\" & plain\"", "\"end\""]
    );

    let bytes = root_batch(|b| {
        vec![Edit::UpdateMarkup {
            sibling_index: 0,
            reference_frame_index: b.markup("<i>new</i>"),
        }]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(
        lines(&renderer, app),
        ["<!-- ! -->", "<i>", "  \"new\"", "\"end\""]
    );
}

#[test]
fn empty_markup_still_occupies_a_slot() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| vec![prepend(0, b.markup("")), prepend(1, b.text("x"))]);
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(lines(&renderer, app), ["<!-- ! -->", "\" \"", "\"x\""]);
    assert_eq!(renderer.renderer().logical().children(app).len(), 2);
}

#[test]
fn svg_children_are_created_in_the_svg_namespace() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        let svg = b.element("svg", 4);
        b.attribute("viewBox", "0 0 10 10");
        b.element("circle", 1);
        b.markup("<rect/>");
        vec![prepend(0, svg)]
    });
    renderer.apply_batch(&bytes).unwrap();
    assert_eq!(
        lines(&renderer, app),
        [
            "<svg:svg viewBox=\"0 0 10 10\">",
            "  <svg:circle>",
            "  <!-- ! -->",
            "  <svg:rect>",
        ]
    );
}

#[test]
fn attribute_frames_cannot_be_prepended() {
    let (mut renderer, _) = app();
    let bytes = root_batch(|b| vec![prepend(0, b.attribute("id", "x"))]);
    assert_eq!(
        renderer.apply_batch(&bytes),
        Err(RenderError::MalformedBatch(
            Malformed::AttributeFrameOutsideElement
        ))
    );
}

#[test]
fn removing_a_missing_child_is_a_missing_target() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|_| vec![Edit::RemoveFrame { sibling_index: 3 }]);
    assert_eq!(
        renderer.apply_batch(&bytes),
        Err(RenderError::MissingTarget(Missing::LogicalChild {
            parent: app,
            index: 3
        }))
    );
}

#[test]
fn unknown_component_is_a_missing_target() {
    let (mut renderer, _) = app();
    let mut builder = BatchBuilder::new();
    builder.component_diff(ComponentId(9), Vec::new());
    assert_eq!(
        renderer.apply_batch(&builder.build()),
        Err(RenderError::MissingTarget(Missing::Component(ComponentId(9))))
    );
}

#[test]
fn truncated_batches_are_rejected() {
    let (mut renderer, _) = app();
    assert!(matches!(
        renderer.apply_batch(&[0u8; 7]),
        Err(RenderError::MalformedBatch(Malformed::Decode(_)))
    ));
}

#[test]
fn failures_leave_earlier_edits_in_place() {
    let (mut renderer, app) = app();
    let bytes = root_batch(|b| {
        vec![
            prepend(0, b.text("kept")),
            Edit::RemoveFrame { sibling_index: 5 },
            prepend(1, b.text("never")),
        ]
    });
    assert!(renderer.apply_batch(&bytes).is_err());
    assert_eq!(lines(&renderer, app), ["\"kept\""]);
}

#[test]
fn attach_to_unknown_selector_fails() {
    let (mut renderer, _) = app();
    assert_eq!(
        renderer.attach_root_component("#nope", ComponentId(5)),
        Err(RenderError::MissingTarget(Missing::Selector(
            "#nope".to_string()
        )))
    );
    assert!(matches!(
        renderer.attach_root_component("div > p", ComponentId(5)),
        Err(RenderError::UnsupportedOperation(
            Unsupported::InvalidSelector(_)
        ))
    ));
}

#[test]
fn disposal_sections_run_after_diffs() {
    let (mut renderer, app) = app();
    let child = ComponentId(2);
    let mut builder = BatchBuilder::new();
    let placeholder = builder.component(child, 1);
    let button = builder.element("button", 2);
    builder.attribute_with("onclick", Some("x"), EventHandlerId(4));
    builder.component_diff(ROOT, vec![prepend(0, placeholder), prepend(1, button)]);
    renderer.apply_batch(&builder.build()).unwrap();
    assert!(renderer.renderer().component_location(child).is_some());
    assert_eq!(renderer.renderer().delegator().store().len(), 1);

    let mut builder = BatchBuilder::new();
    builder.dispose_component(child);
    builder.dispose_event_handler(EventHandlerId(4));
    renderer.apply_batch(&builder.build()).unwrap();
    assert_eq!(renderer.renderer().component_location(child), None);
    assert!(renderer.renderer().delegator().store().is_empty());
    assert_eq!(lines(&renderer, app).len(), 2);
}
