#![no_main]

use batch::RenderBatch;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(batch) = RenderBatch::new(data) else {
        return;
    };
    // Counts come straight from the input; cap them.
    for diff in batch.updated_components().take(4096).flatten() {
        for _edit in diff.edits().take(4096) {}
    }
    let frames = batch.reference_frames();
    for index in 0..frames.len().min(4096) {
        if let Ok(frame) = frames.frame(index) {
            for field in frame_strings(&frame) {
                let _ = batch.read_string(field);
            }
        }
    }
    for index in 0..batch.disposed_component_ids_len().min(4096) {
        let _ = batch.disposed_component_id(index);
    }
    for index in 0..batch.disposed_event_handler_ids_len().min(4096) {
        let _ = batch.disposed_event_handler_id(index);
    }
});

fn frame_strings(frame: &batch::Frame) -> Vec<batch::StringIndex> {
    use batch::Frame;
    match *frame {
        Frame::Element { name, .. } => vec![name],
        Frame::Text { content } | Frame::Markup { content } => vec![content],
        Frame::Attribute { name, value, .. } => vec![name, value],
        Frame::ElementReferenceCapture {
            reference_capture_id,
        } => vec![reference_capture_id],
        Frame::Component { .. } | Frame::Region { .. } => Vec::new(),
    }
}
