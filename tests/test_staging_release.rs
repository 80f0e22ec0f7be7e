extern crate yolo_detect;

use yolo_detect::data::BboxT;
use yolo_detect::detection_runners::StagedBuffer;
use yolo_detect::{DetectError, DetectionSession};

mod fake_engine;

use fake_engine::{config, model_dir, FakeHost, FakeLoader, FakeState};

// Kept as the only test in this binary: it reads the process-wide staged buffer count.
#[test]
fn staged_buffers_are_released_on_every_path() {
    let (_dir, artifacts) = model_dir(&["person"]);
    let state = FakeState::with_entries(&[BboxT::new(0, 1, 1, 1, 1, 0.5)]);
    let session = DetectionSession::with_parts(&config(artifacts), &FakeHost::cpu_only(), &FakeLoader::new(state.clone())).unwrap();
    assert_eq!(StagedBuffer::live_count(), 0);

    session.detect_bytes(b"ok").unwrap();
    assert_eq!(StagedBuffer::live_count(), 0);

    *state.detect_return.lock() = Some(-2);
    assert!(matches!(session.detect_bytes(b"native failure"), Err(DetectError::NativeEngine { .. })));
    assert_eq!(StagedBuffer::live_count(), 0);

    *state.detect_return.lock() = None;
    state.entries.lock()[0].obj_id = 4;
    assert!(matches!(session.detect_bytes(b"decode failure"), Err(DetectError::UnknownClassId { .. })));
    assert_eq!(StagedBuffer::live_count(), 0);

    session.dispose();
    assert!(matches!(session.detect_bytes(b"disposed"), Err(DetectError::SessionDisposed)));
    assert_eq!(StagedBuffer::live_count(), 0);
}
