use crate::common::{ClassNameTable, Detection};
use crate::data::RawDetections;
use crate::error::DetectError;

/// Turns the engine's fixed-capacity output into detections.
///
/// Only the first `raw.count()` slots are read. Slots with zero width and zero height are
/// unused and skipped. Order is the engine's; nothing is sorted. A class id missing from
/// `names` fails the whole decode.
pub fn process_predictions(raw: &RawDetections, names: &ClassNameTable) -> crate::Result<Vec<Detection>> {
    raw.entries()
        .iter()
        .filter(|bbox| !bbox.is_degenerate())
        .map(|bbox| {
            let label = names.get(bbox.obj_id).ok_or_else(|| DetectError::UnknownClassId {
                class_id: bbox.obj_id,
                known: names.len(),
            })?;
            Ok(Detection::new(bbox.obj_id, label, bbox.prob).with_xy_wh(bbox.x, bbox.y, bbox.w, bbox.h))
        })
        .collect()
}
