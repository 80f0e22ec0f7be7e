//! Native result layout shared with the engine. Field order and widths must match the
//! engine's `bbox_t` / `bbox_t_container` exactly.

/// Hard upper bound on detections the engine writes per call.
pub const MAX_OBJECTS: usize = 1000;

#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct BboxT {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub prob: f32,
    pub obj_id: u32,
    pub track_id: u32,
    pub frames_counter: u32,
}

impl BboxT {
    pub const ZERO: BboxT = BboxT {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
        prob: 0.0,
        obj_id: 0,
        track_id: 0,
        frames_counter: 0,
    };

    pub fn new(obj_id: u32, x: u32, y: u32, w: u32, h: u32, prob: f32) -> Self {
        Self { x, y, w, h, prob, obj_id, ..Self::ZERO }
    }

    /// Zero width and height marks an unused slot rather than an object.
    pub fn is_degenerate(&self) -> bool {
        self.w == 0 && self.h == 0
    }
}

/// Fixed-capacity output buffer the engine fills in place.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct BboxContainer {
    pub candidates: [BboxT; MAX_OBJECTS],
}

impl Default for BboxContainer {
    fn default() -> Self {
        Self { candidates: [BboxT::ZERO; MAX_OBJECTS] }
    }
}

impl BboxContainer {
    /// Heap-allocated so the 32 KiB array never sits on a worker's stack across the native call.
    pub fn boxed() -> Box<Self> {
        Box::default()
    }
}

/// A filled container plus the count the engine returned for it.
/// Slots at or beyond `count` are stale and never read. Only [`RawDetections::new`] builds one,
/// so `count` never exceeds the container.
#[derive(Debug, Clone)]
pub struct RawDetections {
    container: Box<BboxContainer>,
    count: usize,
}

impl RawDetections {
    /// Validates the engine's return value against the container capacity.
    pub fn new(container: Box<BboxContainer>, returned: i32, operation: &'static str) -> crate::Result<Self> {
        match usize::try_from(returned) {
            Ok(count) if count <= MAX_OBJECTS => Ok(Self { container, count }),
            _ => Err(crate::DetectError::native(operation, returned)),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn entries(&self) -> &[BboxT] {
        &self.container.candidates[..self.count]
    }
}
