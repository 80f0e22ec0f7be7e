use serde::{Deserialize, Serialize};

/// One recognized object, in source-image pixel coordinates.
///
/// `confidence` is the engine's own score. It is not guaranteed to lie in `0..=1`,
/// only compare it against thresholds chosen for the model in use.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
    pub class_id: u32,
    pub label: String,
}

impl Detection {
    pub fn new(class_id: u32, label: &str, confidence: f32) -> Self {
        Self {
            class_id,
            label: label.to_string(),
            confidence,
            ..Default::default()
        }
    }

    /// Sets the box using `(x, y, w, h)` with `(x, y)` the top-left corner.
    ///
    /// # Arguments
    ///
    /// * `x` - The x-coordinate of the top-left corner.
    /// * `y` - The y-coordinate of the top-left corner.
    /// * `w` - The width of the box.
    /// * `h` - The height of the box.
    pub fn with_xy_wh(mut self, x: u32, y: u32, w: u32, h: u32) -> Self {
        self.x = x;
        self.y = y;
        self.width = w;
        self.height = h;
        self
    }
}
