mod backend;
mod class_names;
mod detection;
mod model_artifacts;

pub use backend::*;
pub use class_names::*;
pub use detection::*;
pub use model_artifacts::*;
