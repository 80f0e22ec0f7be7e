mod native_engine;
mod native_library;
mod staging;

pub use native_engine::{EngineLoader, NativeEngine};
pub use native_library::{LibraryLoader, NativeLibrary};
pub use staging::StagedBuffer;
