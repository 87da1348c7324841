//! Output destinations

pub mod level_writer;
pub mod memory;
pub mod rotating_file;

pub use level_writer::{shared, LevelWrite, LevelWriter, SharedWriter};
pub use memory::MemoryWriter;
pub use rotating_file::{RotatingFile, RotationPolicy};
