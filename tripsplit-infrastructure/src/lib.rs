#![warn(clippy::uninlined_format_args)]

pub mod json_repository;
pub mod memory_repository;
pub mod svg_renderer;

pub use json_repository::JsonFileTripRepository;
pub use memory_repository::InMemoryTripRepository;
pub use svg_renderer::{RenderError, svg_to_png};
