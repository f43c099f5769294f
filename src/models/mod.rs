pub mod common;
pub mod image;
pub mod outcome;
pub mod plan;
pub mod poster;
pub mod text;

pub use common::*;
pub use image::*;
pub use outcome::*;
pub use plan::*;
pub use poster::*;
pub use text::*;
