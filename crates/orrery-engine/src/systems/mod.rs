pub mod render;
pub mod ring;
