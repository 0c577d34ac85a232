pub mod camera;
#[cfg(feature = "raster")]
pub mod raster;
pub mod traits;

// Re-export key types for convenient access
pub use traits::{Ellipse, GradientStop, RadialGradient, Surface};
