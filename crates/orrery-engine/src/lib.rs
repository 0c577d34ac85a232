pub mod api;
pub mod bridge;
pub mod core;
pub mod error;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::ViewConfig;
pub use api::types::{Rgb, Rgba};
pub use api::view::OrreryView;
pub use bridge::document::{PersistStatus, SceneDocument};
pub use core::rng::{hsl_to_rgb, random_color, Rng};
pub use core::scene::{Planet, Scene, Star};
pub use core::time::{AnimationClock, LoopHandle, LoopToken};
pub use error::{DocumentError, ExportError};
pub use input::controller::{InputController, InteractionState};
pub use input::event::{InputEvent, Touches};
pub use renderer::camera::{project, Camera, Projection, Viewport};
pub use renderer::traits::Surface;
pub use systems::render::{build_frame, render_frame, Frame};

#[cfg(feature = "raster")]
pub use bridge::export::{encode_png, render_snapshot};
#[cfg(feature = "raster")]
pub use renderer::raster::RasterSurface;
