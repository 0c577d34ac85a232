pub mod document;
#[cfg(feature = "raster")]
pub mod export;
