//! CPU raster helpers: compositing, resampling, caption rasterization and tile fan-out.

pub(crate) mod caption;
pub(crate) mod composite;
pub(crate) mod partition;
pub(crate) mod resample;
