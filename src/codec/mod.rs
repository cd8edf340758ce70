//! Container adapters: animated GIF in and out, PNG for flattened rasters.

pub(crate) mod gif;
pub(crate) mod png;
