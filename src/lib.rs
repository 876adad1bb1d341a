//! Awards/catalog enrichment library - shared modules for the binary and tests.

pub mod binning;
pub mod config;
pub mod error;
pub mod index;
pub mod matcher;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod safety;
pub mod sink;
pub mod source;
