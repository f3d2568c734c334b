//! Configuration parsing for visualisation files.

pub mod style;
pub mod visualization;
