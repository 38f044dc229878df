//! Detections, the label records derived from them and the label file codec.

mod common;

pub mod detection;
pub use detection::*;

pub mod record;
pub use record::*;

pub mod label_file;
pub use label_file::*;
