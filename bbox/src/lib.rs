//! Safe bounding box types and the conversions between box representations.

mod common;

pub mod error;
pub use error::*;

pub mod element;
pub use element::*;

pub mod format;
pub use format::*;

pub mod size;
pub use size::*;

pub mod xyxy;
pub use xyxy::*;

pub mod xywh;
pub use xywh::*;

pub mod pixel;
pub use pixel::*;

pub mod tagged;
pub use tagged::*;

pub mod convert;
pub use convert::*;
