pub use crate::error::ConvertError;
pub use num_traits::{Float, NumCast, ToPrimitive};
pub use serde::{Deserialize, Serialize};
pub use std::{fmt, str::FromStr};

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
