pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::{Anchor, BBox, BoxFormat, ConvertError, Size, Xyxy};
pub use std::{
    fmt,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    str::FromStr,
};
