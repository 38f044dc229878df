pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::{Anchor, BBox, BoxFormat, ConvertError, PixelXyxy, Size, Xyxy};
pub use image::{Rgb, RgbImage};
pub use label::{Detection, Frame};
pub use log::{debug, info, warn};
pub use noisy_float::prelude::*;
pub use once_cell::sync::Lazy;
pub use semver::{Version, VersionReq};
pub use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize};
pub use std::{
    collections::{HashMap, HashSet},
    fmt, fs, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
