use crate::{common::*, ImageError};

/// Extensions recognized as images, compared case-insensitively.
pub const IMG_FORMATS: &[&str] = &[
    "bmp", "dng", "jpeg", "jpg", "mpo", "png", "tif", "tiff", "webp", "pfm",
];

pub fn is_image_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let has_image_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMG_FORMATS
                .iter()
                .any(|format| ext.eq_ignore_ascii_case(format))
        });
    has_image_ext && path.is_file()
}

/// Lists the images directly under `dir` in path order.
///
/// Entries are produced lazily. An entry that cannot be inspected is reported
/// as an [ImageError] instead of ending the listing.
pub fn image_files(dir: &Path) -> Result<impl Iterator<Item = Result<PathBuf, ImageError>>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| format_err!("non UTF-8 path '{}'", dir.display()))?;
    let pattern = Path::new(&glob::Pattern::escape(dir_str)).join("*");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| format_err!("non UTF-8 path '{}'", dir.display()))?;

    let paths = glob::glob(pattern)?.filter_map(|entry| match entry {
        Ok(path) => is_image_file(&path).then(|| Ok(path)),
        Err(err) => Some(Err(ImageError::new(err.path(), err.error()))),
    });
    Ok(paths)
}
