use crate::{common::*, LabelRecord};

pub const LABEL_FILE_EXTENSION: &str = "txt";

/// The label file of an image: `{label_dir}/{image_stem}.txt`.
pub fn label_file_path(label_dir: impl AsRef<Path>, image_path: impl AsRef<Path>) -> Option<PathBuf> {
    let mut file_name = image_path.as_ref().file_stem()?.to_os_string();
    file_name.push(".");
    file_name.push(LABEL_FILE_EXTENSION);
    Some(label_dir.as_ref().join(file_name))
}

/// Serializes records, one newline-terminated line each.
pub fn encode_label_file(records: &[LabelRecord]) -> String {
    records.iter().fold(String::new(), |mut text, record| {
        text.push_str(&record.to_string());
        text.push('\n');
        text
    })
}

/// Parses label file contents. Blank lines are ignored.
pub fn parse_label_file(text: &str) -> Result<Vec<LabelRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.parse()
                .with_context(|| format!("invalid label record at line {}", index + 1))
        })
        .collect()
}

pub fn read_label_file(path: impl AsRef<Path>) -> Result<Vec<LabelRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read label file '{}'", path.display()))?;
    parse_label_file(&text).with_context(|| format!("failed to parse '{}'", path.display()))
}

/// Writes a label file as a whole or not at all.
///
/// The content goes into a temporary file in the same directory, which is then
/// renamed over `path`. An error on the way leaves any previous file at `path`
/// untouched and removes the temporary file.
pub fn write_label_file(path: impl AsRef<Path>, records: &[LabelRecord]) -> io::Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let text = encode_label_file(records);

    let mut file = tempfile::Builder::new()
        .prefix(".label-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(class_id: u32, xyxy: [f64; 4]) -> LabelRecord {
        LabelRecord {
            class_id,
            bbox: Xyxy::try_from_xyxy(xyxy).unwrap(),
        }
    }

    #[test]
    fn label_path_from_image_stem() {
        let path = label_file_path("/labels", "/images/crowd.01.jpg").unwrap();
        assert_eq!(path, Path::new("/labels/crowd.01.txt"));
        assert!(label_file_path("/labels", "/").is_none());
    }

    #[test]
    fn encode_then_parse() {
        let records = vec![
            record(0, [10.0, 10.0, 30.0, 20.0]),
            record(2, [0.5, 0.25, 99.75, 49.5]),
        ];
        let text = encode_label_file(&records);
        assert_eq!(text, "0 10.0 10.0 30.0 20.0\n2 0.5 0.25 99.75 49.5\n");
        assert_eq!(parse_label_file(&text).unwrap(), records);
    }

    #[test]
    fn parse_reports_line_number() {
        let err = parse_label_file("0 1 2 3 4\n\n0 1 2\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "stale\n").unwrap();

        write_label_file(&path, &[record(1, [1.0, 2.0, 3.0, 4.0])]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 1.0 2.0 3.0 4.0\n");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }
}
