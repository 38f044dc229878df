use crate::{common::*, Detection};

/// One line of a label file: a class id and a pixel-space `xyxy` box.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub class_id: u32,
    pub bbox: Xyxy<f64>,
}

impl LabelRecord {
    /// Converts a detection into its canonical persisted form.
    pub fn from_detection(
        detection: &Detection,
        anchor: Anchor,
        normalized_to: Option<&Size<f64>>,
    ) -> Result<Self, ConvertError> {
        let xyxy = bbox::canonicalize(&detection.bbox, anchor, normalized_to).xyxy();

        if !xyxy.iter().all(|value| value.is_finite()) {
            return Err(ConvertError::InvalidBox(format!(
                "box {:?} of class {} has non-finite coordinates",
                xyxy, detection.class_id
            )));
        }

        Ok(Self {
            class_id: detection.class_id,
            bbox: Xyxy::try_from_xyxy(xyxy)?,
        })
    }
}

impl fmt::Display for LabelRecord {
    /// Coordinates use the shortest representation that parses back to the
    /// same value and always carry a decimal point, e.g. `10.0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x_min, y_min, x_max, y_max] = self.bbox.xyxy();
        write!(
            f,
            "{} {:?} {:?} {:?} {:?}",
            self.class_id, x_min, y_min, x_max, y_max
        )
    }
}

impl FromStr for LabelRecord {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let tokens: Vec<_> = line.split_whitespace().collect();
        ensure!(
            tokens.len() == 5,
            "expect 5 space-separated fields, but got {}",
            tokens.len()
        );

        let class_id: u32 = tokens[0]
            .parse()
            .with_context(|| format!("invalid class id '{}'", tokens[0]))?;
        let coords: Vec<f64> = tokens[1..]
            .iter()
            .map(|token| {
                token
                    .parse()
                    .with_context(|| format!("invalid coordinate '{}'", token))
            })
            .collect::<Result<_>>()?;
        let bbox = BBox::try_new(&coords, BoxFormat::Xyxy)?.to_xyxy(Anchor::Center);

        Ok(Self { class_id, bbox })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_line() {
        let record = LabelRecord {
            class_id: 0,
            bbox: Xyxy::try_from_xyxy([10.0, 10.0, 30.0, 20.0]).unwrap(),
        };
        assert_eq!(record.to_string(), "0 10.0 10.0 30.0 20.0");

        let record = LabelRecord {
            class_id: 12,
            bbox: Xyxy::try_from_xyxy([0.5, 1.25, 100.125, 7.0]).unwrap(),
        };
        assert_eq!(record.to_string(), "12 0.5 1.25 100.125 7.0");
    }

    #[test]
    fn parse_line() {
        let record: LabelRecord = "7 1.5 2.0 3.5 4".parse().unwrap();
        assert_eq!(record.class_id, 7);
        assert_eq!(record.bbox.xyxy(), [1.5, 2.0, 3.5, 4.0]);
    }

    #[test]
    fn reject_malformed_lines() {
        assert!("7 1.5 2.0 3.5".parse::<LabelRecord>().is_err());
        assert!("x 1 2 3 4".parse::<LabelRecord>().is_err());
        assert!("-1 1 2 3 4".parse::<LabelRecord>().is_err());
        assert!("1 5 2 3 4".parse::<LabelRecord>().is_err());
    }

    #[test]
    fn reject_non_finite_detection() {
        let bbox = Xyxy::try_from_xyxy([0.0, 0.0, f64::INFINITY, 1.0]).unwrap();
        let detection = Detection::new(0, bbox, None);
        assert!(LabelRecord::from_detection(&detection, Anchor::Center, None).is_err());
    }
}
