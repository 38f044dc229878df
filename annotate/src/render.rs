//! Drawing labeled boxes onto images for visual inspection.

use crate::{common::*, draw, font::TextStyle, source};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

/// Gap between the label text baseline and the top edge of its box.
const LABEL_MARGIN: i64 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub box_format: BoxFormat,
    pub anchor: Anchor,
    pub coords_are_normalized: bool,
    /// Display names by class id.
    pub class_label_map: Option<HashMap<u32, String>>,
    /// Box colors by display name.
    pub color_map: Option<HashMap<String, Rgb<u8>>>,
    pub default_color: Rgb<u8>,
    pub box_thickness: u32,
    pub show_label: bool,
    pub font_scale: f64,
    pub font_thickness: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            box_format: BoxFormat::Xyxy,
            anchor: Anchor::Center,
            coords_are_normalized: false,
            class_label_map: None,
            color_map: None,
            default_color: GREEN,
            box_thickness: 2,
            show_label: true,
            font_scale: 0.5,
            font_thickness: 1,
        }
    }
}

impl RenderOptions {
    pub fn class_name(&self, class_id: u32) -> String {
        self.class_label_map
            .as_ref()
            .and_then(|map| map.get(&class_id))
            .cloned()
            .unwrap_or_else(|| format!("Class {}", class_id))
    }

    pub fn color_of(&self, name: &str) -> Rgb<u8> {
        self.color_map
            .as_ref()
            .and_then(|map| map.get(name))
            .copied()
            .unwrap_or(self.default_color)
    }
}

/// A box to draw, in the coordinate convention given by [RenderOptions].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBox {
    pub components: Vec<f64>,
    pub class_id: u32,
    pub score: Option<f64>,
}

impl FromStr for RenderBox {
    type Err = Error;

    /// Parses a label line `class c0 c1 c2 c3`. The components are kept as
    /// written and interpreted by [render] according to its options.
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
        let components: Vec<f64> = tokens[1..]
            .iter()
            .map(|token| {
                token
                    .parse()
                    .with_context(|| format!("invalid coordinate '{}'", token))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            components,
            class_id,
            score: None,
        })
    }
}

/// Parses label file contents into boxes to draw. Blank lines are ignored.
pub fn parse_render_boxes(text: &str) -> Result<Vec<RenderBox>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.parse()
                .with_context(|| format!("invalid label line {}", index + 1))
        })
        .collect()
}

/// Draws `boxes` on a copy of `image`.
///
/// Every box is converted before anything is drawn, so a malformed box fails
/// the call without a partially drawn result.
pub fn render(
    image: &RgbImage,
    boxes: &[RenderBox],
    options: &RenderOptions,
) -> Result<RgbImage, ConvertError> {
    let size = Size::from_pixels(image.width(), image.height())?;
    let normalized_to = options.coords_are_normalized.then(|| &size);

    let pixel_boxes: Vec<PixelXyxy> = boxes
        .iter()
        .map(|rbox| {
            let raw = BBox::try_new(&rbox.components, options.box_format)?;
            bbox::canonicalize(&raw, options.anchor, normalized_to).truncate()
        })
        .collect::<Result<_, _>>()?;

    let style = TextStyle::new(options.font_scale, options.font_thickness);
    let mut canvas = image.clone();

    for (rbox, pixel_box) in boxes.iter().zip(&pixel_boxes) {
        let name = options.class_name(rbox.class_id);
        let color = options.color_of(&name);
        draw::draw_rect(&mut canvas, pixel_box, color, options.box_thickness);

        if options.show_label {
            let text = match rbox.score {
                Some(score) => format!("{} {:.2}", name, score),
                None => name,
            };
            draw_label(&mut canvas, pixel_box, &text, color, &style);
        }
    }

    Ok(canvas)
}

/// Puts `text` on a filled background right above the box's top-left corner.
fn draw_label(
    canvas: &mut RgbImage,
    pixel_box: &PixelXyxy,
    text: &str,
    background: Rgb<u8>,
    style: &TextStyle,
) {
    let (text_w, text_h) = style.text_size(text);
    let x_min = i64::from(pixel_box.x_min);
    let y_min = i64::from(pixel_box.y_min);
    let baseline = y_min - LABEL_MARGIN;

    draw::fill_rect(
        canvas,
        x_min,
        baseline - text_h,
        x_min + text_w + 2,
        y_min,
        background,
    );
    style.draw_text(canvas, text, x_min + 1, baseline - text_h, WHITE);
}

/// Counters of a [render_label_dir] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub images_visited: usize,
    pub images_rendered: usize,
    pub images_failed: usize,
}

/// Renders the label files in `label_dir` onto their images in `image_dir`.
///
/// Images are visited in path order, at most `limit` of them. Images without
/// a label file are skipped. Annotated copies keep their file names and are
/// saved under `output_dir`. An image that fails to render is logged and
/// counted, and the pass goes on.
pub fn render_label_dir(
    image_dir: impl AsRef<Path>,
    label_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    limit: Option<usize>,
    options: &RenderOptions,
) -> Result<RenderSummary> {
    let image_dir = image_dir.as_ref();
    let label_dir = label_dir.as_ref();
    let output_dir = output_dir.as_ref();

    ensure!(
        image_dir.is_dir(),
        "image directory '{}' does not exist",
        image_dir.display()
    );
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create '{}'", output_dir.display()))?;

    let mut summary = RenderSummary::default();

    for image_path in source::image_files(image_dir)?.take(limit.unwrap_or(usize::MAX)) {
        summary.images_visited += 1;

        let result = image_path
            .map_err(Error::from)
            .and_then(|image_path| render_file(&image_path, label_dir, output_dir, options));
        match result {
            Ok(true) => summary.images_rendered += 1,
            Ok(false) => {}
            Err(err) => {
                warn!("{:#}", err);
                summary.images_failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Returns false when the image has no label file.
fn render_file(
    image_path: &Path,
    label_dir: &Path,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<bool> {
    let label_path = match label::label_file_path(label_dir, image_path) {
        Some(path) if path.is_file() => path,
        _ => {
            debug!("no label file for '{}'", image_path.display());
            return Ok(false);
        }
    };

    let text = fs::read_to_string(&label_path)
        .with_context(|| format!("failed to read label file '{}'", label_path.display()))?;
    let boxes = parse_render_boxes(&text)
        .with_context(|| format!("failed to parse '{}'", label_path.display()))?;
    let image = image::open(image_path)
        .with_context(|| format!("failed to open image '{}'", image_path.display()))?
        .to_rgb8();
    let annotated = render(&image, &boxes, options)
        .with_context(|| format!("failed to render '{}'", label_path.display()))?;

    let file_name = image_path
        .file_name()
        .ok_or_else(|| format_err!("invalid image path '{}'", image_path.display()))?;
    let output_path = output_dir.join(file_name);
    annotated
        .save(&output_path)
        .with_context(|| format!("failed to save '{}'", output_path.display()))?;

    info!(
        "rendered {} boxes on '{}'",
        boxes.len(),
        output_path.display()
    );
    Ok(true)
}

/// Reads a class names file. Line `N` names class `N`.
pub fn load_class_names(path: impl AsRef<Path>) -> Result<HashMap<u32, String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read class names '{}'", path.display()))?;
    let names: Vec<_> = text.lines().map(|line| line.trim().to_owned()).collect();

    ensure!(
        names.iter().collect::<HashSet<_>>().len() == names.len(),
        "duplicated class names found in '{}'",
        path.display()
    );
    ensure!(!names.is_empty(), "no classes found in '{}'", path.display());

    let map = (0..).zip(names).collect();
    Ok(map)
}
