use annotate::{
    config::{AnnotationJob, Config, DetectorConfig},
    render::{self, RenderOptions},
};
use anyhow::{Context, Result};
use bbox::{Anchor, BoxFormat};
use clap::{Args, Parser};
use noisy_float::prelude::*;
use std::{env, num::NonZeroUsize, path::PathBuf};

#[derive(Debug, Clone, Parser)]
#[clap(version, about = "Auto-annotate images with object detections")]
enum Opts {
    /// Detect objects and write one label file per image
    Auto(AutoArgs),
    /// Draw label files onto their images
    Render(RenderArgs),
}

#[derive(Debug, Clone, Args)]
struct AutoArgs {
    /// job configuration file, replaces the other options
    #[clap(long, conflicts_with_all = &["image-source", "model"])]
    config: Option<PathBuf>,
    /// directory of images to annotate
    #[clap(required_unless_present = "config")]
    image_source: Option<PathBuf>,
    /// detection model
    #[clap(long, required_unless_present = "config")]
    model: Option<PathBuf>,
    /// label directory, defaults to {IMAGE_SOURCE}_auto_annotate_labels
    #[clap(long)]
    output_dir: Option<PathBuf>,
    /// compute device: cpu, cuda, cuda:N or N
    #[clap(long)]
    device: Option<String>,
    /// confidence threshold
    #[clap(long, default_value = "0.25")]
    conf: f64,
    /// IoU threshold of non-maximum suppression
    #[clap(long, default_value = "0.45")]
    iou: f64,
    /// inference size in pixels
    #[clap(long, default_value = "640")]
    imgsz: NonZeroUsize,
    /// maximum detections per image
    #[clap(long, default_value = "300")]
    max_det: NonZeroUsize,
    /// keep only these comma-separated class ids
    #[clap(long, use_value_delimiter = true)]
    classes: Vec<u32>,
}

#[derive(Debug, Clone, Args)]
struct RenderArgs {
    /// directory of images
    image_dir: PathBuf,
    /// directory of label files
    label_dir: PathBuf,
    /// directory to save annotated images
    output_dir: PathBuf,
    /// number of images to visit
    #[clap(long)]
    limit: Option<usize>,
    /// box format in label files: xyxy or xywh
    #[clap(long, default_value = "xyxy")]
    box_format: BoxFormat,
    /// anchor of xywh boxes: center or topleft
    #[clap(long, default_value = "center")]
    anchor: Anchor,
    /// box components are fractions of the image size
    #[clap(long)]
    normalized: bool,
    /// class names file, one name per line
    #[clap(long)]
    names: Option<PathBuf>,
    /// draw boxes without labels
    #[clap(long)]
    no_label: bool,
    /// box line thickness
    #[clap(long, default_value = "2")]
    thickness: u32,
    /// label text scale, in (0, 256]
    #[clap(long, default_value = "0.5", parse(try_from_str = parse_font_scale))]
    font_scale: f64,
}

const MAX_FONT_SCALE: f64 = 256.0;

fn parse_font_scale(text: &str) -> Result<f64, String> {
    let scale: f64 = text
        .parse()
        .map_err(|_| format!("invalid font scale '{}'", text))?;
    if !(scale > 0.0 && scale <= MAX_FONT_SCALE) {
        return Err(format!(
            "font scale must be in (0, {}], but get {}",
            MAX_FONT_SCALE, text
        ));
    }
    Ok(scale)
}

fn main() -> Result<()> {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Auto(args) => auto(args)?,
        Opts::Render(args) => render(args)?,
    }

    Ok(())
}

fn auto(args: AutoArgs) -> Result<()> {
    let job = match args.config.clone() {
        Some(config_file) => Config::open(&config_file)
            .with_context(|| format!("failed to load config file '{}'", config_file.display()))?
            .job(),
        None => job_from_args(args)?,
    };

    let summary = annotate::start(&job, None)?;
    println!("{}", summary);
    for failure in &summary.failures {
        println!("failed: {}", failure);
    }

    Ok(())
}

fn job_from_args(args: AutoArgs) -> Result<AnnotationJob> {
    let AutoArgs {
        image_source,
        model,
        output_dir,
        device,
        conf,
        iou,
        imgsz,
        max_det,
        classes,
        ..
    } = args;
    let image_source = image_source.context("missing image source")?;
    let model = model.context("missing --model")?;

    let detector = DetectorConfig {
        device: device.unwrap_or_default(),
        confidence_threshold: R64::try_new(conf).context("--conf must be finite")?,
        iou_threshold: R64::try_new(iou).context("--iou must be finite")?,
        input_size: imgsz,
        max_detections: max_det,
        class_filter: (!classes.is_empty()).then(|| classes.into_iter().collect()),
        ..DetectorConfig::new(model)
    };

    let job = AnnotationJob::new(image_source, detector);
    let job = match output_dir {
        Some(dir) => job.with_output_dir(dir),
        None => job,
    };
    Ok(job)
}

fn render(args: RenderArgs) -> Result<()> {
    let RenderArgs {
        image_dir,
        label_dir,
        output_dir,
        limit,
        box_format,
        anchor,
        normalized,
        names,
        no_label,
        thickness,
        font_scale,
    } = args;

    let class_label_map = names.map(render::load_class_names).transpose()?;
    let options = RenderOptions {
        box_format,
        anchor,
        coords_are_normalized: normalized,
        class_label_map,
        show_label: !no_label,
        box_thickness: thickness,
        font_scale,
        ..RenderOptions::default()
    };

    let summary = render::render_label_dir(&image_dir, &label_dir, &output_dir, limit, &options)?;
    println!(
        "{} images visited, {} rendered, {} failed",
        summary.images_visited, summary.images_rendered, summary.images_failed
    );

    Ok(())
}
