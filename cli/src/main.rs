//! yolo2page CLI - YOLO segmentation labels to PAGE-XML

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use yolo2page::model::Role;
use yolo2page::parser::{CompositeObserver, EventCollector, LayoutEvent, LogObserver};
use yolo2page::render::{emit, NodeKind};
use yolo2page::{
    BatchConverter, ClassMapping, JsonFormat, LayoutOptions, OutputFormat, PageConverter,
    RenderOptions,
};

#[derive(Parser)]
#[command(name = "yolo2page")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert YOLO segmentation labels to nested PAGE-XML", long_about = None)]
struct Cli {
    /// Label file (.txt) or labels directory
    #[arg(value_name = "LABELS")]
    labels: Option<PathBuf>,

    /// Image file or images directory
    #[arg(value_name = "IMAGES")]
    images: Option<PathBuf>,

    #[command(flatten)]
    options: ConvertArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a label file or a directory of label files
    Convert {
        /// Label file (.txt) or labels directory
        #[arg(value_name = "LABELS")]
        labels: PathBuf,

        /// Image file or images directory
        #[arg(value_name = "IMAGES")]
        images: PathBuf,

        #[command(flatten)]
        options: ConvertArgs,
    },

    /// Show the region hierarchy built for one label file
    Inspect {
        /// Label file (.txt)
        #[arg(value_name = "LABELS")]
        labels: PathBuf,

        /// Image file
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// JSON class mapping file
        #[arg(short, long, value_name = "FILE", env = "YOLO2PAGE_MAPPING")]
        mapping: Option<PathBuf>,
    },

    /// Validate and print a class mapping file
    Mapping {
        /// JSON class mapping file (the default mapping if omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct ConvertArgs {
    /// Output file (single file) or directory (batch)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// JSON class mapping file
    #[arg(short, long, value_name = "FILE", env = "YOLO2PAGE_MAPPING")]
    mapping: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "xml")]
    format: Format,

    /// Write compact output without indentation
    #[arg(long)]
    compact: bool,

    /// Minimum containment for nesting a region (exclusive)
    #[arg(long, value_name = "RATIO", default_value = "0.5")]
    region_threshold: f64,

    /// Minimum share of a line a region must cover (exclusive)
    #[arg(long, value_name = "RATIO", default_value = "0.1")]
    line_overlap: f64,

    /// Process everything on one thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// PAGE-XML
    Xml,
    /// JSON dump of the region tree
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xml => OutputFormat::PageXml,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Some(Commands::Convert {
            labels,
            images,
            options,
        }) => cmd_convert(&labels, &images, &options),
        Some(Commands::Inspect {
            labels,
            image,
            mapping,
        }) => cmd_inspect(&labels, &image, mapping.as_deref()),
        Some(Commands::Mapping { file }) => cmd_mapping(file.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match (cli.labels, cli.images) {
            (Some(labels), Some(images)) => cmd_convert(&labels, &images, &cli.options),
            _ => {
                println!("{}", "Usage: yolo2page <LABELS> <IMAGES> [OPTIONS]".yellow());
                println!("       yolo2page --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn build_converter(options: &ConvertArgs) -> Result<PageConverter, Box<dyn std::error::Error>> {
    let mapping = ClassMapping::load_or_default(options.mapping.as_deref())?;

    let layout = LayoutOptions::new()
        .with_region_threshold(options.region_threshold)
        .with_line_overlap_fraction(options.line_overlap)
        .with_parallel(!options.sequential);

    let mut render = RenderOptions::new().with_format(options.format.into());
    if options.compact {
        render = render.with_indent(0).with_json_format(JsonFormat::Compact);
    }
    log::debug!("Mapping: {} classes", mapping.len());
    log::debug!("Layout options: {:?}", layout);
    log::debug!("Render options: {:?}", render);

    Ok(PageConverter::new(mapping)
        .with_layout_options(layout)
        .with_render_options(render))
}

fn cmd_convert(
    labels: &Path,
    images: &Path,
    options: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = build_converter(options)?;

    if labels.is_file() && yolo2page::discover::is_label_file(labels) {
        if !images.is_file() {
            return Err("For single file conversion, provide a single image file".into());
        }
        let output = options
            .output
            .clone()
            .unwrap_or_else(|| labels.with_extension(converter.render_options().format.extension()));

        let result = converter.convert_to_path(labels, images, &output)?;
        println!("{} {}", "Saved to".green(), output.display());
        print_document_stats(&result.stats);
        Ok(())
    } else if labels.is_dir() && images.is_dir() {
        cmd_convert_dir(converter, labels, images, options)
    } else {
        Err("Provide either two files (txt and image) or two folders (labels and images)".into())
    }
}

fn cmd_convert_dir(
    converter: PageConverter,
    labels: &Path,
    images: &Path,
    options: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut batch = BatchConverter::new(converter).with_parallel(!options.sequential);
    if let Some(ref dir) = options.output {
        batch = batch.with_output_dir(dir);
    }

    let total = batch.count_labels(labels)?;
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = batch.run_with_progress(labels, images, |label| {
        let name = label.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(name.into_owned());
        pb.inc(1);
    })?;
    pb.finish_with_message("Done!");

    println!();
    println!("{}", "Conversion Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Output".bold(), batch.output_dir_for(labels).display());
    println!("{}: {}", "Converted".bold(), report.converted.to_string().green());
    let failed = report.failed().to_string();
    if report.is_success() {
        println!("{}: {}", "Failed".bold(), failed);
    } else {
        println!("{}: {}", "Failed".bold(), failed.red());
        for failure in &report.failures {
            let name = failure.label.file_name().unwrap_or_default().to_string_lossy();
            println!("  {} {}: {}", "✗".red(), name, failure.error);
        }
    }
    print_document_stats(&report.stats);

    Ok(())
}

fn print_document_stats(stats: &yolo2page::ConversionStats) {
    println!(
        "{}: {} placed, {} in new regions",
        "Lines".bold(),
        stats.placed_lines,
        stats.orphan_lines
    );
    println!(
        "{}: {} top-level, {} nested, {} promoted, {} opaque",
        "Regions".bold(),
        stats.top_regions,
        stats.nested_regions,
        stats.promoted_regions,
        stats.opaque_regions
    );
    if stats.skipped_labels() > 0 {
        println!(
            "{}: {} malformed, {} unmapped",
            "Skipped".yellow().bold(),
            stats.malformed_lines,
            stats.unmapped_labels
        );
    }
}

fn cmd_inspect(
    labels: &Path,
    image: &Path,
    mapping: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mapping = ClassMapping::load_or_default(mapping)?;
    let converter = PageConverter::new(mapping);

    let mut events = EventCollector::new();
    let mut log = LogObserver::for_source(labels.display().to_string());
    let result = {
        let mut observers = CompositeObserver::new()
            .with_observer(&mut events)
            .with_observer(&mut log);
        converter.convert_file_with(labels, image, &mut observers)?
    };

    let page = &result.page;
    println!("{}", "Page".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Image".bold(), page.image.filename);
    println!("{}: {}x{}", "Size".bold(), page.image.width, page.image.height);
    println!();

    println!("{}", "Hierarchy".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let tree = emit(page);
    if tree.nodes.is_empty() {
        println!("{}", "(empty)".dimmed());
    }
    tree.walk(|node, depth| {
        let indent = "  ".repeat(depth);
        let label = match node.kind {
            NodeKind::TextLine => node.kind.element_name().normal(),
            NodeKind::TextRegion => node.kind.element_name().green(),
            NodeKind::Opaque(_) => node.kind.element_name().blue(),
        };
        match node.region_type {
            Some(ref region_type) => {
                println!("{}{} {} [{}]", indent, label, node.id.bold(), region_type)
            }
            None => println!("{}{} {}", indent, label, node.id.bold()),
        }
    });

    println!();
    println!("{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print_document_stats(&result.stats);

    let skips: Vec<&LayoutEvent> = events.events.iter().filter(|e| e.is_skip()).collect();
    if !skips.is_empty() {
        println!();
        println!("{}", "Skipped Labels".yellow().bold());
        println!("{}", "─".repeat(40).dimmed());
        for event in skips {
            match event {
                LayoutEvent::MalformedLine { line_index, reason } => {
                    println!("  line {}: {}", line_index + 1, reason)
                }
                LayoutEvent::UnmappedClass {
                    line_index,
                    class_id,
                } => println!("  line {}: unmapped class {}", line_index + 1, class_id),
                LayoutEvent::InvalidPolygon { id } => println!("  {}: invalid polygon", id),
                _ => {}
            }
        }
    }

    Ok(())
}

fn cmd_mapping(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mapping = match file {
        Some(path) => ClassMapping::from_path(path)?,
        None => ClassMapping::default(),
    };

    println!("{}", "Class Mapping".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (class_id, rule) in mapping.iter() {
        let role = match rule.role {
            Role::Leaf => "line".to_string(),
            Role::TopRegion => "top-level region".to_string(),
            Role::NestableRegion => "nested region".to_string(),
            Role::Opaque(kind) => format!("opaque ({})", kind),
        };
        let subtype = rule.subtype.as_deref().unwrap_or("-");
        println!(
            "{}  {:<18} {:<18} {}",
            format!("{:>4}", class_id).bold(),
            rule.element.name(),
            role,
            subtype.dimmed()
        );
    }
    println!("\n{} {} classes", "Valid:".green().bold(), mapping.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "yolo2page".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("YOLO segmentation labels to PAGE-XML converter");
    println!();
    println!("License: MIT");
}
