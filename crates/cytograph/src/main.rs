//! Command-line frontend: load a skeleton image, extract its planar
//! cell-topology graph, and write the selected output files.

// Frame coordinates are small lattice values; the casts into i32 and
// f32 are exact.
#![allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]

use std::path::{Path, PathBuf};

use clap::Parser;
use cytograph_core::{ExtractConfig, GrayImage, Pt, TissueGraph, extract};
use cytograph_export::{SvgMetadata, chord_geometry, graph_report, to_svg};
use image::{Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

/// Extract the planar cell-topology graph from a skeletonized tissue
/// image.
///
/// The graph report and the chord geometry listing are always written;
/// JSON, SVG, and overlay outputs are opt-in.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input skeleton image; any pixel value other than 255 counts as
    /// background.
    input: PathBuf,

    /// Directory for the output files; defaults to the input's
    /// directory.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Smallest enclosed region accepted, in pixels.
    #[arg(long, default_value_t = 4)]
    min_region_area: u32,

    /// Keep the full frame instead of cropping to the foreground's
    /// bounding box plus a one-pixel margin.
    #[arg(long)]
    no_crop: bool,

    /// Also write the full graph as JSON.
    #[arg(long)]
    json: bool,

    /// Also write an SVG rendering of the graph.
    #[arg(long)]
    svg: bool,

    /// Also write a PNG overlay of the chords on the skeleton.
    #[arg(long)]
    overlay: bool,
}

/// Harden the input: exactly 255 counts as foreground, everything else
/// becomes background.
fn normalize(image: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(image.width(), image.height());
    for (x, y, p) in image.enumerate_pixels() {
        if p[0] == 255 {
            out.put_pixel(x, y, Luma([255]));
        }
    }
    out
}

/// Crop to the foreground's bounding box with a one-pixel background
/// margin, returning the cropped frame and its top-left offset in the
/// source image. A frame with no foreground is returned unchanged.
fn crop_to_foreground(frame: &GrayImage) -> (GrayImage, Pt) {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for (x, y, p) in frame.enumerate_pixels() {
        if p[0] == 255 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x == u32::MAX {
        return (frame.clone(), Pt::new(0, 0));
    }

    let x0 = min_x.saturating_sub(1);
    let y0 = min_y.saturating_sub(1);
    let x1 = (max_x + 2).min(frame.width());
    let y1 = (max_y + 2).min(frame.height());
    let mut out = GrayImage::new(x1 - x0, y1 - y0);
    for (x, y, p) in out.enumerate_pixels_mut() {
        *p = *frame.get_pixel(x0 + x, y0 + y);
    }
    (out, Pt::new(x0 as i32, y0 as i32))
}

/// Render the skeleton into the green channel and draw every wall's
/// chord over it in magenta.
fn chord_overlay(frame: &GrayImage, graph: &TissueGraph) -> RgbImage {
    let mut out = RgbImage::new(frame.width(), frame.height());
    for (x, y, p) in frame.enumerate_pixels() {
        out.put_pixel(x, y, Rgb([0, p[0], 0]));
    }
    for edge in &graph.edges {
        let [a, b] = edge.ends;
        draw_line_segment_mut(
            &mut out,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            Rgb([255, 0, 255]),
        );
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    eprintln!("Reading image from {}", args.input.display());
    let image = image::open(&args.input)?.into_luma8();
    let frame = normalize(&image);

    let (frame, offset) = if args.no_crop {
        (frame, Pt::new(0, 0))
    } else {
        crop_to_foreground(&frame)
    };
    eprintln!(
        "Frame: {}x{} at offset {offset}",
        frame.width(),
        frame.height()
    );

    let config = ExtractConfig {
        min_region_area: args.min_region_area,
    };
    let graph = extract(&frame, &config)?;

    let s = &graph.summary;
    eprintln!(
        "Extracted {} vertices, {} edges, {} cells ({} interior)",
        s.vertex_count, s.edge_count, s.cell_count, s.interior_cells
    );
    if !graph.diagnostics.long_walks.is_empty() {
        eprintln!(
            "Warning: {} unusually long walls traced",
            graph.diagnostics.long_walks.len()
        );
    }

    let out_dir = args.output_dir.unwrap_or_else(|| {
        args.input
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });
    std::fs::create_dir_all(&out_dir)?;
    let stem = args
        .input
        .file_stem()
        .map_or_else(|| String::from("graph"), |s| s.to_string_lossy().into_owned());

    let report_path = out_dir.join(format!("{stem}.graph.txt"));
    eprintln!("Writing report to {}", report_path.display());
    std::fs::write(&report_path, graph_report(&graph, offset)?)?;

    let chords_path = out_dir.join(format!("{stem}.chords.txt"));
    eprintln!("Writing chord geometry to {}", chords_path.display());
    std::fs::write(&chords_path, chord_geometry(&graph))?;

    if args.json {
        let path = out_dir.join(format!("{stem}.json"));
        eprintln!("Writing JSON to {}", path.display());
        std::fs::write(&path, serde_json::to_vec_pretty(&graph)?)?;
    }

    if args.svg {
        let path = out_dir.join(format!("{stem}.svg"));
        let description = format!("min_region_area={}", args.min_region_area);
        let metadata = SvgMetadata {
            title: Some(&stem),
            description: Some(&description),
        };
        eprintln!("Writing SVG to {}", path.display());
        std::fs::write(&path, to_svg(&graph, frame.width(), frame.height(), &metadata))?;
    }

    if args.overlay {
        let path = out_dir.join(format!("{stem}.overlay.png"));
        eprintln!("Writing overlay to {}", path.display());
        chord_overlay(&frame, &graph).save(&path)?;
    }

    eprintln!("Done.");
    Ok(())
}
