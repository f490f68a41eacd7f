//! SVG export serializer.
//!
//! Renders an extracted [`TissueGraph`] as an SVG string using the
//! [`svg`] crate for document construction, XML escaping, and path data
//! formatting.
//!
//! Every wall polyline becomes a `<path>` with `M` (move to) and `L`
//! (line to) commands, grouped under `<g id="walls">`; every vertex
//! becomes a `<circle>` under `<g id="vertices">`. Boundary elements are
//! colored apart from interior ones.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Group, Path, Title};
use svg::node::{Text, Value};

use cytograph_core::{Contour, Side, TissueGraph};

/// Stroke color for interior walls.
const INTERIOR_STROKE: &str = "black";
/// Stroke and fill color for boundary walls and tips.
const EXTERIOR_STROKE: &str = "#4682b4";
/// Fill color for interior vertices.
const INTERIOR_FILL: &str = "crimson";
/// Vertex marker radius in pixels.
const VERTEX_RADIUS: f64 = 1.5;

/// Metadata to embed in the SVG document.
///
/// Both fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag. These
/// are standard SVG accessibility elements and are surfaced by some file
/// managers and screen readers.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title -- emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description -- emitted as `<desc>`.
    ///
    /// Typically the extraction parameters, so exported files are
    /// distinguishable.
    pub description: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a wall polyline.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for polylines with fewer than 2 points.
#[must_use]
pub fn build_path_data(polyline: &Contour) -> String {
    let Some((first, rest)) = polyline.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data))
}

/// Serialize the graph into an SVG string.
///
/// `width` and `height` are the dimensions of the crop window the graph
/// was extracted from; they become the document's `viewBox`, so the
/// rendering overlays the cropped frame pixel for pixel.
#[must_use]
pub fn to_svg(graph: &TissueGraph, width: u32, height: u32, metadata: &SvgMetadata<'_>) -> String {
    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0, 0, width, height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    let mut walls = Group::new().set("id", "walls");
    for edge in &graph.edges {
        let d = build_path_data(&edge.polyline);
        if d.is_empty() {
            continue;
        }
        let stroke = match edge.side {
            Side::Interior => INTERIOR_STROKE,
            Side::Exterior => EXTERIOR_STROKE,
        };
        let path = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", stroke)
            .set("stroke-width", 1);
        walls = walls.add(path);
    }
    doc = doc.add(walls);

    let mut markers = Group::new().set("id", "vertices");
    for vertex in &graph.vertices {
        let fill = match vertex.side {
            Side::Interior => INTERIOR_FILL,
            Side::Exterior => EXTERIOR_STROKE,
        };
        let circle = Circle::new()
            .set("cx", vertex.pos.x)
            .set("cy", vertex.pos.y)
            .set("r", VERTEX_RADIUS)
            .set("fill", fill);
        markers = markers.add(circle);
    }
    doc = doc.add(markers);

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
