//! cytograph-export: pure serializers for extracted tissue graphs
//!
//! Converts a [`cytograph_core::TissueGraph`] into output formats: the
//! plain-text graph report, the chord geometry listing, and an SVG
//! rendering. All functions return strings; file handling belongs to
//! the caller.

// Graph counts are tiny; the widening casts to i64 cannot wrap.
#![allow(clippy::cast_possible_wrap)]

pub mod report;
pub mod svg;

pub use report::{ExportError, chord_geometry, graph_report};
pub use svg::{SvgMetadata, build_path_data, to_svg};
