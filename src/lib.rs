//! svg2drawable - SVG to Android VectorDrawable conversion
//!
//! Parses the static SVG subset used by icon sets (paths, basic shapes,
//! groups, `<use>`, CSS classes, gradients and clip paths) and emits
//! VectorDrawable XML that keeps the authored stacking order.

pub mod batch;
pub mod color;
pub mod document;
mod error;
pub mod gradient;
pub mod parse;
pub mod path;
pub mod shapes;
pub mod style;
pub mod transform;
pub mod validate;
pub mod vector_drawable;
pub mod xml;

pub use batch::{BatchConverter, BatchOptions, BatchSummary, convert_file};
pub use color::Color;
pub use document::*;
pub use error::*;
pub use parse::{parse_svg, parse_svg_bytes, parse_tree};
pub use path::{PathCommand, PathError, format_number, scan_path};
pub use transform::SvgTransform;
pub use validate::{PathValidationIssue, validate_document, validate_path_data};
pub use vector_drawable::{GeneratorOptions, generate, generate_with_options};

/// Convert an SVG string to VectorDrawable XML.
pub fn convert_svg(svg: &str, auto_mirrored: bool) -> Result<String, ConvertError> {
    let doc = parse_svg(svg)?;
    Ok(generate(&doc, auto_mirrored))
}
