//! The parsed vector document.

use std::collections::{HashMap, HashSet};

use crate::color::Color;
use crate::gradient::{GradientStop, LinearGradient, RadialGradient};
use crate::path::{PathCommand, PathError, scan_path};
use crate::transform::SvgTransform;

/// A fully resolved vector document.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    /// Intrinsic size.
    pub width: f64,
    pub height: f64,
    /// User coordinate space, from `viewBox` when present.
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Paths and groups in document order. Later elements draw on top.
    pub elements: Vec<SvgElement>,
    pub linear_gradients: HashMap<String, LinearGradient>,
    pub radial_gradients: HashMap<String, RadialGradient>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SvgElement {
    Path(SvgPath),
    Group(SvgGroup),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgGroup {
    pub id: Option<String>,
    pub transform: Option<SvgTransform>,
    /// Path data of the clip applied to this group's content.
    pub clip_path: Option<String>,
    pub opacity: Option<f64>,
    pub elements: Vec<SvgElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgPath {
    pub id: Option<String>,
    /// The path data exactly as authored (or as generated for shapes).
    pub path_data: String,
    /// Always the scan of `path_data`.
    pub commands: Vec<PathCommand>,
    pub fill: Fill,
    pub fill_opacity: Option<f64>,
    pub fill_rule: Option<FillRule>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f64>,
    pub stroke_opacity: Option<f64>,
    pub stroke_line_cap: Option<LineCap>,
    pub stroke_line_join: Option<LineJoin>,
    pub stroke_miter_limit: Option<f64>,
    pub stroke_dash_array: Option<Vec<f64>>,
    pub stroke_dash_offset: Option<f64>,
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Fill {
    #[default]
    None,
    Solid(Color),
    /// Id of an entry in [`SvgDocument::linear_gradients`].
    LinearGradient(String),
    /// Id of an entry in [`SvgDocument::radial_gradients`].
    RadialGradient(String),
}

impl Fill {
    pub fn is_gradient(&self) -> bool {
        matches!(self, Fill::LinearGradient(_) | Fill::RadialGradient(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl FillRule {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "nonzero" => Some(FillRule::NonZero),
            "evenodd" => Some(FillRule::EvenOdd),
            _ => None,
        }
    }
}

impl LineCap {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "butt" => Some(LineCap::Butt),
            "round" => Some(LineCap::Round),
            "square" => Some(LineCap::Square),
            _ => None,
        }
    }
}

impl LineJoin {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "miter" | "miter-clip" | "arcs" => Some(LineJoin::Miter),
            "round" => Some(LineJoin::Round),
            "bevel" => Some(LineJoin::Bevel),
            _ => None,
        }
    }
}

impl SvgPath {
    /// A path with no paint, scanning `path_data` into commands.
    pub fn new(path_data: impl Into<String>) -> Result<Self, PathError> {
        let path_data = path_data.into();
        let commands = scan_path(&path_data)?;
        Ok(Self {
            id: None,
            path_data,
            commands,
            fill: Fill::None,
            fill_opacity: None,
            fill_rule: None,
            stroke: None,
            stroke_width: None,
            stroke_opacity: None,
            stroke_line_cap: None,
            stroke_line_join: None,
            stroke_miter_limit: None,
            stroke_dash_array: None,
            stroke_dash_offset: None,
            opacity: None,
        })
    }
}

impl SvgDocument {
    /// An empty document of the given intrinsic and viewport size.
    pub fn new(size: (f64, f64), viewport: (f64, f64)) -> Self {
        Self {
            width: size.0,
            height: size.1,
            viewport_width: viewport.0,
            viewport_height: viewport.1,
            elements: Vec::new(),
            linear_gradients: HashMap::new(),
            radial_gradients: HashMap::new(),
        }
    }

    /// Build a document from separate top-level path and group lists, as
    /// produced by tools that do not track element order.
    ///
    /// Top-level paths whose data also appears inside some group are dropped
    /// so they are not drawn twice, and the remaining paths are placed before
    /// all groups.
    pub fn from_legacy_parts(
        size: (f64, f64),
        viewport: (f64, f64),
        paths: Vec<SvgPath>,
        groups: Vec<SvgGroup>,
    ) -> Self {
        let mut grouped = HashSet::new();
        for group in &groups {
            collect_path_data(&group.elements, &mut grouped);
        }

        let mut doc = SvgDocument::new(size, viewport);
        doc.elements = paths
            .into_iter()
            .filter(|p| !grouped.contains(p.path_data.as_str()))
            .map(SvgElement::Path)
            .chain(groups.into_iter().map(SvgElement::Group))
            .collect();
        doc
    }

    /// Every path in the tree, depth first in document order.
    pub fn paths(&self) -> Vec<&SvgPath> {
        fn visit<'a>(elements: &'a [SvgElement], out: &mut Vec<&'a SvgPath>) {
            for element in elements {
                match element {
                    SvgElement::Path(path) => out.push(path),
                    SvgElement::Group(group) => visit(&group.elements, out),
                }
            }
        }

        let mut out = Vec::new();
        visit(&self.elements, &mut out);
        out
    }

    /// The stops of a gradient fill, if it names a gradient that has any.
    pub fn gradient_stops(&self, fill: &Fill) -> Option<&[GradientStop]> {
        let stops = match fill {
            Fill::LinearGradient(id) => &self.linear_gradients.get(id)?.stops,
            Fill::RadialGradient(id) => &self.radial_gradients.get(id)?.stops,
            Fill::None | Fill::Solid(_) => return None,
        };
        (!stops.is_empty()).then_some(stops.as_slice())
    }

    /// Whether any path is filled with a gradient that can be drawn.
    pub fn uses_gradients(&self) -> bool {
        self.paths()
            .iter()
            .any(|p| self.gradient_stops(&p.fill).is_some())
    }
}

fn collect_path_data(elements: &[SvgElement], out: &mut HashSet<String>) {
    for element in elements {
        match element {
            SvgElement::Path(path) => {
                out.insert(path.path_data.clone());
            }
            SvgElement::Group(group) => collect_path_data(&group.elements, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(d: &str) -> SvgPath {
        SvgPath::new(d).unwrap()
    }

    fn linear(stops: Vec<GradientStop>) -> LinearGradient {
        LinearGradient {
            id: "g".into(),
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 0.0,
            units: Default::default(),
            stops,
            spread: Default::default(),
            transform: None,
        }
    }

    #[test]
    fn test_new_path_scans_data() {
        let p = path("M0 0 L1 1");
        assert_eq!(p.commands.len(), 2);
        assert!(SvgPath::new("M0 0 Q").is_err());
    }

    #[test]
    fn test_paths_in_document_order() {
        let mut doc = SvgDocument::new((24.0, 24.0), (24.0, 24.0));
        doc.elements = vec![
            SvgElement::Path(path("M1 1")),
            SvgElement::Group(SvgGroup {
                elements: vec![
                    SvgElement::Path(path("M2 2")),
                    SvgElement::Group(SvgGroup {
                        elements: vec![SvgElement::Path(path("M3 3"))],
                        ..Default::default()
                    }),
                ],
                ..Default::default()
            }),
            SvgElement::Path(path("M4 4")),
        ];

        let order: Vec<&str> = doc.paths().iter().map(|p| p.path_data.as_str()).collect();
        assert_eq!(order, vec!["M1 1", "M2 2", "M3 3", "M4 4"]);
    }

    #[test]
    fn test_legacy_parts_dedup_and_order() {
        let group = SvgGroup {
            elements: vec![SvgElement::Path(path("M2 2"))],
            ..Default::default()
        };
        let doc = SvgDocument::from_legacy_parts(
            (24.0, 24.0),
            (24.0, 24.0),
            vec![path("M2 2"), path("M1 1")],
            vec![group],
        );

        assert_eq!(doc.elements.len(), 2);
        assert!(matches!(&doc.elements[0], SvgElement::Path(p) if p.path_data == "M1 1"));
        assert!(matches!(&doc.elements[1], SvgElement::Group(_)));
    }

    #[test]
    fn test_uses_gradients() {
        let mut doc = SvgDocument::new((24.0, 24.0), (24.0, 24.0));
        let mut p = path("M0 0");
        p.fill = Fill::Solid(Color::BLACK);
        doc.elements.push(SvgElement::Path(p.clone()));
        assert!(!doc.uses_gradients());

        p.fill = Fill::LinearGradient("g".into());
        doc.elements.push(SvgElement::Group(SvgGroup {
            elements: vec![SvgElement::Path(p)],
            ..Default::default()
        }));
        // Undefined
        assert!(!doc.uses_gradients());

        doc.linear_gradients.insert("g".into(), linear(Vec::new()));
        // Defined but without stops
        assert!(!doc.uses_gradients());

        let stop = GradientStop {
            offset: 0.0,
            color: Color::BLACK,
            opacity: 1.0,
        };
        doc.linear_gradients.insert("g".into(), linear(vec![stop]));
        assert!(doc.uses_gradients());
        assert_eq!(
            doc.gradient_stops(&Fill::LinearGradient("g".into()))
                .map(<[_]>::len),
            Some(1)
        );
    }
}
