//! SVG documents resolved into [`SvgDocument`].
//!
//! Every call builds a fresh [`ParseContext`] holding the id, symbol,
//! stylesheet, gradient and clip-path indices for that one document. Nothing
//! is cached between calls, so documents can be parsed on any number of
//! threads at once.

use std::collections::HashMap;

use tracing::debug;

use crate::color::Color;
use crate::document::{Fill, FillRule, LineCap, LineJoin, SvgDocument, SvgElement, SvgGroup, SvgPath};
use crate::error::ConvertError;
use crate::gradient::{GradientStop, LinearGradient, RadialGradient, parse_fraction, parse_stops};
use crate::shapes::{is_shape, parse_length, shape_to_path};
use crate::style::{self, Properties, Stylesheet};
use crate::transform::SvgTransform;
use crate::xml::{SourceNode, parse_xml};

/// `<use>` references nested deeper than this expand to nothing.
pub const MAX_USE_DEPTH: usize = 10;

const DEFAULT_SIZE: f64 = 24.0;

/// Parse an SVG string.
pub fn parse_svg(svg: &str) -> Result<SvgDocument, ConvertError> {
    let root = parse_xml(svg)?;
    parse_tree(&root)
}

/// Parse raw SVG bytes, which must be UTF-8.
pub fn parse_svg_bytes(bytes: &[u8]) -> Result<SvgDocument, ConvertError> {
    let svg = std::str::from_utf8(bytes)?;
    parse_svg(svg.strip_prefix('\u{feff}').unwrap_or(svg))
}

/// Resolve an already parsed element tree.
pub fn parse_tree<N: SourceNode>(root: &N) -> Result<SvgDocument, ConvertError> {
    if root.tag() != "svg" {
        return Err(ConvertError::InvalidSvg(format!(
            "root element is <{}>, expected <svg>",
            root.tag()
        )));
    }

    ParseContext::build(root).document(root)
}

struct ParseContext<'a, N: SourceNode> {
    ids: HashMap<&'a str, &'a N>,
    symbols: HashMap<&'a str, &'a N>,
    sheet: Stylesheet,
    size: (f64, f64),
    view_box: Option<ViewBox>,
    clip_paths: HashMap<&'a str, String>,
    linear_gradients: HashMap<String, LinearGradient>,
    radial_gradients: HashMap<String, RadialGradient>,
}

#[derive(Debug, Clone, Copy)]
struct ViewBox {
    min_x: f64,
    min_y: f64,
    width: f64,
    height: f64,
}

impl<'a, N: SourceNode> ParseContext<'a, N> {
    fn build(root: &'a N) -> Self {
        let view_box = root.attr("viewBox").and_then(parse_view_box);
        let dimension = |attr: &str, from_view_box: Option<f64>| {
            root.attr(attr)
                .and_then(parse_length)
                .filter(|v| *v > 0.0)
                .or(from_view_box)
                .unwrap_or(DEFAULT_SIZE)
        };
        let size = (
            dimension("width", view_box.map(|v| v.width)),
            dimension("height", view_box.map(|v| v.height)),
        );

        let mut ctx = ParseContext {
            ids: HashMap::new(),
            symbols: HashMap::new(),
            sheet: Stylesheet::default(),
            size,
            view_box,
            clip_paths: HashMap::new(),
            linear_gradients: HashMap::new(),
            radial_gradients: HashMap::new(),
        };
        ctx.index(root);
        ctx.resolve_definitions();
        ctx
    }

    fn viewport(&self) -> (f64, f64) {
        self.view_box
            .map(|v| (v.width, v.height))
            .unwrap_or(self.size)
    }

    /// Record ids, symbols and stylesheets in one walk.
    fn index(&mut self, node: &'a N) {
        if let Some(id) = node.attr("id") {
            if node.tag() == "symbol" {
                self.symbols.insert(id, node);
            }
            // First definition wins on duplicate ids
            self.ids.entry(id).or_insert(node);
        }
        if node.tag() == "style" {
            self.sheet.add(&node.text());
        }
        for child in node.children() {
            self.index(child);
        }
    }

    fn resolve_definitions(&mut self) {
        let viewport = self.viewport();
        let defs: Vec<(&'a str, &'a N)> = self.ids.iter().map(|(id, node)| (*id, *node)).collect();

        for (id, node) in defs {
            match node.tag() {
                "linearGradient" => {
                    let mut gradient = LinearGradient::parse(node, id, &self.sheet, viewport);
                    if gradient.stops.is_empty() {
                        gradient.stops = self.referenced_stops(node);
                    }
                    self.linear_gradients.insert(id.to_string(), gradient);
                }
                "radialGradient" => {
                    let mut gradient = RadialGradient::parse(node, id, &self.sheet, viewport);
                    if gradient.stops.is_empty() {
                        gradient.stops = self.referenced_stops(node);
                    }
                    self.radial_gradients.insert(id.to_string(), gradient);
                }
                "clipPath" => {
                    let data = node.children().find_map(|child| match child.tag() {
                        "path" => child.attr("d").map(str::to_string),
                        tag if is_shape(tag) => shape_to_path(child),
                        _ => None,
                    });
                    match data {
                        Some(data) => {
                            self.clip_paths.insert(id, data);
                        }
                        None => debug!(id, "clip path has no usable shape"),
                    }
                }
                _ => {}
            }
        }
    }

    /// Stops of a gradient that only points at another gradient via `href`.
    fn referenced_stops(&self, node: &'a N) -> Vec<GradientStop> {
        let mut current = node;
        for _ in 0..MAX_USE_DEPTH {
            let Some(next) = current.attr("href").and_then(|href| self.lookup(href)) else {
                break;
            };
            let stops = parse_stops(next, &self.sheet);
            if !stops.is_empty() {
                return stops;
            }
            current = next;
        }
        Vec::new()
    }

    fn lookup(&self, href: &str) -> Option<&'a N> {
        let id = href.trim().strip_prefix('#')?;
        self.ids.get(id).copied()
    }

    fn document(&self, root: &'a N) -> Result<SvgDocument, ConvertError> {
        let root_props = style::computed(&Properties::new(), self.sheet.cascade(root));
        let mut elements = self.walk_children(root, &root_props, 0)?;

        // VectorDrawable viewports always start at the origin
        let offset = self
            .view_box
            .filter(|v| v.min_x != 0.0 || v.min_y != 0.0)
            .map(|v| SvgTransform::translation(-v.min_x, -v.min_y));
        let opacity = root_props.get("opacity").and_then(|o| parse_fraction(o));
        if offset.is_some() || opacity.is_some() {
            elements = vec![SvgElement::Group(SvgGroup {
                transform: offset,
                opacity,
                elements,
                ..Default::default()
            })];
        }

        let mut doc = SvgDocument::new(self.size, self.viewport());
        doc.elements = elements;
        doc.linear_gradients = self.linear_gradients.clone();
        doc.radial_gradients = self.radial_gradients.clone();

        debug!(
            paths = doc.paths().len(),
            gradients = doc.linear_gradients.len() + doc.radial_gradients.len(),
            "parsed document"
        );
        Ok(doc)
    }

    fn walk_children(
        &self,
        node: &'a N,
        inherited: &Properties,
        depth: usize,
    ) -> Result<Vec<SvgElement>, ConvertError> {
        let mut elements = Vec::new();
        for child in node.children() {
            elements.extend(self.convert(child, inherited, depth)?);
        }
        Ok(elements)
    }

    /// Convert one element into zero or more document elements.
    fn convert(
        &self,
        node: &'a N,
        inherited: &Properties,
        depth: usize,
    ) -> Result<Vec<SvgElement>, ConvertError> {
        let own = self.sheet.cascade(node);
        if own.get("display").is_some_and(|d| d == "none") {
            return Ok(Vec::new());
        }
        let props = style::computed(inherited, own);

        match node.tag() {
            "g" | "svg" | "a" | "switch" => {
                let elements = self.walk_children(node, &props, depth)?;
                Ok(vec![SvgElement::Group(SvgGroup {
                    id: node.attr("id").map(str::to_string),
                    transform: node.attr("transform").and_then(SvgTransform::parse),
                    clip_path: self.clip_path(&props),
                    opacity: props.get("opacity").and_then(|o| parse_fraction(o)),
                    elements,
                })])
            }
            "path" => match node.attr("d") {
                Some(d) => self.path_element(node, &props, d.to_string()),
                None => Ok(Vec::new()),
            },
            tag if is_shape(tag) => match shape_to_path(node) {
                Some(d) => self.path_element(node, &props, d),
                None => {
                    debug!(element = tag, "skipping degenerate shape");
                    Ok(Vec::new())
                }
            },
            "use" => self.expand_use(node, &props, depth),
            "defs" | "clipPath" | "mask" | "symbol" | "linearGradient" | "radialGradient"
            | "style" | "title" | "desc" | "metadata" => Ok(Vec::new()),
            tag => {
                debug!(element = tag, "skipping unsupported element");
                Ok(Vec::new())
            }
        }
    }

    fn path_element(
        &self,
        node: &'a N,
        props: &Properties,
        data: String,
    ) -> Result<Vec<SvgElement>, ConvertError> {
        let mut path = SvgPath::new(data)?;
        path.id = node.attr("id").map(str::to_string);
        path.fill = self.fill(props);
        path.fill_opacity = props.get("fill-opacity").and_then(|o| parse_fraction(o));
        path.fill_rule = props.get("fill-rule").and_then(|r| FillRule::parse(r));
        path.stroke = self.stroke(props);
        path.stroke_width = props.get("stroke-width").and_then(|w| parse_length(w));
        path.stroke_opacity = props.get("stroke-opacity").and_then(|o| parse_fraction(o));
        path.stroke_line_cap = props.get("stroke-linecap").and_then(|c| LineCap::parse(c));
        path.stroke_line_join = props.get("stroke-linejoin").and_then(|j| LineJoin::parse(j));
        path.stroke_miter_limit = props.get("stroke-miterlimit").and_then(|m| parse_length(m));
        path.stroke_dash_array = props.get("stroke-dasharray").and_then(|d| parse_dash_array(d));
        path.stroke_dash_offset = props.get("stroke-dashoffset").and_then(|o| parse_length(o));
        path.opacity = props.get("opacity").and_then(|o| parse_fraction(o));

        // Paths cannot carry transforms or clips in the output format
        let transform = node.attr("transform").and_then(SvgTransform::parse);
        let clip_path = self.clip_path(props);
        if transform.is_some() || clip_path.is_some() {
            return Ok(vec![SvgElement::Group(SvgGroup {
                transform,
                clip_path,
                elements: vec![SvgElement::Path(path)],
                ..Default::default()
            })]);
        }

        Ok(vec![SvgElement::Path(path)])
    }

    fn expand_use(
        &self,
        node: &'a N,
        props: &Properties,
        depth: usize,
    ) -> Result<Vec<SvgElement>, ConvertError> {
        if depth >= MAX_USE_DEPTH {
            debug!(depth, "use nesting limit reached, expanding to nothing");
            return Ok(Vec::new());
        }
        let Some(href) = node.attr("href") else {
            return Ok(Vec::new());
        };
        let Some(id) = href.trim().strip_prefix('#') else {
            debug!(href, "use reference is not a fragment");
            return Ok(Vec::new());
        };
        let target = self.symbols.get(id).or_else(|| self.ids.get(id)).copied();
        let Some(target) = target else {
            debug!(href, "dangling use reference");
            return Ok(Vec::new());
        };

        let content = if target.tag() == "symbol" {
            let symbol_props = style::computed(props, self.sheet.cascade(target));
            self.walk_children(target, &symbol_props, depth + 1)?
        } else {
            self.convert(target, props, depth + 1)?
        };

        let x = node.attr("x").and_then(parse_length).unwrap_or(0.0);
        let y = node.attr("y").and_then(parse_length).unwrap_or(0.0);
        let offset = (x != 0.0 || y != 0.0).then(|| SvgTransform::translation(x, y));
        let transform = node.attr("transform").and_then(SvgTransform::parse);

        // `transform` applies outside the x/y offset. A translation-only
        // transform folds the offset in; anything else needs a nested group.
        let (outer, content) = match (transform, offset) {
            (Some(t), Some(offset)) if t.has_linear_part() => {
                let inner = SvgGroup {
                    transform: Some(offset),
                    elements: content,
                    ..Default::default()
                };
                (Some(t), vec![SvgElement::Group(inner)])
            }
            (Some(t), Some(_)) => {
                let combined = SvgTransform {
                    translate_x: Some(t.translate_x.unwrap_or(0.0) + x),
                    translate_y: Some(t.translate_y.unwrap_or(0.0) + y),
                    ..t
                };
                (Some(combined), content)
            }
            (t, offset) => (t.or(offset), content),
        };

        let opacity = props.get("opacity").and_then(|o| parse_fraction(o));
        let clip_path = self.clip_path(props);
        if outer.is_none() && opacity.is_none() && clip_path.is_none() {
            return Ok(content);
        }

        Ok(vec![SvgElement::Group(SvgGroup {
            id: None,
            transform: outer,
            clip_path,
            opacity,
            elements: content,
        })])
    }

    fn fill(&self, props: &Properties) -> Fill {
        let Some(value) = props.get("fill") else {
            return Fill::None;
        };

        if let Some(id) = url_reference(value) {
            if self.linear_gradients.contains_key(id) {
                return Fill::LinearGradient(id.to_string());
            }
            if self.radial_gradients.contains_key(id) {
                return Fill::RadialGradient(id.to_string());
            }
            debug!(id, "fill references an unknown paint server");
            return Fill::None;
        }

        Color::parse(value).map_or(Fill::None, Fill::Solid)
    }

    fn stroke(&self, props: &Properties) -> Option<Color> {
        let value = props.get("stroke")?;
        if url_reference(value).is_some() {
            debug!(value = value.as_str(), "gradient strokes are not supported");
            return None;
        }
        Color::parse(value)
    }

    fn clip_path(&self, props: &Properties) -> Option<String> {
        let id = url_reference(props.get("clip-path")?)?;
        let data = self.clip_paths.get(id).cloned();
        if data.is_none() {
            debug!(id, "clip-path references an unknown clip path");
        }
        data
    }
}

/// The id inside `url(#id)`, ignoring quotes and any fallback after it.
fn url_reference(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix("url(")?;
    let inner = &inner[..inner.find(')')?];
    let inner = inner.trim().trim_matches(|c| c == '"' || c == '\'');
    inner.strip_prefix('#')
}

fn parse_view_box(value: &str) -> Option<ViewBox> {
    let parts: Vec<f64> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse().ok().filter(|v: &f64| v.is_finite()))
        .collect::<Option<_>>()?;

    match parts.as_slice() {
        &[min_x, min_y, width, height] if width > 0.0 && height > 0.0 => Some(ViewBox {
            min_x,
            min_y,
            width,
            height,
        }),
        _ => None,
    }
}

fn parse_dash_array(value: &str) -> Option<Vec<f64>> {
    if value.trim() == "none" {
        return None;
    }
    let dashes: Vec<f64> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .filter_map(parse_length)
        .collect();
    (!dashes.is_empty()).then_some(dashes)
}
