//! Linear and radial gradient definitions.

use crate::color::Color;
use crate::path::Bounds;
use crate::style::Stylesheet;
use crate::transform::SvgTransform;
use crate::xml::SourceNode;

/// How a gradient extends past its first and last stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

impl SpreadMethod {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "reflect" => SpreadMethod::Reflect,
            "repeat" => SpreadMethod::Repeat,
            _ => SpreadMethod::Pad,
        }
    }
}

/// Coordinate system of a gradient's geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GradientUnits {
    /// Fractions of the painted path's bounding box.
    #[default]
    ObjectBoundingBox,
    /// The same user space as the path.
    UserSpaceOnUse,
}

impl GradientUnits {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "userSpaceOnUse" => GradientUnits::UserSpaceOnUse,
            _ => GradientUnits::ObjectBoundingBox,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// In `0.0..=1.0`.
    pub offset: f64,
    pub color: Color,
    pub opacity: f64,
}

impl GradientStop {
    /// The stop color with the stop opacity folded into its alpha.
    pub fn effective_color(&self) -> Color {
        self.color.with_opacity(self.opacity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub units: GradientUnits,
    /// Sorted ascending by offset.
    pub stops: Vec<GradientStop>,
    pub spread: SpreadMethod,
    pub transform: Option<SvgTransform>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub id: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fx: f64,
    pub fy: f64,
    pub units: GradientUnits,
    /// Sorted ascending by offset.
    pub stops: Vec<GradientStop>,
    pub spread: SpreadMethod,
    pub transform: Option<SvgTransform>,
}

impl LinearGradient {
    pub fn parse<N: SourceNode>(
        node: &N,
        id: &str,
        sheet: &Stylesheet,
        viewport: (f64, f64),
    ) -> LinearGradient {
        let units = node
            .attr("gradientUnits")
            .map(GradientUnits::parse)
            .unwrap_or_default();
        let coord = Coords { units, viewport };

        LinearGradient {
            id: id.to_string(),
            x1: coord.x(node.attr("x1"), "0%"),
            y1: coord.y(node.attr("y1"), "0%"),
            x2: coord.x(node.attr("x2"), "100%"),
            y2: coord.y(node.attr("y2"), "0%"),
            units,
            stops: parse_stops(node, sheet),
            spread: node
                .attr("spreadMethod")
                .map(SpreadMethod::parse)
                .unwrap_or_default(),
            transform: node.attr("gradientTransform").and_then(SvgTransform::parse),
        }
    }

    /// Start and end points in the path's user space.
    pub fn endpoints(&self, bbox: Option<Bounds>) -> ((f64, f64), (f64, f64)) {
        (
            self.map_point(self.x1, self.y1, bbox),
            self.map_point(self.x2, self.y2, bbox),
        )
    }

    fn map_point(&self, x: f64, y: f64, bbox: Option<Bounds>) -> (f64, f64) {
        map_point(x, y, self.transform.as_ref(), self.units, bbox)
    }
}

impl RadialGradient {
    pub fn parse<N: SourceNode>(
        node: &N,
        id: &str,
        sheet: &Stylesheet,
        viewport: (f64, f64),
    ) -> RadialGradient {
        let units = node
            .attr("gradientUnits")
            .map(GradientUnits::parse)
            .unwrap_or_default();
        let coord = Coords { units, viewport };

        let cx = coord.x(node.attr("cx"), "50%");
        let cy = coord.y(node.attr("cy"), "50%");
        RadialGradient {
            id: id.to_string(),
            cx,
            cy,
            r: coord.radius(node.attr("r"), "50%"),
            fx: node.attr("fx").map_or(cx, |v| coord.x(Some(v), "50%")),
            fy: node.attr("fy").map_or(cy, |v| coord.y(Some(v), "50%")),
            units,
            stops: parse_stops(node, sheet),
            spread: node
                .attr("spreadMethod")
                .map(SpreadMethod::parse)
                .unwrap_or_default(),
            transform: node.attr("gradientTransform").and_then(SvgTransform::parse),
        }
    }

    /// Center and radius in the path's user space.
    ///
    /// VectorDrawable radial gradients are circles, so a non-uniform scale
    /// (from the gradient transform or a non-square bounding box) is
    /// approximated by the mean of the two axes.
    pub fn circle(&self, bbox: Option<Bounds>) -> ((f64, f64), f64) {
        let center = map_point(self.cx, self.cy, self.transform.as_ref(), self.units, bbox);

        let mut radius = self.r;
        if let Some(t) = &self.transform {
            radius *= t.mean_scale();
        }
        if let (GradientUnits::ObjectBoundingBox, Some(b)) = (self.units, bbox) {
            radius *= (b.width() + b.height()) / 2.0;
        }

        (center, radius)
    }
}

/// Gradient space → gradient transform → path user space.
fn map_point(
    x: f64,
    y: f64,
    transform: Option<&SvgTransform>,
    units: GradientUnits,
    bbox: Option<Bounds>,
) -> (f64, f64) {
    let (x, y) = match transform {
        Some(t) => t.apply(x, y),
        None => (x, y),
    };
    match (units, bbox) {
        (GradientUnits::ObjectBoundingBox, Some(b)) => {
            (b.min_x + x * b.width(), b.min_y + y * b.height())
        }
        _ => (x, y),
    }
}

/// Parse the `<stop>` children of a gradient, sorted by offset.
pub fn parse_stops<N: SourceNode>(node: &N, sheet: &Stylesheet) -> Vec<GradientStop> {
    let mut stops: Vec<GradientStop> = node
        .children()
        .filter(|c| c.tag() == "stop")
        .map(|stop| {
            let props = sheet.cascade(stop);
            GradientStop {
                offset: stop.attr("offset").map_or(0.0, parse_offset),
                color: props
                    .get("stop-color")
                    .and_then(|c| Color::parse(c))
                    .unwrap_or(Color::BLACK),
                opacity: props
                    .get("stop-opacity")
                    .and_then(|o| parse_fraction(o))
                    .unwrap_or(1.0),
            }
        })
        .collect();

    // Stable, so equal offsets keep document order
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    stops
}

/// `"50%"` → 0.5, `"0.25"` → 0.25, clamped to `0.0..=1.0`.
pub fn parse_offset(value: &str) -> f64 {
    parse_fraction(value).unwrap_or(0.0)
}

/// A number or percentage clamped to `0.0..=1.0`.
pub(crate) fn parse_fraction(value: &str) -> Option<f64> {
    let value = value.trim();
    let v = match value.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
        None => value.parse::<f64>().ok()?,
    };
    v.is_finite().then(|| v.clamp(0.0, 1.0))
}

/// Resolves gradient coordinates, including percentages.
struct Coords {
    units: GradientUnits,
    viewport: (f64, f64),
}

impl Coords {
    fn x(&self, value: Option<&str>, default: &str) -> f64 {
        self.resolve(value.unwrap_or(default), self.viewport.0)
    }

    fn y(&self, value: Option<&str>, default: &str) -> f64 {
        self.resolve(value.unwrap_or(default), self.viewport.1)
    }

    fn radius(&self, value: Option<&str>, default: &str) -> f64 {
        let (w, h) = self.viewport;
        self.resolve(value.unwrap_or(default), ((w * w + h * h) / 2.0).sqrt())
    }

    fn resolve(&self, value: &str, reference: f64) -> f64 {
        let value = value.trim();
        match value.strip_suffix('%') {
            Some(pct) => {
                let fraction = pct.trim().parse::<f64>().unwrap_or(0.0) / 100.0;
                match self.units {
                    GradientUnits::ObjectBoundingBox => fraction,
                    GradientUnits::UserSpaceOnUse => fraction * reference,
                }
            }
            None => crate::shapes::parse_length(value).unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("50%"), 0.5);
        assert_eq!(parse_offset("0.25"), 0.25);
        assert_eq!(parse_offset("150%"), 1.0);
        assert_eq!(parse_offset("-1"), 0.0);
        assert_eq!(parse_offset("junk"), 0.0);
        assert_eq!(parse_offset("nan"), 0.0);
    }

    #[test]
    fn test_stops_are_sorted() {
        let node = parse_xml(
            r##"<linearGradient>
                <stop offset="100%" stop-color="#0000ff"/>
                <stop offset="0" style="stop-color: red; stop-opacity: 0.5"/>
                <stop offset="50%" stop-color="#00ff00"/>
            </linearGradient>"##,
        )
        .unwrap();

        let stops = parse_stops(&node, &Stylesheet::default());
        let offsets: Vec<f64> = stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
        assert_eq!(stops[0].color, Color::rgb(255, 0, 0));
        assert_eq!(stops[0].opacity, 0.5);
        assert_eq!(stops[0].effective_color().to_argb_hex(), "#80FF0000");
    }

    #[test]
    fn test_linear_user_space() {
        let node = parse_xml(
            r#"<linearGradient gradientUnits="userSpaceOnUse" x1="0" y1="50%" x2="24" y2="12" spreadMethod="reflect"/>"#,
        )
        .unwrap();
        let g = LinearGradient::parse(&node, "g", &Stylesheet::default(), (24.0, 24.0));
        assert_eq!((g.x1, g.y1, g.x2, g.y2), (0.0, 12.0, 24.0, 12.0));
        assert_eq!(g.spread, SpreadMethod::Reflect);
        assert_eq!(g.endpoints(None), ((0.0, 12.0), (24.0, 12.0)));
    }

    #[test]
    fn test_linear_bounding_box_mapping() {
        let node = parse_xml(r#"<linearGradient x1="0" y1="0" x2="1" y2="1"/>"#).unwrap();
        let g = LinearGradient::parse(&node, "g", &Stylesheet::default(), (24.0, 24.0));
        assert_eq!(g.units, GradientUnits::ObjectBoundingBox);

        let bbox = Bounds {
            min_x: 4.0,
            min_y: 2.0,
            max_x: 14.0,
            max_y: 22.0,
        };
        assert_eq!(g.endpoints(Some(bbox)), ((4.0, 2.0), (14.0, 22.0)));
    }

    #[test]
    fn test_radial_with_transform() {
        let node = parse_xml(
            r#"<radialGradient gradientUnits="userSpaceOnUse" cx="0" cy="0" r="1" gradientTransform="translate(12 12) scale(10 6)"/>"#,
        )
        .unwrap();
        let g = RadialGradient::parse(&node, "r", &Stylesheet::default(), (24.0, 24.0));
        assert_eq!((g.fx, g.fy), (0.0, 0.0));
        let (center, radius) = g.circle(None);
        assert_eq!(center, (12.0, 12.0));
        assert_eq!(radius, 8.0);
    }
}
