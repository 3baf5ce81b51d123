//! Basic shapes converted to equivalent path data.

use crate::path::format_number as n;
use crate::xml::SourceNode;

/// Whether `tag` names a shape [`shape_to_path`] can convert.
pub fn is_shape(tag: &str) -> bool {
    matches!(
        tag,
        "rect" | "circle" | "ellipse" | "line" | "polygon" | "polyline"
    )
}

/// Path data for a basic shape, or `None` for a degenerate or unknown shape.
pub fn shape_to_path<N: SourceNode>(node: &N) -> Option<String> {
    let num = |name: &str| node.attr(name).and_then(parse_length);

    match node.tag() {
        "rect" => rect_path(
            num("x").unwrap_or(0.0),
            num("y").unwrap_or(0.0),
            num("width")?,
            num("height")?,
            num("rx"),
            num("ry"),
        ),
        "circle" => {
            let r = num("r")?;
            ellipse_path(num("cx").unwrap_or(0.0), num("cy").unwrap_or(0.0), r, r)
        }
        "ellipse" => ellipse_path(
            num("cx").unwrap_or(0.0),
            num("cy").unwrap_or(0.0),
            num("rx")?,
            num("ry")?,
        ),
        "line" => Some(format!(
            "M{},{} L{},{}",
            n(num("x1").unwrap_or(0.0)),
            n(num("y1").unwrap_or(0.0)),
            n(num("x2").unwrap_or(0.0)),
            n(num("y2").unwrap_or(0.0)),
        )),
        "polygon" => poly_path(node.attr("points")?, true),
        "polyline" => poly_path(node.attr("points")?, false),
        _ => None,
    }
}

/// A rectangle, with arc corners when either radius is positive.
///
/// A missing radius copies the other one; both are clamped to half the
/// corresponding side.
pub fn rect_path(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rx: Option<f64>,
    ry: Option<f64>,
) -> Option<String> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    let (rx, ry) = match (rx, ry) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let rx = rx.max(0.0).min(width / 2.0);
    let ry = ry.max(0.0).min(height / 2.0);

    if rx == 0.0 || ry == 0.0 {
        return Some(format!(
            "M{},{} h{} v{} h{} Z",
            n(x),
            n(y),
            n(width),
            n(height),
            n(-width)
        ));
    }

    let inner_w = width - 2.0 * rx;
    let inner_h = height - 2.0 * ry;
    let corner = |dx: f64, dy: f64| format!("a{},{} 0 0 1 {},{}", n(rx), n(ry), n(dx), n(dy));

    Some(format!(
        "M{},{} h{} {} v{} {} h{} {} v{} {} Z",
        n(x + rx),
        n(y),
        n(inner_w),
        corner(rx, ry),
        n(inner_h),
        corner(-rx, ry),
        n(-inner_w),
        corner(-rx, -ry),
        n(-inner_h),
        corner(rx, -ry),
    ))
}

/// A full ellipse drawn as two half arcs.
pub fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> Option<String> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    let (rxs, rys) = (n(rx), n(ry));
    Some(format!(
        "M{},{} a{rxs},{rys} 0 1,0 {},0 a{rxs},{rys} 0 1,0 {},0 Z",
        n(cx - rx),
        n(cy),
        n(2.0 * rx),
        n(-2.0 * rx),
    ))
}

fn poly_path(points: &str, close: bool) -> Option<String> {
    let coords: Vec<f64> = points
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map_while(|p| p.parse().ok())
        .collect();

    // An odd trailing coordinate is dropped
    let pairs: Vec<(f64, f64)> = coords.chunks_exact(2).map(|c| (c[0], c[1])).collect();
    if pairs.len() < 2 {
        return None;
    }

    let mut d = format!("M{},{}", n(pairs[0].0), n(pairs[0].1));
    for (x, y) in &pairs[1..] {
        d.push_str(&format!(" L{},{}", n(*x), n(*y)));
    }
    if close {
        d.push_str(" Z");
    }
    Some(d)
}

/// Parse a length such as `12`, `12.5px` or `1e2`. Other units are read as
/// user units; percentages are rejected.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    let end = value
        .find(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
        .unwrap_or(value.len());
    value[..end]
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathCommand, scan_path};
    use crate::xml::parse_xml;

    fn convert(xml: &str) -> Option<String> {
        shape_to_path(&parse_xml(xml).unwrap())
    }

    #[test]
    fn test_sharp_rect() {
        let d = convert(r#"<rect x="2" y="3" width="10" height="4"/>"#).unwrap();
        assert_eq!(d, "M2,3 h10 v4 h-10 Z");
        let commands = scan_path(&d).unwrap();
        assert!(!commands.iter().any(|c| matches!(c, PathCommand::Arc { .. })));
    }

    #[test]
    fn test_rounded_rect() {
        let d = convert(r#"<rect width="10" height="4" rx="1"/>"#).unwrap();
        assert_eq!(
            d,
            "M1,0 h8 a1,1 0 0 1 1,1 v2 a1,1 0 0 1 -1,1 h-8 a1,1 0 0 1 -1,-1 v-2 a1,1 0 0 1 1,-1 Z"
        );
        let commands = scan_path(&d).unwrap();
        // moveto + 8 segments + close
        assert_eq!(commands.len(), 10);
        let arcs: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                PathCommand::Arc { rx, ry, .. } => Some((*rx, *ry)),
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 4);
    }

    #[test]
    fn test_rounded_rect_radius_is_clamped() {
        let d = convert(r#"<rect width="10" height="4" rx="8" ry="8"/>"#).unwrap();
        let commands = scan_path(&d).unwrap();
        for c in &commands {
            if let PathCommand::Arc { rx, ry, .. } = c {
                assert!(*rx <= 5.0);
                assert!(*ry <= 2.0);
            }
        }
        assert!(d.starts_with("M5,0 h0 a5,2"));
    }

    #[test]
    fn test_circle_and_ellipse() {
        assert_eq!(
            convert(r#"<circle cx="12" cy="12" r="10"/>"#).unwrap(),
            "M2,12 a10,10 0 1,0 20,0 a10,10 0 1,0 -20,0 Z"
        );
        assert_eq!(
            convert(r#"<ellipse cx="5" cy="5" rx="4" ry="2"/>"#).unwrap(),
            "M1,5 a4,2 0 1,0 8,0 a4,2 0 1,0 -8,0 Z"
        );
        assert_eq!(convert(r#"<circle r="0"/>"#), None);
    }

    #[test]
    fn test_line_and_polys() {
        assert_eq!(
            convert(r#"<line x1="1" y1="2" x2="3" y2="4"/>"#).unwrap(),
            "M1,2 L3,4"
        );
        assert_eq!(
            convert(r#"<polygon points="0,0 10,0 10,10"/>"#).unwrap(),
            "M0,0 L10,0 L10,10 Z"
        );
        assert_eq!(
            convert(r#"<polyline points="0 0 5 5 7"/>"#).unwrap(),
            "M0,0 L5,5"
        );
        assert_eq!(convert(r#"<polygon points="1,1"/>"#), None);
    }

    #[test]
    fn test_degenerate_rect() {
        assert_eq!(convert(r#"<rect width="0" height="4"/>"#), None);
        assert_eq!(convert(r#"<rect height="4"/>"#), None);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("12"), Some(12.0));
        assert_eq!(parse_length("12.5px"), Some(12.5));
        assert_eq!(parse_length("1e2"), Some(100.0));
        assert_eq!(parse_length("50%"), None);
        assert_eq!(parse_length("abc"), None);
        assert_eq!(parse_length("1e400"), None);
        assert_eq!(parse_length("NaN"), None);
    }
}
