//! Android VectorDrawable XML generation.

use tracing::debug;

use crate::color::Color;
use crate::document::{Fill, FillRule, LineCap, LineJoin, SvgDocument, SvgElement, SvgGroup, SvgPath};
use crate::gradient::{GradientStop, GradientUnits, SpreadMethod};
use crate::path::{self, format_number};

const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";
const AAPT_NS: &str = "http://schemas.android.com/aapt";

/// Options for [`generate_with_options`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Mark the drawable as flipped in right-to-left layouts.
    pub auto_mirrored: bool,
}

/// Generate VectorDrawable XML for a document.
pub fn generate(doc: &SvgDocument, auto_mirrored: bool) -> String {
    generate_with_options(doc, &GeneratorOptions { auto_mirrored })
}

/// Generate VectorDrawable XML for a document.
pub fn generate_with_options(doc: &SvgDocument, options: &GeneratorOptions) -> String {
    let mut writer = Writer {
        out: String::new(),
        doc,
    };
    writer.out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");

    let mut attrs = vec![("xmlns:android", ANDROID_NS.to_string())];
    if doc.uses_gradients() {
        attrs.push(("xmlns:aapt", AAPT_NS.to_string()));
    }
    attrs.push(("android:width", format!("{}dp", format_number(doc.width))));
    attrs.push(("android:height", format!("{}dp", format_number(doc.height))));
    attrs.push(("android:viewportWidth", format_number(doc.viewport_width)));
    attrs.push(("android:viewportHeight", format_number(doc.viewport_height)));
    if options.auto_mirrored {
        attrs.push(("android:autoMirrored", "true".to_string()));
    }

    writer.open("vector", &attrs, 0);
    writer.elements(&doc.elements, 1.0, 1);
    writer.close("vector", 0);
    writer.out
}

type Attrs = Vec<(&'static str, String)>;

struct Writer<'a> {
    out: String,
    doc: &'a SvgDocument,
}

impl Writer<'_> {
    fn elements(&mut self, elements: &[SvgElement], opacity: f64, depth: usize) {
        for element in elements {
            match element {
                SvgElement::Path(path) => self.path(path, opacity, depth),
                SvgElement::Group(group) => self.group(group, opacity, depth),
            }
        }
    }

    fn group(&mut self, group: &SvgGroup, opacity: f64, depth: usize) {
        let mut attrs = Attrs::new();
        if let Some(id) = &group.id {
            attrs.push(("android:name", id.clone()));
        }
        if let Some(t) = &group.transform {
            if t.skew_x.is_some() || t.skew_y.is_some() {
                debug!(group = group.id.as_deref(), "dropping skew, not expressible");
            }
            let fields = [
                ("android:rotation", t.rotation),
                ("android:pivotX", t.pivot_x),
                ("android:pivotY", t.pivot_y),
                ("android:scaleX", t.scale_x),
                ("android:scaleY", t.scale_y),
                ("android:translateX", t.translate_x),
                ("android:translateY", t.translate_y),
            ];
            for (name, value) in fields {
                if let Some(v) = value {
                    attrs.push((name, format_number(v)));
                }
            }
        }

        let opacity = opacity * group.opacity.unwrap_or(1.0);
        if group.elements.is_empty() && group.clip_path.is_none() {
            self.empty("group", &attrs, depth);
            return;
        }

        self.open("group", &attrs, depth);
        if let Some(clip) = &group.clip_path {
            self.empty("clip-path", &[("android:pathData", clip.clone())], depth + 1);
        }
        self.elements(&group.elements, opacity, depth + 1);
        self.close("group", depth);
    }

    fn path(&mut self, path: &SvgPath, opacity: f64, depth: usize) {
        let mut attrs = Attrs::new();
        if let Some(id) = &path.id {
            attrs.push(("android:name", id.clone()));
        }
        attrs.push(("android:pathData", path.path_data.clone()));

        let opacity = opacity * path.opacity.unwrap_or(1.0);
        // A gradient that cannot be drawn counts as no fill
        let gradient = if path.fill.is_gradient() {
            self.gradient(path, depth + 2)
        } else {
            None
        };
        let filled = match &path.fill {
            Fill::Solid(color) => {
                attrs.push(("android:fillColor", color.to_hex()));
                true
            }
            Fill::LinearGradient(_) | Fill::RadialGradient(_) if gradient.is_some() => true,
            _ if path.stroke.is_none() => {
                attrs.push(("android:fillColor", Color::BLACK.to_hex()));
                true
            }
            _ => false,
        };
        if filled {
            push_alpha(&mut attrs, "android:fillAlpha", path.fill_opacity, opacity);
        }

        if let Some(stroke) = &path.stroke {
            attrs.push(("android:strokeColor", stroke.to_hex()));
            push_alpha(&mut attrs, "android:strokeAlpha", path.stroke_opacity, opacity);
        }
        if let Some(width) = path.stroke_width {
            attrs.push(("android:strokeWidth", format_number(width)));
        }
        if let Some(cap) = path.stroke_line_cap {
            let cap = match cap {
                LineCap::Butt => "butt",
                LineCap::Round => "round",
                LineCap::Square => "square",
            };
            attrs.push(("android:strokeLineCap", cap.to_string()));
        }
        if let Some(join) = path.stroke_line_join {
            let join = match join {
                LineJoin::Miter => "miter",
                LineJoin::Round => "round",
                LineJoin::Bevel => "bevel",
            };
            attrs.push(("android:strokeLineJoin", join.to_string()));
        }
        if let Some(limit) = path.stroke_miter_limit {
            attrs.push(("android:strokeMiterLimit", format_number(limit)));
        }
        if let Some(dashes) = &path.stroke_dash_array {
            let dashes: Vec<String> = dashes.iter().map(|d| format_number(*d)).collect();
            attrs.push(("android:strokeDashArray", dashes.join(",")));
        }
        if let Some(offset) = path.stroke_dash_offset {
            attrs.push(("android:strokeDashOffset", format_number(offset)));
        }
        if let Some(rule) = path.fill_rule {
            let rule = match rule {
                FillRule::EvenOdd => "evenOdd",
                FillRule::NonZero => "nonZero",
            };
            attrs.push(("android:fillType", rule.to_string()));
        }

        match gradient {
            Some(body) => {
                self.open("path", &attrs, depth);
                self.line(depth + 1, "<aapt:attr name=\"android:fillColor\">");
                self.out.push_str(&body);
                self.line(depth + 1, "</aapt:attr>");
                self.close("path", depth);
            }
            None => self.empty("path", &attrs, depth),
        }
    }

    /// The `<gradient>` element for a gradient-filled path, mapped into the
    /// path's own coordinates.
    fn gradient(&self, path: &SvgPath, depth: usize) -> Option<String> {
        let mut body = Writer {
            out: String::new(),
            doc: self.doc,
        };

        let (mut attrs, stops, spread) = match &path.fill {
            Fill::LinearGradient(id) => {
                let Some(g) = self.doc.linear_gradients.get(id) else {
                    debug!(id = id.as_str(), "missing linear gradient");
                    return None;
                };
                let bbox = bbox_for(g.units, path);
                let ((x1, y1), (x2, y2)) = g.endpoints(bbox);
                let attrs: Attrs = vec![
                    ("android:type", "linear".to_string()),
                    ("android:startX", format_number(x1)),
                    ("android:startY", format_number(y1)),
                    ("android:endX", format_number(x2)),
                    ("android:endY", format_number(y2)),
                ];
                (attrs, &g.stops, g.spread)
            }
            Fill::RadialGradient(id) => {
                let Some(g) = self.doc.radial_gradients.get(id) else {
                    debug!(id = id.as_str(), "missing radial gradient");
                    return None;
                };
                let bbox = bbox_for(g.units, path);
                let ((cx, cy), r) = g.circle(bbox);
                let attrs: Attrs = vec![
                    ("android:type", "radial".to_string()),
                    ("android:centerX", format_number(cx)),
                    ("android:centerY", format_number(cy)),
                    ("android:gradientRadius", format_number(r)),
                ];
                (attrs, &g.stops, g.spread)
            }
            _ => return None,
        };

        if stops.is_empty() {
            debug!("gradient has no stops");
            return None;
        }

        let tile_mode = match spread {
            SpreadMethod::Pad => "clamp",
            SpreadMethod::Reflect => "mirror",
            SpreadMethod::Repeat => "repeat",
        };
        attrs.push(("android:tileMode", tile_mode.to_string()));

        body.open("gradient", &attrs, depth);
        for stop in stops {
            body.empty("item", &stop_attrs(stop), depth + 1);
        }
        body.close("gradient", depth);
        Some(body.out)
    }

    fn open(&mut self, name: &str, attrs: &[(&str, String)], depth: usize) {
        self.start_tag(name, attrs, depth);
        self.out.push_str(">\n");
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, String)], depth: usize) {
        self.start_tag(name, attrs, depth);
        self.out.push_str(" />\n");
    }

    fn close(&mut self, name: &str, depth: usize) {
        self.line(depth, &format!("</{name}>"));
    }

    /// `<name` followed by one attribute per line.
    fn start_tag(&mut self, name: &str, attrs: &[(&str, String)], depth: usize) {
        indent(&mut self.out, depth);
        self.out.push('<');
        self.out.push_str(name);

        for (i, (key, value)) in attrs.iter().enumerate() {
            if i == 0 {
                self.out.push(' ');
            } else {
                self.out.push('\n');
                indent(&mut self.out, depth + 1);
            }
            self.out.push_str(key);
            self.out.push_str("=\"");
            push_escaped_attr(&mut self.out, value);
            self.out.push('"');
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        indent(&mut self.out, depth);
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn bbox_for(units: GradientUnits, path: &SvgPath) -> Option<path::Bounds> {
    match units {
        GradientUnits::ObjectBoundingBox => path::bounds(&path.commands),
        GradientUnits::UserSpaceOnUse => None,
    }
}

fn stop_attrs(stop: &GradientStop) -> Attrs {
    vec![
        ("android:offset", format_number(stop.offset)),
        ("android:color", stop.effective_color().to_argb_hex()),
    ]
}

fn push_alpha(attrs: &mut Attrs, name: &'static str, own: Option<f64>, inherited: f64) {
    let alpha = own.unwrap_or(1.0) * inherited;
    if alpha < 1.0 {
        attrs.push((name, format_number(alpha)));
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

fn push_escaped_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
