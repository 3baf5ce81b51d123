//! SVG `transform` attribute parsing.
//!
//! VectorDrawable groups only know translate, scale, rotate-about-pivot, so
//! transforms are kept as independent fields instead of a matrix.

/// A transform decomposed into independently optional fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgTransform {
    pub translate_x: Option<f64>,
    pub translate_y: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    /// Degrees, clockwise.
    pub rotation: Option<f64>,
    pub pivot_x: Option<f64>,
    pub pivot_y: Option<f64>,
    /// Degrees.
    pub skew_x: Option<f64>,
    /// Degrees.
    pub skew_y: Option<f64>,
}

const IDENTITY_EPSILON: f64 = 1e-9;

impl SvgTransform {
    /// Parse a transform list such as `translate(10 20) rotate(45)`.
    ///
    /// Each function writes its own fields; a later function overwrites fields
    /// set by an earlier one instead of composing with it. Unknown functions
    /// are skipped. Returns `None` when nothing produced a field.
    pub fn parse(value: &str) -> Option<SvgTransform> {
        let mut transform = SvgTransform::default();
        let mut rest = value.trim();

        while let Some(open) = rest.find('(') {
            let name = rest[..open].trim_matches(|c: char| c.is_whitespace() || c == ',');
            let Some(close) = rest[open..].find(')').map(|i| open + i) else {
                break;
            };
            let args: Vec<f64> = rest[open + 1..close]
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .filter_map(|p| p.parse().ok())
                .filter(|v: &f64| v.is_finite())
                .collect();

            match (name, args.as_slice()) {
                ("translate", [x, rest @ ..]) => {
                    transform.translate_x = Some(*x);
                    transform.translate_y = Some(rest.first().copied().unwrap_or(0.0));
                }
                ("scale", [x, rest @ ..]) => {
                    transform.scale_x = Some(*x);
                    transform.scale_y = Some(rest.first().copied().unwrap_or(*x));
                }
                ("rotate", [angle, rest @ ..]) => {
                    transform.rotation = Some(*angle);
                    if let [cx, cy] = rest {
                        transform.pivot_x = Some(*cx);
                        transform.pivot_y = Some(*cy);
                    }
                }
                ("skewX", [angle]) => transform.skew_x = Some(*angle),
                ("skewY", [angle]) => transform.skew_y = Some(*angle),
                ("matrix", [a, b, c, d, e, f]) => {
                    transform.merge(SvgTransform::from_matrix(*a, *b, *c, *d, *e, *f));
                }
                _ => {}
            }

            rest = &rest[close + 1..];
        }

        (!transform.is_empty()).then_some(transform)
    }

    /// Decompose `matrix(a b c d e f)` into translate, scale and rotation.
    ///
    /// Skew is lost. Fields that come out as the identity are left unset.
    pub fn from_matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> SvgTransform {
        let scale_x = (a * a + b * b).sqrt();
        let mut scale_y = (c * c + d * d).sqrt();
        if a * d - b * c < 0.0 {
            scale_y = -scale_y;
        }
        let rotation = b.atan2(a).to_degrees();

        let non_zero = |v: f64| (v.abs() > IDENTITY_EPSILON).then_some(v);
        let non_one = |v: f64| ((v - 1.0).abs() > IDENTITY_EPSILON).then_some(v);

        let (translate_x, translate_y) = match (non_zero(e), non_zero(f)) {
            (None, None) => (None, None),
            _ => (Some(e), Some(f)),
        };
        let (scale_x, scale_y) = match (non_one(scale_x), non_one(scale_y)) {
            (None, None) => (None, None),
            _ => (Some(scale_x), Some(scale_y)),
        };

        SvgTransform {
            translate_x,
            translate_y,
            scale_x,
            scale_y,
            rotation: non_zero(rotation),
            ..Default::default()
        }
    }

    /// A pure translation.
    pub fn translation(x: f64, y: f64) -> SvgTransform {
        SvgTransform {
            translate_x: Some(x),
            translate_y: Some(y),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == SvgTransform::default()
    }

    /// Whether this does anything beyond translating.
    pub fn has_linear_part(&self) -> bool {
        self.scale_x.is_some()
            || self.scale_y.is_some()
            || self.rotation.is_some()
            || self.skew_x.is_some()
            || self.skew_y.is_some()
    }

    /// Map a point through this transform: skew, scale and rotation about the
    /// pivot, then translation.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let px = self.pivot_x.unwrap_or(0.0);
        let py = self.pivot_y.unwrap_or(0.0);
        let (mut x, mut y) = (x - px, y - py);

        if let Some(skew) = self.skew_x {
            x += y * skew.to_radians().tan();
        }
        if let Some(skew) = self.skew_y {
            y += x * skew.to_radians().tan();
        }

        x *= self.scale_x.unwrap_or(1.0);
        y *= self.scale_y.unwrap_or(1.0);

        if let Some(rotation) = self.rotation {
            let (sin, cos) = rotation.to_radians().sin_cos();
            (x, y) = (x * cos - y * sin, x * sin + y * cos);
        }

        (
            x + px + self.translate_x.unwrap_or(0.0),
            y + py + self.translate_y.unwrap_or(0.0),
        )
    }

    /// Mean absolute scale, used to approximate radii under non-uniform scaling.
    pub fn mean_scale(&self) -> f64 {
        (self.scale_x.unwrap_or(1.0).abs() + self.scale_y.unwrap_or(1.0).abs()) / 2.0
    }

    fn merge(&mut self, other: SvgTransform) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(translate_x, translate_y, scale_x, scale_y, rotation);
    }
}
