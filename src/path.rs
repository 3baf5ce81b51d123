//! SVG path data scanning and number formatting.
//!
//! SVG path syntax: https://www.w3.org/TR/SVG/paths.html

use thiserror::Error;

/// A path command.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    /// M/m - Move to
    MoveTo { rel: bool, x: f64, y: f64 },
    /// L/l - Line to
    LineTo { rel: bool, x: f64, y: f64 },
    /// H/h - Horizontal line to
    HorizontalTo { rel: bool, x: f64 },
    /// V/v - Vertical line to
    VerticalTo { rel: bool, y: f64 },
    /// C/c - Cubic bezier
    CurveTo {
        rel: bool,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// S/s - Smooth cubic bezier
    SmoothCurveTo {
        rel: bool,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// Q/q - Quadratic bezier
    QuadTo {
        rel: bool,
        x1: f64,
        y1: f64,
        x: f64,
        y: f64,
    },
    /// T/t - Smooth quadratic bezier
    SmoothQuadTo { rel: bool, x: f64, y: f64 },
    /// A/a - Arc
    Arc {
        rel: bool,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    /// Z/z - Close path
    ClosePath,
}

impl PathCommand {
    /// The command letter this command would be written with.
    pub fn letter(&self) -> char {
        let (upper, rel) = match self {
            PathCommand::MoveTo { rel, .. } => ('M', *rel),
            PathCommand::LineTo { rel, .. } => ('L', *rel),
            PathCommand::HorizontalTo { rel, .. } => ('H', *rel),
            PathCommand::VerticalTo { rel, .. } => ('V', *rel),
            PathCommand::CurveTo { rel, .. } => ('C', *rel),
            PathCommand::SmoothCurveTo { rel, .. } => ('S', *rel),
            PathCommand::QuadTo { rel, .. } => ('Q', *rel),
            PathCommand::SmoothQuadTo { rel, .. } => ('T', *rel),
            PathCommand::Arc { rel, .. } => ('A', *rel),
            PathCommand::ClosePath => ('Z', false),
        };
        if rel { upper.to_ascii_lowercase() } else { upper }
    }
}

/// Path-data grammar errors. Each carries the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("unexpected character '{token}' at offset {offset}")]
    UnexpectedCharacter { token: char, offset: usize },

    #[error("unexpected end of path data in '{command}' command")]
    UnexpectedEnd { command: char },

    #[error("invalid number '{token}' at offset {offset}")]
    InvalidNumber { token: String, offset: usize },

    #[error("unknown command '{token}' at offset {offset}")]
    UnknownCommand { token: char, offset: usize },

    #[error("invalid arc arguments '{token}' at offset {offset}")]
    InvalidArc { token: String, offset: usize },
}

/// Scan SVG path data into a command sequence.
pub fn scan_path(d: &str) -> Result<Vec<PathCommand>, PathError> {
    PathScanner::new(d).scan()
}

/// Format a number for output.
///
/// Values within 1e-4 of an integer (and under 10,000 in magnitude) print as
/// that integer. Everything else prints with 4 decimal places, trailing zeros
/// and a dangling decimal point removed.
pub fn format_number(n: f64) -> String {
    let rounded = n.round();
    if (n - rounded).abs() < 1e-4 && n.abs() < 10_000.0 {
        // `as i64` folds -0.0 into 0
        return format!("{}", rounded as i64);
    }

    let s = format!("{:.4}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".into() } else { s.to_string() }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Arcs are sampled at this many points when computing bounds.
const ARC_SAMPLES: u32 = 16;

/// Bounding box of a command sequence.
///
/// Curve control points are included, so curves get a box that contains them
/// but may be slightly larger than the tight box. Returns `None` for an empty
/// sequence.
pub fn bounds(commands: &[PathCommand]) -> Option<Bounds> {
    let mut acc: Option<Bounds> = None;
    let mut include = |x: f64, y: f64| {
        acc = Some(match acc {
            Some(mut b) => {
                b.include(x, y);
                b
            }
            None => Bounds::point(x, y),
        });
    };

    let (mut cx, mut cy) = (0.0, 0.0);
    let (mut sx, mut sy) = (0.0, 0.0);

    for cmd in commands {
        let (ox, oy) = match cmd {
            PathCommand::ClosePath => (0.0, 0.0),
            _ if cmd.letter().is_ascii_lowercase() => (cx, cy),
            _ => (0.0, 0.0),
        };

        match *cmd {
            PathCommand::MoveTo { x, y, .. } => {
                (cx, cy) = (ox + x, oy + y);
                (sx, sy) = (cx, cy);
            }
            PathCommand::LineTo { x, y, .. } | PathCommand::SmoothQuadTo { x, y, .. } => {
                (cx, cy) = (ox + x, oy + y);
            }
            PathCommand::HorizontalTo { x, .. } => cx = ox + x,
            PathCommand::VerticalTo { y, .. } => cy = oy + y,
            PathCommand::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
                ..
            } => {
                include(ox + x1, oy + y1);
                include(ox + x2, oy + y2);
                (cx, cy) = (ox + x, oy + y);
            }
            PathCommand::SmoothCurveTo { x2, y2, x, y, .. } => {
                include(ox + x2, oy + y2);
                (cx, cy) = (ox + x, oy + y);
            }
            PathCommand::QuadTo { x1, y1, x, y, .. } => {
                include(ox + x1, oy + y1);
                (cx, cy) = (ox + x, oy + y);
            }
            PathCommand::Arc {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
                ..
            } => {
                let (ex, ey) = (ox + x, oy + y);
                sample_arc(
                    (cx, cy),
                    (rx, ry),
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    (ex, ey),
                    &mut include,
                );
                (cx, cy) = (ex, ey);
            }
            PathCommand::ClosePath => (cx, cy) = (sx, sy),
        }
        include(cx, cy);
    }

    acc
}

/// Walk an endpoint-parameterized arc, calling `f` at sample points.
fn sample_arc(
    (x1, y1): (f64, f64),
    (rx, ry): (f64, f64),
    rotation: f64,
    large_arc: bool,
    sweep: bool,
    (x2, y2): (f64, f64),
    f: &mut impl FnMut(f64, f64),
) {
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx == 0.0 || ry == 0.0 || (x1 == x2 && y1 == y2) {
        return;
    }

    let (sin, cos) = rotation.to_radians().sin_cos();
    let (dx, dy) = ((x1 - x2) / 2.0, (y1 - y2) / 2.0);
    let x1p = cos * dx + sin * dy;
    let y1p = -sin * dx + cos * dy;

    // Scale radii up when the endpoints are too far apart
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        rx *= lambda.sqrt();
        ry *= lambda.sqrt();
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut coef = if den == 0.0 { 0.0 } else { (num / den).max(0.0).sqrt() };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;
    let center_x = cos * cxp - sin * cyp + (x1 + x2) / 2.0;
    let center_y = sin * cxp + cos * cyp + (y1 + y2) / 2.0;

    let theta1 = ((y1p - cyp) / ry).atan2((x1p - cxp) / rx);
    let theta2 = ((-y1p - cyp) / ry).atan2((-x1p - cxp) / rx);
    let mut delta = theta2 - theta1;
    if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    } else if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    }

    for i in 1..ARC_SAMPLES {
        let t = theta1 + delta * i as f64 / ARC_SAMPLES as f64;
        let (st, ct) = t.sin_cos();
        f(
            center_x + rx * ct * cos - ry * st * sin,
            center_y + rx * ct * sin + ry * st * cos,
        );
    }
}

struct PathScanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PathScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn scan(&mut self) -> Result<Vec<PathCommand>, PathError> {
        let mut commands = Vec::new();

        loop {
            self.skip_separators();
            let Some(b) = self.peek() else {
                break;
            };
            if !b.is_ascii_alphabetic() {
                return Err(self.unexpected_character());
            }

            let offset = self.pos;
            self.pos += 1;
            let letter = b as char;
            let rel = b.is_ascii_lowercase();

            match b.to_ascii_lowercase() {
                b'z' => commands.push(PathCommand::ClosePath),
                b'm' => {
                    // Coordinate pairs after the first are implicit line-tos
                    let mut first = true;
                    self.repeat(&mut commands, |s| {
                        let (x, y) = s.pair(letter)?;
                        if std::mem::take(&mut first) {
                            Ok(PathCommand::MoveTo { rel, x, y })
                        } else {
                            Ok(PathCommand::LineTo { rel, x, y })
                        }
                    })?;
                }
                b'l' => self.repeat(&mut commands, |s| {
                    let (x, y) = s.pair(letter)?;
                    Ok(PathCommand::LineTo { rel, x, y })
                })?,
                b'h' => self.repeat(&mut commands, |s| {
                    let x = s.number(letter)?;
                    Ok(PathCommand::HorizontalTo { rel, x })
                })?,
                b'v' => self.repeat(&mut commands, |s| {
                    let y = s.number(letter)?;
                    Ok(PathCommand::VerticalTo { rel, y })
                })?,
                b'c' => self.repeat(&mut commands, |s| {
                    let (x1, y1) = s.pair(letter)?;
                    let (x2, y2) = s.pair(letter)?;
                    let (x, y) = s.pair(letter)?;
                    Ok(PathCommand::CurveTo {
                        rel,
                        x1,
                        y1,
                        x2,
                        y2,
                        x,
                        y,
                    })
                })?,
                b's' => self.repeat(&mut commands, |s| {
                    let (x2, y2) = s.pair(letter)?;
                    let (x, y) = s.pair(letter)?;
                    Ok(PathCommand::SmoothCurveTo { rel, x2, y2, x, y })
                })?,
                b'q' => self.repeat(&mut commands, |s| {
                    let (x1, y1) = s.pair(letter)?;
                    let (x, y) = s.pair(letter)?;
                    Ok(PathCommand::QuadTo { rel, x1, y1, x, y })
                })?,
                b't' => self.repeat(&mut commands, |s| {
                    let (x, y) = s.pair(letter)?;
                    Ok(PathCommand::SmoothQuadTo { rel, x, y })
                })?,
                b'a' => self.repeat(&mut commands, |s| s.arc(letter, rel))?,
                _ => {
                    return Err(PathError::UnknownCommand {
                        token: letter,
                        offset,
                    });
                }
            }
        }

        Ok(commands)
    }

    /// Parse one argument group, then keep going while more numbers follow.
    fn repeat(
        &mut self,
        commands: &mut Vec<PathCommand>,
        mut group: impl FnMut(&mut Self) -> Result<PathCommand, PathError>,
    ) -> Result<(), PathError> {
        loop {
            commands.push(group(self)?);
            self.skip_separators();
            if !self.at_number() {
                return Ok(());
            }
        }
    }

    fn pair(&mut self, command: char) -> Result<(f64, f64), PathError> {
        let x = self.number(command)?;
        let y = self.number(command)?;
        Ok((x, y))
    }

    fn arc(&mut self, command: char, rel: bool) -> Result<PathCommand, PathError> {
        self.skip_separators();
        let start = self.pos;

        let mut args = [0.0; 7];
        for arg in &mut args {
            *arg = self.number(command).map_err(|_| {
                let token = self.input.get(start..self.pos).unwrap_or("").trim();
                PathError::InvalidArc {
                    token: if token.is_empty() {
                        command.to_string()
                    } else {
                        token.to_string()
                    },
                    offset: start,
                }
            })?;
        }

        let [rx, ry, x_axis_rotation, large_arc, sweep, x, y] = args;
        Ok(PathCommand::Arc {
            rel,
            rx,
            ry,
            x_axis_rotation,
            large_arc: large_arc != 0.0,
            sweep: sweep != 0.0,
            x,
            y,
        })
    }

    fn number(&mut self, command: char) -> Result<f64, PathError> {
        self.skip_separators();

        let start = self.pos;
        match self.peek() {
            None => return Err(PathError::UnexpectedEnd { command }),
            Some(b) if !is_number_start(b) => return Err(self.unexpected_character()),
            Some(_) => {}
        }

        // Optional sign
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }

        let mut digits = self.skip_digits();

        // A second '.' starts the next number
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.skip_digits();
        }

        if digits == 0 {
            return Err(self.invalid_number(start));
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                return Err(self.invalid_number(start));
            }
        }

        self.input[start..self.pos]
            .parse()
            .map_err(|_| self.invalid_number(start))
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn skip_separators(&mut self) {
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_whitespace() || b == b',')
        {
            self.pos += 1;
        }
    }

    fn at_number(&self) -> bool {
        self.peek().is_some_and(is_number_start)
    }

    fn unexpected_character(&self) -> PathError {
        PathError::UnexpectedCharacter {
            token: self.input[self.pos..].chars().next().unwrap_or('\0'),
            offset: self.pos,
        }
    }

    fn invalid_number(&self, start: usize) -> PathError {
        PathError::InvalidNumber {
            token: self.input[start..self.pos].to_string(),
            offset: start,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }
}

fn is_number_start(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+')
}
