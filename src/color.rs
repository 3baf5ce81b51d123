//! Color literal parsing and formatting.

/// An 8-bit RGB color with a floating point alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("pink", Color::rgb(255, 192, 203)),
    ("brown", Color::rgb(165, 42, 42)),
    ("transparent", Color::rgba(0, 0, 0, 0.0)),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a color literal.
    ///
    /// Returns `None` for `none`, the empty string, and anything that is not
    /// recognized. Unknown colors never fail the document.
    pub fn parse(value: &str) -> Option<Color> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return None;
        }

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }

        if value.eq_ignore_ascii_case("currentColor") {
            return Some(Color::BLACK);
        }

        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return parse_rgb_args(args.strip_suffix(')')?);
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, color)| *color)
    }

    /// The alpha channel as a byte.
    pub fn alpha_byte(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Multiply the alpha channel by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..self
        }
    }

    /// `#RRGGBB` when fully opaque, `#AARRGGBB` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            self.to_argb_hex()
        }
    }

    /// Always `#AARRGGBB`.
    pub fn to_argb_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            self.alpha_byte(),
            self.r,
            self.g,
            self.b
        )
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
            Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)? as f64 / 255.0,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 255.0 / 100.0,
            None => s.parse::<f64>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };

    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f64>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };

    Some(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}
