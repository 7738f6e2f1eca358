// Hex color parsing and the palette derived from the user's primary color.
// Everything here is pure: the same input always yields the same palette.

/// Shade is the primary color darkened by this many percent.
pub const SHADE_PERCENT: f64 = -20.0;
/// Tint is the primary color brightened by this many percent.
pub const TINT_PERCENT: f64 = 20.0;

// Above this perceived brightness a color counts as "light".
const LIGHT_THRESHOLD: f64 = 128.0;

pub const BLACK: &str = "#000000";
pub const WHITE: &str = "#ffffff";

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, lowercase and zero-padded.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// The `r, g, b` form stylesheets feed into `rgba(var(--x-rgb), a)`.
    pub fn triple(self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }
}

/// Parse a 6-digit hex color, with or without a leading `#`.
///
/// Shorthand (`#fff`), named colors, `rgba(...)` and padded strings are
/// rejected rather than normalized.
pub fn parse_hex_color(input: &str) -> Option<Rgb> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

/// ITU-R BT.601 luma, 0.0 to 255.0.
pub fn perceived_brightness(rgb: Rgb) -> f64 {
    (rgb.r as f64 * 299.0 + rgb.g as f64 * 587.0 + rgb.b as f64 * 114.0) / 1000.0
}

/// True when the color is light enough to need dark foreground text.
/// Unparsable input is not light.
pub fn is_light(hex: &str) -> bool {
    parse_hex_color(hex).is_some_and(|rgb| perceived_brightness(rgb) > LIGHT_THRESHOLD)
}

/// Scale every channel by `percent` independently, clamping to 0..=255.
///
/// This is plain RGB scaling, so extreme deltas can shift hue once one
/// channel saturates. Unparsable input comes back unchanged.
pub fn adjust_brightness(hex: &str, percent: f64) -> String {
    let Some(rgb) = parse_hex_color(hex) else {
        return hex.to_string();
    };
    let scale = |c: u8| -> u8 {
        let c = c as f64;
        (c + c * percent / 100.0).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(scale(rgb.r), scale(rgb.g), scale(rgb.b)).to_hex()
}

/// Black on light colors, white on everything else.
pub fn contrast_color(hex: &str) -> &'static str {
    if is_light(hex) {
        BLACK
    } else {
        WHITE
    }
}

/// Everything the stylesheet needs from one primary color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub base: String,
    pub rgb: String,
    pub contrast: String,
    pub contrast_rgb: String,
    pub shade: String,
    pub shade_rgb: String,
    pub tint: String,
    pub tint_rgb: String,
}

impl Palette {
    /// Derive the palette, or `None` if `hex` isn't a 6-digit hex color.
    pub fn derive(hex: &str) -> Option<Self> {
        let base = parse_hex_color(hex)?;
        let contrast = contrast_color(hex);
        let shade = adjust_brightness(hex, SHADE_PERCENT);
        let tint = adjust_brightness(hex, TINT_PERCENT);

        // The adjusted strings come from `to_hex`, so they always re-parse.
        let triple_of = |s: &str| parse_hex_color(s).map(Rgb::triple).unwrap_or_default();

        Some(Self {
            base: hex.to_string(),
            rgb: base.triple(),
            contrast: contrast.to_string(),
            contrast_rgb: triple_of(contrast),
            shade_rgb: triple_of(&shade),
            shade,
            tint_rgb: triple_of(&tint),
            tint,
        })
    }
}
