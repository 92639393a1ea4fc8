use plotters::prelude::*;

/// Default series color cycle.
pub const SERIES_COLORS: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Color for the i-th series, cycling past the palette end.
pub fn series_color(idx: usize) -> RGBColor {
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

/// Parse a color string: named colors or #RRGGBB hex. Unknown strings and
/// None fall back to black.
pub fn parse_color(color: Option<&str>) -> RGBColor {
    match color {
        Some("red") => RED,
        Some("green") => GREEN,
        Some("blue") => BLUE,
        Some("black") => BLACK,
        Some("yellow") => YELLOW,
        Some("cyan") => CYAN,
        Some("magenta") => MAGENTA,
        Some("white") => WHITE,
        Some(other) => parse_hex(other).unwrap_or(BLACK),
        None => BLACK,
    }
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_color_cycles() {
        assert_eq!(series_color(0), SERIES_COLORS[0]);
        assert_eq!(series_color(9), SERIES_COLORS[9]);
        assert_eq!(series_color(10), SERIES_COLORS[0]);
        assert_eq!(series_color(23), SERIES_COLORS[3]);
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color(Some("red")), RED);
        assert_eq!(parse_color(Some("white")), WHITE);
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color(Some("#000000")), RGBColor(0, 0, 0));
        assert_eq!(parse_color(Some("#1f77b4")), RGBColor(0x1f, 0x77, 0xb4));
        assert_eq!(parse_color(Some("#FF0000")), RGBColor(255, 0, 0));
    }

    #[test]
    fn test_unknown_colors_default_to_black() {
        assert_eq!(parse_color(Some("chartreuse-ish")), BLACK);
        assert_eq!(parse_color(Some("#12")), BLACK);
        assert_eq!(parse_color(Some("#zzzzzz")), BLACK);
        assert_eq!(parse_color(None), BLACK);
    }
}
