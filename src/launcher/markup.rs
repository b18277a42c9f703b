//! SVG markup for the launched kid and the splat overlays.
//!
//! All generators are pure: same appearance in, same markup out. Colours come
//! from the [`Appearance`] record; outlines and shading are darkened variants
//! of the same tones.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex colour '{0}' (expected #rrggbb)")]
    InvalidHex(String),
}

/// 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (leading `#` optional, case-insensitive).
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::InvalidHex(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Each channel minus `round(2.55 * percent)`, floored at 0.
    pub fn darken(self, percent: f64) -> Self {
        let amount = (2.55 * percent.clamp(0.0, 100.0)).round() as u8;
        Self::new(
            self.r.saturating_sub(amount),
            self.g.saturating_sub(amount),
            self.b.saturating_sub(amount),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Hex-string front end for [`Rgb::darken`].
pub fn darken_color(hex: &str, percent: f64) -> Result<String, ColorError> {
    Ok(Rgb::parse_hex(hex)?.darken(percent).to_string())
}

pub const DEFAULT_SKIN_TONE: Rgb = Rgb::new(0xE8, 0xB8, 0x9D);
pub const DEFAULT_HAIR_COLOR: Rgb = Rgb::new(0x4A, 0x37, 0x28);

const SHIRT: &str = "#e5533d";
const SHORTS: &str = "#2f5fa7";
const SHOE: &str = "#333333";

/// Cosmetic colours of the launched kid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Appearance {
    pub skin_tone: Rgb,
    pub hair_color: Rgb,
}

impl Default for Appearance {
    fn default() -> Self {
        Self { skin_tone: DEFAULT_SKIN_TONE, hair_color: DEFAULT_HAIR_COLOR }
    }
}

impl Appearance {
    /// Fills absent fields with the defaults.
    pub fn with_overrides(skin_tone: Option<Rgb>, hair_color: Option<Rgb>) -> Self {
        Self {
            skin_tone: skin_tone.unwrap_or(DEFAULT_SKIN_TONE),
            hair_color: hair_color.unwrap_or(DEFAULT_HAIR_COLOR),
        }
    }
}

/// Kid mid-flight: arms and legs spread, surprised face.
pub fn create_flying_figure_markup(look: &Appearance) -> String {
    let skin = look.skin_tone;
    let outline = skin.darken(30.0);
    let cheek = skin.darken(10.0);
    let hair = look.hair_color;
    let hair_shade = hair.darken(15.0);
    format!(
        concat!(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100' width='100%' height='100%'>",
            // limbs behind the body
            "<line x1='38' y1='52' x2='12' y2='34' stroke='{skin}' stroke-width='7' stroke-linecap='round'/>",
            "<line x1='62' y1='52' x2='88' y2='34' stroke='{skin}' stroke-width='7' stroke-linecap='round'/>",
            "<line x1='44' y1='76' x2='26' y2='94' stroke='{skin}' stroke-width='8' stroke-linecap='round'/>",
            "<line x1='56' y1='76' x2='74' y2='94' stroke='{skin}' stroke-width='8' stroke-linecap='round'/>",
            "<circle cx='25' cy='95' r='5' fill='{shoe}'/><circle cx='75' cy='95' r='5' fill='{shoe}'/>",
            // torso
            "<rect x='36' y='46' width='28' height='22' rx='7' fill='{shirt}'/>",
            "<rect x='38' y='66' width='24' height='12' rx='4' fill='{shorts}'/>",
            // head
            "<circle cx='50' cy='28' r='19' fill='{skin}' stroke='{outline}' stroke-width='2'/>",
            "<path d='M31 24 Q34 6 50 8 Q66 6 69 24 Q60 14 50 16 Q40 14 31 24 Z' fill='{hair}' stroke='{hair_shade}' stroke-width='1.5'/>",
            "<circle cx='43' cy='27' r='4' fill='#ffffff'/><circle cx='57' cy='27' r='4' fill='#ffffff'/>",
            "<circle cx='43' cy='27' r='2' fill='#222222'/><circle cx='57' cy='27' r='2' fill='#222222'/>",
            "<circle cx='37' cy='34' r='3' fill='{cheek}'/><circle cx='63' cy='34' r='3' fill='{cheek}'/>",
            "<ellipse cx='50' cy='38' rx='4' ry='5' fill='#7a2b2b'/>",
            "</svg>"
        ),
        skin = skin,
        outline = outline,
        cheek = cheek,
        hair = hair,
        hair_shade = hair_shade,
        shirt = SHIRT,
        shorts = SHORTS,
        shoe = SHOE,
    )
}

/// Kid flattened against the glass: wide squashed face, X eyes, splayed limbs.
pub fn create_impact_figure_markup(look: &Appearance) -> String {
    let skin = look.skin_tone;
    let outline = skin.darken(30.0);
    let pressed = skin.darken(12.0);
    let hair = look.hair_color;
    let hair_shade = hair.darken(15.0);
    format!(
        concat!(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 140 120' width='100%' height='100%'>",
            "<line x1='48' y1='70' x2='6' y2='52' stroke='{skin}' stroke-width='9' stroke-linecap='round'/>",
            "<line x1='92' y1='70' x2='134' y2='52' stroke='{skin}' stroke-width='9' stroke-linecap='round'/>",
            "<circle cx='6' cy='52' r='7' fill='{pressed}'/><circle cx='134' cy='52' r='7' fill='{pressed}'/>",
            "<line x1='58' y1='98' x2='34' y2='116' stroke='{skin}' stroke-width='10' stroke-linecap='round'/>",
            "<line x1='82' y1='98' x2='106' y2='116' stroke='{skin}' stroke-width='10' stroke-linecap='round'/>",
            "<rect x='46' y='64' width='48' height='26' rx='9' fill='{shirt}'/>",
            "<rect x='50' y='86' width='40' height='14' rx='5' fill='{shorts}'/>",
            // squashed face pressed flat
            "<ellipse cx='70' cy='38' rx='34' ry='26' fill='{skin}' stroke='{outline}' stroke-width='2.5'/>",
            "<ellipse cx='70' cy='38' rx='28' ry='20' fill='none' stroke='{pressed}' stroke-width='3' opacity='0.6'/>",
            "<path d='M36 30 Q40 8 70 10 Q100 8 104 30 Q88 18 70 20 Q52 18 36 30 Z' fill='{hair}' stroke='{hair_shade}' stroke-width='1.5'/>",
            "<path d='M52 30 L62 40 M62 30 L52 40' stroke='#222222' stroke-width='3' stroke-linecap='round'/>",
            "<path d='M78 30 L88 40 M88 30 L78 40' stroke='#222222' stroke-width='3' stroke-linecap='round'/>",
            "<ellipse cx='70' cy='46' rx='9' ry='4' fill='{pressed}'/>",
            "<path d='M56 54 Q70 60 84 54' stroke='#7a2b2b' stroke-width='3' fill='none' stroke-linecap='round'/>",
            "</svg>"
        ),
        skin = skin,
        outline = outline,
        pressed = pressed,
        hair = hair,
        hair_shade = hair_shade,
        shirt = SHIRT,
        shorts = SHORTS,
    )
}

/// Cracked-glass lines radiating from the viewport centre.
pub fn crack_overlay_markup() -> String {
    let mut paths = String::new();
    // (angle deg, length %) pairs; fixed so the crack looks the same every time
    const RAYS: [(f64, f64); 9] = [
        (8.0, 34.0),
        (47.0, 26.0),
        (85.0, 38.0),
        (128.0, 30.0),
        (166.0, 36.0),
        (203.0, 24.0),
        (241.0, 33.0),
        (282.0, 28.0),
        (321.0, 37.0),
    ];
    for (angle, len) in RAYS {
        let rad = angle.to_radians();
        let mid_x = 50.0 + rad.cos() * len * 0.5 + (rad * 3.0).sin() * 2.0;
        let mid_y = 50.0 + rad.sin() * len * 0.5 + (rad * 3.0).cos() * 2.0;
        let end_x = 50.0 + rad.cos() * len;
        let end_y = 50.0 + rad.sin() * len;
        paths.push_str(&format!(
            "<polyline points='50,50 {:.1},{:.1} {:.1},{:.1}' fill='none' stroke='rgba(255,255,255,0.85)' stroke-width='0.35'/>",
            mid_x, mid_y, end_x, end_y
        ));
    }
    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100' preserveAspectRatio='none' width='100%' height='100%'>{paths}<circle cx='50' cy='50' r='3' fill='none' stroke='rgba(255,255,255,0.9)' stroke-width='0.4'/></svg>"
    )
}

/// Greasy smudge left where the face hit the glass.
pub fn smear_overlay_markup() -> String {
    concat!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100' preserveAspectRatio='none' width='100%' height='100%'>",
        "<defs><radialGradient id='splat-smear-g' cx='50%' cy='50%' r='50%'>",
        "<stop offset='0%' stop-color='rgba(255,255,255,0.35)'/>",
        "<stop offset='100%' stop-color='rgba(255,255,255,0)'/>",
        "</radialGradient></defs>",
        "<ellipse cx='50' cy='52' rx='16' ry='12' fill='url(#splat-smear-g)'/>",
        "<path d='M40 56 Q44 72 42 86 M58 56 Q55 70 57 80' stroke='rgba(255,255,255,0.18)' stroke-width='1.5' fill='none'/>",
        "</svg>"
    )
    .to_string()
}

/// One drool trail; the element's height does the animating, the markup just
/// stretches to fill it.
pub fn drool_trail_markup() -> String {
    concat!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 10 100' preserveAspectRatio='none' width='100%' height='100%'>",
        "<path d='M3 0 L7 0 L6 92 Q5 100 4 92 Z' fill='rgba(200,230,255,0.75)'/>",
        "</svg>"
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darken_twenty_percent() {
        // 0xE8-51, 0xB8-51, 0x9D-51
        assert_eq!(darken_color("#E8B89D", 20.0).unwrap(), "#b5856a");
    }

    #[test]
    fn test_darken_extremes() {
        assert_eq!(darken_color("#E8B89D", 0.0).unwrap(), "#e8b89d");
        assert_eq!(darken_color("#E8B89D", 100.0).unwrap(), "#000000");
    }

    #[test]
    fn test_darken_clamps_channels_at_zero() {
        // 2.55 * 10 = 25.5 -> 26
        assert_eq!(Rgb::new(0x10, 0x40, 0xff).darken(10.0), Rgb::new(0x00, 0x26, 0xe5));
    }

    #[test]
    fn test_darken_out_of_range_percent_is_clamped() {
        assert_eq!(Rgb::new(1, 2, 3).darken(250.0), Rgb::new(0, 0, 0));
        assert_eq!(Rgb::new(1, 2, 3).darken(-5.0), Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_parse_hex_variants() {
        assert_eq!(Rgb::parse_hex("4a3728").unwrap(), DEFAULT_HAIR_COLOR);
        assert_eq!(Rgb::parse_hex(" #E8B89D ").unwrap(), DEFAULT_SKIN_TONE);
        assert!(Rgb::parse_hex("#fff").is_err());
        assert!(Rgb::parse_hex("#gggggg").is_err());
        assert!(darken_color("red", 5.0).is_err());
    }

    #[test]
    fn test_appearance_overrides() {
        let look = Appearance::with_overrides(None, Some(Rgb::new(0, 0, 0)));
        assert_eq!(look.skin_tone, DEFAULT_SKIN_TONE);
        assert_eq!(look.hair_color, Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_figure_markup_uses_appearance() {
        let look = Appearance::with_overrides(Some(Rgb::new(0x8d, 0x55, 0x24)), None);
        let flying = create_flying_figure_markup(&look);
        let impact = create_impact_figure_markup(&look);
        assert!(flying.contains("#8d5524"));
        assert!(impact.contains("#8d5524"));
        assert!(flying.contains(&DEFAULT_HAIR_COLOR.to_string()));
        assert_eq!(flying, create_flying_figure_markup(&look));
    }

    #[test]
    fn test_crack_markup_is_stable() {
        assert_eq!(crack_overlay_markup(), crack_overlay_markup());
        assert_eq!(crack_overlay_markup().matches("<polyline").count(), 9);
    }
}
