/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

pub fn rgba_css_tuple((r, g, b): (u8, u8, u8), a: f64) -> String {
    rgba_css(r, g, b, a)
}

pub const OCEAN: &str = "#0c0e17";
pub const LAND: (u8, u8, u8) = (38, 43, 60);
pub const LAND_HOVERED: (u8, u8, u8) = (70, 62, 36);
pub const BORDER: &str = "rgba(120, 116, 112, 0.55)";
pub const BORDER_HOVERED: &str = "rgba(245, 197, 66, 0.9)";
pub const LABEL_HALO: &str = "rgba(8, 10, 18, 0.85)";
