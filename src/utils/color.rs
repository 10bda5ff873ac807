use eframe::egui::Color32;

pub trait ColorExt {
    /// Parses `#rrggbb` or `#rgb`.
    fn from_accent(hex: &str) -> Option<Self>
    where
        Self: Sized;

    fn accent_or(hex: &str, fallback: Self) -> Self
    where
        Self: Sized,
    {
        Self::from_accent(hex).unwrap_or(fallback)
    }
}

impl ColorExt for Color32 {
    fn from_accent(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();

        match hex.len() {
            6 => Some(Color32::from_rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }
}
