//! Color themes, selectable with `--theme`.

use ratatui::style::Color;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Muted colors on the terminal's black
    #[default]
    Nord,
    /// White on blue
    DosBlue,
    /// Amber on black
    AmberCrt,
}

impl Theme {
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Nord => ColorScheme::nord(),
            Theme::DosBlue => ColorScheme::dos_blue(),
            Theme::AmberCrt => ColorScheme::amber_crt(),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "nord" => Ok(Theme::Nord),
            "dos" | "dosblue" | "dos-blue" => Ok(Theme::DosBlue),
            "amber" | "ambercrt" | "amber-crt" => Ok(Theme::AmberCrt),
            _ => Err(anyhow::anyhow!(
                "Unknown theme '{s}'. Available: nord, dos-blue, amber-crt"
            )),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Nord => write!(f, "nord"),
            Theme::DosBlue => write!(f, "dos-blue"),
            Theme::AmberCrt => write!(f, "amber-crt"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
    /// Secondary text: placeholders, hints, pagination labels
    pub text_dim: Color,
    /// Active tab, focused input, popover border
    pub accent: Color,
    pub border: Color,
    pub header: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Shortened identifiers
    pub hash: Color,
    /// Pinned check mark
    pub check: Color,
    pub toast_info: Color,
    pub toast_error: Color,
}

impl ColorScheme {
    pub fn nord() -> Self {
        Self {
            background: Color::Black,
            text: Color::White,
            text_dim: Color::Gray,
            accent: Color::Yellow,
            border: Color::Gray,
            header: Color::Cyan,
            selection_bg: Color::Yellow,
            selection_fg: Color::Black,
            hash: Color::LightBlue,
            check: Color::Green,
            toast_info: Color::Green,
            toast_error: Color::Red,
        }
    }

    pub fn dos_blue() -> Self {
        Self {
            background: Color::Blue,
            text: Color::White,
            text_dim: Color::LightBlue,
            accent: Color::Yellow,
            border: Color::Cyan,
            header: Color::LightCyan,
            selection_bg: Color::Cyan,
            selection_fg: Color::Black,
            hash: Color::LightYellow,
            check: Color::LightGreen,
            toast_info: Color::LightGreen,
            toast_error: Color::LightRed,
        }
    }

    pub fn amber_crt() -> Self {
        let amber = Color::Rgb(255, 176, 0);
        let amber_bright = Color::Rgb(255, 200, 100);
        let amber_dim = Color::Rgb(180, 120, 0);

        Self {
            background: Color::Black,
            text: amber,
            text_dim: amber_dim,
            accent: amber_bright,
            border: amber_dim,
            header: amber_bright,
            selection_bg: amber,
            selection_fg: Color::Black,
            hash: amber_bright,
            check: amber_bright,
            toast_info: Color::Rgb(100, 255, 100),
            toast_error: Color::Red,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::nord()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parsing() {
        assert_eq!("nord".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("NORD".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("dos".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("amber-crt".parse::<Theme>().unwrap(), Theme::AmberCrt);
        assert!("green".parse::<Theme>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for theme in [Theme::Nord, Theme::DosBlue, Theme::AmberCrt] {
            assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
        }
    }
}
