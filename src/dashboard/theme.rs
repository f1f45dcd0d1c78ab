//! Theme tokens for dashboard rendering: light/dark mode, accent colour and
//! the `NO_COLOR` hook.

#![allow(missing_docs)]

use std::env;
use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

/// Light or dark surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Accent colour used for highlights, the active preset and chart bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryColor {
    #[default]
    Indigo,
    Teal,
    Green,
    Amber,
    Rose,
    Sky,
}

impl PrimaryColor {
    pub const ALL: [Self; 6] = [
        Self::Indigo,
        Self::Teal,
        Self::Green,
        Self::Amber,
        Self::Rose,
        Self::Sky,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Indigo => "indigo",
            Self::Teal => "teal",
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Rose => "rose",
            Self::Sky => "sky",
        }
    }

    /// Terminal colour for the accent; dark surfaces get the lighter tint.
    #[must_use]
    pub const fn color(self, mode: ThemeMode) -> Color {
        match (self, mode) {
            (Self::Indigo, ThemeMode::Light) => Color::Rgb { r: 0x66, g: 0x6c, b: 0xff },
            (Self::Indigo, ThemeMode::Dark) => Color::Rgb { r: 0x8c, g: 0x91, b: 0xff },
            (Self::Teal, ThemeMode::Light) => Color::Rgb { r: 0x0d, g: 0x94, b: 0x88 },
            (Self::Teal, ThemeMode::Dark) => Color::Rgb { r: 0x2d, g: 0xd4, b: 0xbf },
            (Self::Green, ThemeMode::Light) => Color::Rgb { r: 0x28, g: 0xc7, b: 0x6f },
            (Self::Green, ThemeMode::Dark) => Color::Rgb { r: 0x4a, g: 0xde, b: 0x80 },
            (Self::Amber, ThemeMode::Light) => Color::Rgb { r: 0xd9, g: 0x77, b: 0x06 },
            (Self::Amber, ThemeMode::Dark) => Color::Rgb { r: 0xfb, g: 0xbf, b: 0x24 },
            (Self::Rose, ThemeMode::Light) => Color::Rgb { r: 0xe1, g: 0x1d, b: 0x48 },
            (Self::Rose, ThemeMode::Dark) => Color::Rgb { r: 0xfb, g: 0x71, b: 0x85 },
            (Self::Sky, ThemeMode::Light) => Color::Rgb { r: 0x02, g: 0x84, b: 0xc7 },
            (Self::Sky, ThemeMode::Dark) => Color::Rgb { r: 0x38, g: 0xbd, b: 0xf8 },
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl fmt::Display for PrimaryColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme mode {other:?} (expected light|dark)")),
        }
    }
}

impl FromStr for PrimaryColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
                format!("unknown primary color {s:?} (expected {})", names.join("|"))
            })
    }
}

/// Color output mode for compatibility with `NO_COLOR` and `--no-color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Enabled,
    Disabled,
}

impl ColorMode {
    #[must_use]
    pub const fn from_no_color_flag(no_color: bool) -> Self {
        if no_color {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    /// `NO_COLOR` set to anything disables colour, as does the CLI flag.
    #[must_use]
    pub fn from_environment(cli_no_color: bool) -> Self {
        Self::from_no_color_flag(cli_no_color || env::var_os("NO_COLOR").is_some())
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Semantic token category independent of concrete colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticToken {
    Accent,
    Positive,
    Negative,
    Muted,
    Text,
    Heading,
}

/// Concrete colours for each semantic token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub mode: ThemeMode,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub muted: Color,
    pub text: Color,
    pub heading: Color,
    pub background: Color,
}

impl ThemePalette {
    #[must_use]
    pub const fn new(mode: ThemeMode, primary: PrimaryColor) -> Self {
        match mode {
            ThemeMode::Light => Self {
                mode,
                accent: primary.color(mode),
                positive: Color::DarkGreen,
                negative: Color::DarkRed,
                muted: Color::DarkGrey,
                text: Color::Black,
                heading: Color::Black,
                background: Color::White,
            },
            ThemeMode::Dark => Self {
                mode,
                accent: primary.color(mode),
                positive: Color::Green,
                negative: Color::Red,
                muted: Color::Grey,
                text: Color::White,
                heading: Color::White,
                background: Color::Rgb { r: 0x1e, g: 0x1e, b: 0x2d },
            },
        }
    }

    /// Semi-dark keeps the light body but darkens headings to the accent.
    #[must_use]
    pub const fn with_semi_dark(mut self, semi_dark: bool) -> Self {
        if semi_dark && matches!(self.mode, ThemeMode::Light) {
            self.heading = self.accent;
        }
        self
    }

    #[must_use]
    pub const fn color(&self, token: SemanticToken) -> Color {
        match token {
            SemanticToken::Accent => self.accent,
            SemanticToken::Positive => self.positive,
            SemanticToken::Negative => self.negative,
            SemanticToken::Muted => self.muted,
            SemanticToken::Text => self.text,
            SemanticToken::Heading => self.heading,
        }
    }
}

/// Full render theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub palette: ThemePalette,
    pub color: ColorMode,
    pub bordered: bool,
    /// Column budget for cards and charts.
    pub width: u16,
}

impl Theme {
    #[must_use]
    pub const fn new(palette: ThemePalette, color: ColorMode, bordered: bool, width: u16) -> Self {
        Self {
            palette,
            color,
            bordered,
            width,
        }
    }
}
