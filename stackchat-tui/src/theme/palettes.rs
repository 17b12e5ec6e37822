use ratatui::style::Color;

use super::Theme;

pub const fn hex_to_color(hex: u32) -> Color {
    let r = ((hex >> 16) & 0xFF) as u8;
    let g = ((hex >> 8) & 0xFF) as u8;
    let b = (hex & 0xFF) as u8;
    Color::Rgb(r, g, b)
}

/// A named set of colors. Every built-in theme is one of these constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub background: Color,
    pub foreground: Color,
    pub foreground_dim: Color,
    pub surface: Color,
    pub border: Color,
    pub selection: Color,
    pub accent: Color,
    pub accent_secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

pub const VIOLET: Palette = Palette {
    name: "violet",
    background: hex_to_color(0x17121f),
    foreground: hex_to_color(0xece6f5),
    foreground_dim: hex_to_color(0x8a7fa0),
    surface: hex_to_color(0x231b30),
    border: hex_to_color(0x4a3a63),
    selection: hex_to_color(0x3b2a57),
    accent: hex_to_color(0x9b5de5),
    accent_secondary: hex_to_color(0xc77dff),
    success: hex_to_color(0x6fcf97),
    warning: hex_to_color(0xf2c94c),
    error: hex_to_color(0xeb5757),
    info: hex_to_color(0x56ccf2),
};

pub const DRACULA: Palette = Palette {
    name: "dracula",
    background: hex_to_color(0x282a36),
    foreground: hex_to_color(0xf8f8f2),
    foreground_dim: hex_to_color(0x6272a4),
    surface: hex_to_color(0x343746),
    border: hex_to_color(0x44475a),
    selection: hex_to_color(0x44475a),
    accent: hex_to_color(0xbd93f9),
    accent_secondary: hex_to_color(0xff79c6),
    success: hex_to_color(0x50fa7b),
    warning: hex_to_color(0xf1fa8c),
    error: hex_to_color(0xff5555),
    info: hex_to_color(0x8be9fd),
};

pub const NORD: Palette = Palette {
    name: "nord",
    background: hex_to_color(0x2e3440),
    foreground: hex_to_color(0xeceff4),
    foreground_dim: hex_to_color(0x7b88a1),
    surface: hex_to_color(0x3b4252),
    border: hex_to_color(0x4c566a),
    selection: hex_to_color(0x434c5e),
    accent: hex_to_color(0x88c0d0),
    accent_secondary: hex_to_color(0x81a1c1),
    success: hex_to_color(0xa3be8c),
    warning: hex_to_color(0xebcb8b),
    error: hex_to_color(0xbf616a),
    info: hex_to_color(0x5e81ac),
};

pub const PAPER: Palette = Palette {
    name: "paper",
    background: hex_to_color(0xfaf8f5),
    foreground: hex_to_color(0x2d2a32),
    foreground_dim: hex_to_color(0x8c8594),
    surface: hex_to_color(0xefebf4),
    border: hex_to_color(0xc9c1d6),
    selection: hex_to_color(0xe0d4f5),
    accent: hex_to_color(0x7b3fe4),
    accent_secondary: hex_to_color(0xa05ce8),
    success: hex_to_color(0x2e8b57),
    warning: hex_to_color(0xb7791f),
    error: hex_to_color(0xc53030),
    info: hex_to_color(0x2b6cb0),
};

impl Theme for Palette {
    fn name(&self) -> &'static str {
        self.name
    }

    fn background(&self) -> Color {
        self.background
    }

    fn foreground(&self) -> Color {
        self.foreground
    }

    fn foreground_dim(&self) -> Color {
        self.foreground_dim
    }

    fn surface(&self) -> Color {
        self.surface
    }

    fn border(&self) -> Color {
        self.border
    }

    fn selection(&self) -> Color {
        self.selection
    }

    fn accent(&self) -> Color {
        self.accent
    }

    fn accent_secondary(&self) -> Color {
        self.accent_secondary
    }

    fn success(&self) -> Color {
        self.success
    }

    fn warning(&self) -> Color {
        self.warning
    }

    fn error(&self) -> Color {
        self.error
    }

    fn info(&self) -> Color {
        self.info
    }
}
