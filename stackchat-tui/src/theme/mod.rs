mod loader;
mod palettes;

pub use loader::{ThemeLoader, ThemePreferences};
pub use palettes::{hex_to_color, Palette, DRACULA, NORD, PAPER, VIOLET};

use ratatui::style::{Color, Modifier, Style};

pub trait Theme: Send + Sync {
    fn name(&self) -> &'static str;

    fn background(&self) -> Color;
    fn foreground(&self) -> Color;
    fn foreground_dim(&self) -> Color;

    fn surface(&self) -> Color;
    fn border(&self) -> Color;
    fn selection(&self) -> Color;

    fn accent(&self) -> Color;
    fn accent_secondary(&self) -> Color;

    fn success(&self) -> Color;
    fn warning(&self) -> Color;
    fn error(&self) -> Color;
    fn info(&self) -> Color;

    fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent())
            .add_modifier(Modifier::BOLD)
    }

    fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent())
        } else {
            Style::default().fg(self.border())
        }
    }

    fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.selection())
            .fg(self.foreground())
            .add_modifier(Modifier::BOLD)
    }
}

pub struct ThemeManager {
    themes: Vec<Box<dyn Theme>>,
    current_index: usize,
}

impl ThemeManager {
    pub fn new() -> Self {
        let themes: Vec<Box<dyn Theme>> = vec![
            Box::new(VIOLET),
            Box::new(DRACULA),
            Box::new(NORD),
            Box::new(PAPER),
        ];

        Self {
            themes,
            current_index: 0,
        }
    }

    pub fn current_theme(&self) -> &dyn Theme {
        self.themes[self.current_index].as_ref()
    }

    pub fn cycle_theme(&mut self) {
        self.current_index = (self.current_index + 1) % self.themes.len();
    }

    /// Case-insensitive lookup.
    pub fn set_theme_by_name(&mut self, name: &str) -> bool {
        match self
            .themes
            .iter()
            .position(|t| t.name().eq_ignore_ascii_case(name.trim()))
        {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => false,
        }
    }

    pub fn theme_names(&self) -> Vec<&'static str> {
        self.themes.iter().map(|t| t.name()).collect()
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}
