//! Light and dark palettes and the manager that switches between them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Available palettes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Light,
    Dark,
}

impl Palette {
    pub fn toggled(self) -> Self {
        match self {
            Palette::Light => Palette::Dark,
            Palette::Dark => Palette::Light,
        }
    }
}

/// Named colors every screen draws from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Colors {
    pub background: String,
    pub surface: String,
    pub card: String,
    pub text: String,
    pub text_secondary: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub success: String,
    pub warning: String,
    pub error: String,
    pub border: String,
    pub tab_bar: String,
    pub tab_inactive: String,
}

impl Colors {
    pub const TOKEN_NAMES: [&'static str; 14] = [
        "background",
        "surface",
        "card",
        "text",
        "text_secondary",
        "primary",
        "secondary",
        "accent",
        "success",
        "warning",
        "error",
        "border",
        "tab_bar",
        "tab_inactive",
    ];

    /// Look a color up by token name.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "background" => &self.background,
            "surface" => &self.surface,
            "card" => &self.card,
            "text" => &self.text,
            "text_secondary" => &self.text_secondary,
            "primary" => &self.primary,
            "secondary" => &self.secondary,
            "accent" => &self.accent,
            "success" => &self.success,
            "warning" => &self.warning,
            "error" => &self.error,
            "border" => &self.border,
            "tab_bar" => &self.tab_bar,
            "tab_inactive" => &self.tab_inactive,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// The three gradients, each an ordered list of at least two stops.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gradients {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub accent: Vec<String>,
}

impl Gradients {
    pub const TOKEN_NAMES: [&'static str; 3] = ["primary", "secondary", "accent"];

    pub fn get(&self, name: &str) -> Option<&[String]> {
        match name {
            "primary" => Some(&self.primary),
            "secondary" => Some(&self.secondary),
            "accent" => Some(&self.accent),
            _ => None,
        }
    }
}

/// A complete palette: colors plus gradients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Theme {
    pub palette: Palette,
    pub colors: Colors,
    pub gradients: Gradients,
}

impl Theme {
    pub fn for_palette(palette: Palette) -> &'static Theme {
        match palette {
            Palette::Light => &LIGHT,
            Palette::Dark => &DARK,
        }
    }

    /// All token names, colors first, gradients prefixed with `gradient.`.
    pub fn token_names(&self) -> Vec<String> {
        Colors::TOKEN_NAMES
            .iter()
            .map(|name| (*name).to_string())
            .chain(
                Gradients::TOKEN_NAMES
                    .iter()
                    .map(|name| format!("gradient.{name}")),
            )
            .collect()
    }
}

fn stops(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

static LIGHT: Lazy<Theme> = Lazy::new(|| Theme {
    palette: Palette::Light,
    colors: Colors {
        background: "#F8F9FE".to_string(),
        surface: "#FFFFFF".to_string(),
        card: "#FFFFFF".to_string(),
        text: "#1A1A2E".to_string(),
        text_secondary: "#6B7280".to_string(),
        primary: "#6366F1".to_string(),
        secondary: "#8B5CF6".to_string(),
        accent: "#F59E0B".to_string(),
        success: "#10B981".to_string(),
        warning: "#F59E0B".to_string(),
        error: "#EF4444".to_string(),
        border: "#E5E7EB".to_string(),
        tab_bar: "#FFFFFF".to_string(),
        tab_inactive: "#9CA3AF".to_string(),
    },
    gradients: Gradients {
        primary: stops(&["#6366F1", "#8B5CF6"]),
        secondary: stops(&["#EC4899", "#F43F5E"]),
        accent: stops(&["#F59E0B", "#F97316"]),
    },
});

static DARK: Lazy<Theme> = Lazy::new(|| Theme {
    palette: Palette::Dark,
    colors: Colors {
        background: "#0F0F1A".to_string(),
        surface: "#1A1A2E".to_string(),
        card: "#252540".to_string(),
        text: "#F9FAFB".to_string(),
        text_secondary: "#9CA3AF".to_string(),
        primary: "#818CF8".to_string(),
        secondary: "#A78BFA".to_string(),
        accent: "#FBBF24".to_string(),
        success: "#34D399".to_string(),
        warning: "#FBBF24".to_string(),
        error: "#F87171".to_string(),
        border: "#374151".to_string(),
        tab_bar: "#1A1A2E".to_string(),
        tab_inactive: "#6B7280".to_string(),
    },
    gradients: Gradients {
        primary: stops(&["#4F46E5", "#7C3AED"]),
        secondary: stops(&["#DB2777", "#E11D48"]),
        accent: stops(&["#D97706", "#EA580C"]),
    },
});

/// Holds the active palette for one application context.
///
/// Always starts on [`Palette::Light`]; the choice is not persisted.
#[derive(Debug, Default)]
pub struct ThemeManager {
    dark: AtomicBool,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn palette(&self) -> Palette {
        if self.dark.load(Ordering::SeqCst) {
            Palette::Dark
        } else {
            Palette::Light
        }
    }

    pub fn is_dark(&self) -> bool {
        self.palette() == Palette::Dark
    }

    /// Snapshot of the active theme.
    pub fn current(&self) -> &'static Theme {
        Theme::for_palette(self.palette())
    }

    /// Flip between light and dark, returning the new palette.
    pub fn toggle(&self) -> Palette {
        let was_dark = self.dark.fetch_xor(true, Ordering::SeqCst);
        let palette = if was_dark { Palette::Light } else { Palette::Dark };
        log::debug!("Theme switched to {palette:?}");
        palette
    }

    pub fn set_palette(&self, palette: Palette) {
        self.dark.store(palette == Palette::Dark, Ordering::SeqCst);
    }
}
