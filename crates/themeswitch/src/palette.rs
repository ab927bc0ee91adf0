//! Named color palettes.
//!
//! A [`Palette`] maps every [`Role`] to a [`Color`]. Both built-in palettes
//! are values of the same struct, so they always carry the same roles.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::appearance::ColorScheme;

/// A color value as consumed by the render layer.
///
/// The value is opaque to this crate: a hex string such as `#FFFFFF` or a
/// functional notation such as `rgba(0, 0, 0, 0.4)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(&'static str);

impl Color {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// A semantic color role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Background,
    Surface,
    Card,
    Text,
    TextSecondary,
    TextTertiary,
    Border,
    Divider,
    Primary,
    Success,
    Warning,
    Error,
    Shadow,
    NavigationBackground,
    NavigationText,
    ModalOverlay,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 16] = [
        Role::Background,
        Role::Surface,
        Role::Card,
        Role::Text,
        Role::TextSecondary,
        Role::TextTertiary,
        Role::Border,
        Role::Divider,
        Role::Primary,
        Role::Success,
        Role::Warning,
        Role::Error,
        Role::Shadow,
        Role::NavigationBackground,
        Role::NavigationText,
        Role::ModalOverlay,
    ];

    /// The role's camelCase name, as used in serialized palettes.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Background => "background",
            Role::Surface => "surface",
            Role::Card => "card",
            Role::Text => "text",
            Role::TextSecondary => "textSecondary",
            Role::TextTertiary => "textTertiary",
            Role::Border => "border",
            Role::Divider => "divider",
            Role::Primary => "primary",
            Role::Success => "success",
            Role::Warning => "warning",
            Role::Error => "error",
            Role::Shadow => "shadow",
            Role::NavigationBackground => "navigationBackground",
            Role::NavigationText => "navigationText",
            Role::ModalOverlay => "modalOverlay",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A complete set of colors, one per [`Role`].
///
/// Palettes are static data. Consumers receive `&'static Palette` and
/// compare palettes by identity when they need to know which one is active.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub card: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub text_tertiary: Color,
    pub border: Color,
    pub divider: Color,
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub shadow: Color,
    pub navigation_background: Color,
    pub navigation_text: Color,
    pub modal_overlay: Color,
}

impl Palette {
    /// The built-in palette for `scheme`.
    pub fn for_scheme(scheme: ColorScheme) -> &'static Palette {
        match scheme {
            ColorScheme::Light => &LIGHT_PALETTE,
            ColorScheme::Dark => &DARK_PALETTE,
        }
    }

    /// The color assigned to `role`.
    pub fn get(&self, role: Role) -> Color {
        match role {
            Role::Background => self.background,
            Role::Surface => self.surface,
            Role::Card => self.card,
            Role::Text => self.text,
            Role::TextSecondary => self.text_secondary,
            Role::TextTertiary => self.text_tertiary,
            Role::Border => self.border,
            Role::Divider => self.divider,
            Role::Primary => self.primary,
            Role::Success => self.success,
            Role::Warning => self.warning,
            Role::Error => self.error,
            Role::Shadow => self.shadow,
            Role::NavigationBackground => self.navigation_background,
            Role::NavigationText => self.navigation_text,
            Role::ModalOverlay => self.modal_overlay,
        }
    }

    /// Iterates `(role, color)` pairs in [`Role::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, Color)> + '_ {
        Role::ALL.into_iter().map(move |role| (role, self.get(role)))
    }
}

pub static LIGHT_PALETTE: Palette = Palette {
    background: Color::new("#FFFFFF"),
    surface: Color::new("#F2F2F7"),
    card: Color::new("#FFFFFF"),
    text: Color::new("#000000"),
    text_secondary: Color::new("#3C3C43"),
    text_tertiary: Color::new("#8E8E93"),
    border: Color::new("#C6C6C8"),
    divider: Color::new("#E5E5EA"),
    primary: Color::new("#007AFF"),
    success: Color::new("#34C759"),
    warning: Color::new("#FF9500"),
    error: Color::new("#FF3B30"),
    shadow: Color::new("#000000"),
    navigation_background: Color::new("#F9F9F9"),
    navigation_text: Color::new("#000000"),
    modal_overlay: Color::new("rgba(0, 0, 0, 0.4)"),
};

pub static DARK_PALETTE: Palette = Palette {
    background: Color::new("#000000"),
    surface: Color::new("#1C1C1E"),
    card: Color::new("#2C2C2E"),
    text: Color::new("#FFFFFF"),
    text_secondary: Color::new("#EBEBF5"),
    text_tertiary: Color::new("#8E8E93"),
    border: Color::new("#38383A"),
    divider: Color::new("#2C2C2E"),
    primary: Color::new("#0A84FF"),
    success: Color::new("#30D158"),
    warning: Color::new("#FF9F0A"),
    error: Color::new("#FF453A"),
    shadow: Color::new("#000000"),
    navigation_background: Color::new("#1C1C1E"),
    navigation_text: Color::new("#FFFFFF"),
    modal_overlay: Color::new("rgba(0, 0, 0, 0.6)"),
};
