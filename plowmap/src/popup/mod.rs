//! Contenu typé des popups
//!
//! Les propriétés des features ne sont jamais interpolées dans du balisage:
//! on construit un `PopupContent`, puis un renderer (HTML échappé ou texte)
//! produit la sortie.

mod describe;
mod render;

pub use describe::{describe_route, describe_vehicle, NOT_LOGGED, NOT_SERVICED, VIN_UNAVAILABLE};
pub use render::{render_html, render_text};

use serde::Serialize;

use crate::types::LngLat;

/// Décalage par défaut du popup par rapport à son ancre (px)
pub const DEFAULT_OFFSET_PX: f64 = 16.0;

/// Popup prêt à afficher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    /// Position géographique de l'ancre
    pub anchor: LngLat,

    /// Décalage en pixels
    pub offset_px: f64,

    pub content: PopupContent,
}

/// Description structurée: titre, sous-titre, sections
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PopupContent {
    pub heading: Heading,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Heading {
    /// Niveau de titre (1 pour un véhicule, 2 pour un tronçon)
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Item {
    pub text: String,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub strong: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Item>,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: true,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Item) -> Self {
        self.children.push(child);
        self
    }
}

impl Section {
    pub fn titled(title: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            title: Some(title.into()),
            items,
        }
    }

    pub fn untitled(items: Vec<Item>) -> Self {
        Self { title: None, items }
    }
}

impl PopupContent {
    /// Tous les textes du popup, dans l'ordre d'affichage
    pub fn texts(&self) -> Vec<&str> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a str>) {
            for item in items {
                out.push(&item.text);
                walk(&item.children, out);
            }
        }

        let mut out = vec![self.heading.text.as_str()];
        if let Some(subtitle) = &self.subtitle {
            out.push(subtitle);
        }
        for section in &self.sections {
            if let Some(title) = &section.title {
                out.push(title);
            }
            walk(&section.items, &mut out);
        }
        out
    }

    /// Vrai si un texte du popup contient `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}
