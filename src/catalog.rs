//! Excursion Catalog
//!
//! Static tourism categories offered through the menu. Read-only after
//! startup; the default set can be replaced wholesale from configuration.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// One entry in the excursion catalog.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// URL slug used to build the web deeplink.
    pub id: String,
    /// Display name shown in menus.
    pub label: String,
    pub description: String,
}

impl Category {
    fn new(id: &str, label: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

/// The catalog shipped with the bot.
pub static DEFAULT_CATALOG: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category::new("rutas-del-vino", "🍷 Rutas del Vino", "Degustaciones premium."),
        Category::new("potrerillos", "🏔️ Potrerillos", "Dique y montaña."),
        Category::new("experiencias-autor", "🌟 Experiencias", "Actividades exclusivas."),
        Category::new("programas", "📋 Programas", "Paquetes completos."),
    ]
});
