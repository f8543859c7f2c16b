//! Branding settings and the static catalogs the form offers.

use axum::extract::State;
use axum::Json;
use paylance_core::currency::{Currency, CURRENCIES};
use paylance_core::render::{Branding, ColorPreset, TemplateInfo, COLOR_PRESETS, TEMPLATES};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TemplateCatalog {
    pub templates: &'static [TemplateInfo],
    pub color_presets: &'static [ColorPreset],
}

/// Currencies offered by the editor.
pub async fn list_currencies() -> Json<&'static [Currency]> {
    let currencies: &'static [Currency] = &CURRENCIES;
    Json(currencies)
}

/// Templates and colour presets.
pub async fn list_templates() -> Json<TemplateCatalog> {
    Json(TemplateCatalog {
        templates: &TEMPLATES,
        color_presets: &COLOR_PRESETS,
    })
}

/// Current branding (defaults when never saved).
pub async fn get_branding(State(state): State<AppState>) -> Result<Json<Branding>, ApiError> {
    Ok(Json(state.db.inner().settings().load_branding().await?))
}

/// Replaces the branding settings.
pub async fn update_branding(
    State(state): State<AppState>,
    Json(branding): Json<Branding>,
) -> Result<Json<Branding>, ApiError> {
    branding.validate()?;
    state.db.inner().settings().save_branding(&branding).await?;
    info!(template = %branding.template, "Branding updated");
    Ok(Json(branding))
}
