//! The field mapping installed for the "Test de positionnement" form and the
//! read-modify-write of the `gf_siren_settings` option that carries it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::executor::RemoteCommandResult;

pub const TARGET_FORM_ID: &str = "1";
pub const FORM_MAPPINGS_KEY: &str = "form_mappings";

/// Whole `gf_siren_settings` object. Only `form_mappings` is ours; every
/// other key is carried through untouched.
pub type PluginSettings = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFieldMapping {
    pub form_id: u32,
    pub form_name: String,
    pub enable_plugin: bool,
    pub enable_button: bool,
    pub button_position: String,
    pub siret: String,
    pub denomination: String,
    pub adresse: String,
    pub ville: String,
    pub code_postal: String,
    pub pays: String,
    pub mentions_legales: String,
    pub prenom: String,
    pub nom: String,
    pub forme_juridique: String,
    pub code_ape: String,
    pub libelle_ape: String,
    pub date_creation: String,
    pub statut_actif: String,
    pub type_entreprise: String,
}

impl FormFieldMapping {
    /// Gravity Forms form 1. Composite fields use `<field>.<input>` ids:
    /// 8 is the address block, 7 the representative's name.
    pub fn form_one() -> Self {
        Self {
            form_id: 1,
            form_name: "Test de positionnement Révélation Digitale".to_string(),
            enable_plugin: true,
            enable_button: true,
            button_position: "after".to_string(),
            siret: "1".to_string(),
            denomination: "12".to_string(),
            adresse: "8.1".to_string(),
            ville: "8.3".to_string(),
            code_postal: "8.5".to_string(),
            pays: "8.6".to_string(),
            mentions_legales: "13".to_string(),
            prenom: "7.3".to_string(),
            nom: "7.6".to_string(),
            forme_juridique: String::new(),
            code_ape: String::new(),
            libelle_ape: String::new(),
            date_creation: String::new(),
            statut_actif: String::new(),
            type_entreprise: String::new(),
        }
    }

    pub fn recap_lines(&self) -> Vec<String> {
        vec![
            format!("Form ID: {}", self.form_id),
            format!("SIRET: field {}", self.siret),
            format!("Company name: field {}", self.denomination),
            format!("Address: field {}", self.adresse),
            format!("City: field {}", self.ville),
            format!("Postal code: field {}", self.code_postal),
            format!("Country: field {}", self.pays),
            format!("Legal notice: field {}", self.mentions_legales),
            format!("Representative first name: field {}", self.prenom),
            format!("Representative last name: field {}", self.nom),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsRead {
    Loaded(PluginSettings),
    /// Read failed or returned nothing; the option does not exist yet.
    Absent,
    /// Read succeeded but the payload is not a settings object.
    Unreadable(String),
}

impl SettingsRead {
    pub fn into_settings(self) -> PluginSettings {
        match self {
            Self::Loaded(settings) => settings,
            Self::Absent | Self::Unreadable(_) => PluginSettings::new(),
        }
    }
}

pub fn read_settings(result: &RemoteCommandResult) -> SettingsRead {
    let text = result.output.trim();
    if !result.success || text.is_empty() {
        return SettingsRead::Absent;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(settings)) => SettingsRead::Loaded(settings),
        // WordPress encodes an empty PHP array as `[]`.
        Ok(Value::Array(items)) if items.is_empty() => SettingsRead::Loaded(PluginSettings::new()),
        Ok(other) => SettingsRead::Unreadable(format!("expected a JSON object, got {}", kind_of(&other))),
        Err(error) => SettingsRead::Unreadable(error.to_string()),
    }
}

/// Inserts or replaces one form entry under `form_mappings`.
pub fn merge_form_mapping(
    mut settings: PluginSettings,
    form_id: &str,
    mapping: &FormFieldMapping,
) -> Result<PluginSettings, serde_json::Error> {
    let entry = serde_json::to_value(mapping)?;

    let slot = settings
        .entry(FORM_MAPPINGS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    let mut mappings = match slot.take() {
        Value::Object(existing) => existing,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        other => {
            tracing::warn!(kind = kind_of(&other), "replacing non-object form_mappings");
            Map::new()
        }
    };
    mappings.insert(form_id.to_string(), entry);
    *slot = Value::Object(mappings);

    Ok(settings)
}

/// Looks up the stored entry for `form_id`, if it decodes as a mapping.
pub fn stored_mapping(settings: &PluginSettings, form_id: &str) -> Option<FormFieldMapping> {
    let entry = settings.get(FORM_MAPPINGS_KEY)?.get(form_id)?;
    serde_json::from_value(entry.clone()).ok()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
