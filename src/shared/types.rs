use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Read-only view of the calculator handed to the rendering shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings.ts")]
pub struct CalculatorSnapshot {
    /// Buffer with thousands grouping applied, ready to render.
    pub display: String,
    /// Buffer exactly as typed.
    pub raw: String,
    pub operator: Option<String>,
    pub first_operand: Option<f64>,
    pub clear_on_next_digit: bool,
    pub is_error: bool,
}

/// Which of the two converter inputs last had focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings.ts")]
pub enum ActiveInput {
    #[default]
    From,
    To,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings.ts")]
pub struct UnitConverterSnapshot {
    pub active_input: ActiveInput,
    pub from_value: String,
    pub to_value: String,
    pub from_unit: Option<String>,
    pub to_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings.ts")]
pub struct CurrencyConverterSnapshot {
    pub from_value: String,
    pub to_value: String,
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    /// A rate request is outstanding; the shell should hold off on showing `to_value`.
    pub pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings.ts")]
pub struct GetUnitsResponse {
    pub units: Vec<UnitDTO>,
}

// Rich Unit Data Transfer Object for the shell
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings.ts")]
pub struct UnitDTO {
    pub id: String,       // Unit spelling used for lookups (e.g., "m2", "°C")
    pub label: String,    // Display form (e.g., "m²")
    pub category: String, // Category (e.g., "length", "area")
}
