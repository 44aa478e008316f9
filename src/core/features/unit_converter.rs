use super::formatter;
use super::{FeatureSnapshot, FeatureSync, Intent, Mode};
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{ActiveInput, GetUnitsResponse, UnitConverterSnapshot, UnitDTO};
use crate::shared::ERROR_DISPLAY;
use once_cell::sync::Lazy;
use std::collections::HashMap;

// ============================================================================
// Unit Registry
// ============================================================================

/// Unit categories. Every linear category is normalised to its own base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitCategory {
    Length,
    Volume,
    Weight,
    Area,
    Temperature,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 5] = [
        UnitCategory::Length,
        UnitCategory::Volume,
        UnitCategory::Weight,
        UnitCategory::Area,
        UnitCategory::Temperature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitCategory::Length => "length",
            UnitCategory::Volume => "volume",
            UnitCategory::Weight => "weight",
            UnitCategory::Area => "area",
            UnitCategory::Temperature => "temperature",
        }
    }

    pub fn base_unit(self) -> &'static str {
        match self {
            UnitCategory::Length => "cm",
            UnitCategory::Volume => "ml",
            UnitCategory::Weight => "g",
            UnitCategory::Area => "cm2",
            UnitCategory::Temperature => "°C",
        }
    }
}

/// Unit definition with its factor to the category base unit
#[derive(Debug, Clone)]
pub struct UnitDefinition {
    pub category: UnitCategory,
    /// Multiplier to the base unit. Unused for temperature, which is affine.
    pub base_factor: f64,
}

// Length (base: centimeters)
const LENGTH_UNITS: &[(&str, f64)] = &[
    ("mm", 0.1), ("cm", 1.0), ("m", 100.0), ("km", 100000.0),
    ("in", 2.54), ("ft", 30.48), ("yd", 91.44), ("mi", 160934.4),
];

// Volume (base: milliliters)
const VOLUME_UNITS: &[(&str, f64)] = &[
    ("ml", 1.0), ("l", 1000.0), ("cm³", 1.0), ("m³", 1e6),
    ("tsp", 4.929), ("tbsp", 14.787), ("cup", 240.0), ("pt", 473.176),
    ("fl-oz", 29.5735), ("gal", 3785.41), ("qt", 946.353), ("cl", 10.0),
];

// Weight (base: grams)
const WEIGHT_UNITS: &[(&str, f64)] = &[
    ("mg", 0.001), ("g", 1.0), ("kg", 1000.0), ("t", 1e6),
    ("oz", 28.3495), ("lb", 453.592),
];

// Area (base: square centimeters)
const AREA_UNITS: &[(&str, f64)] = &[
    ("mm2", 0.01), ("cm2", 1.0), ("m2", 10000.0), ("km2", 1e10),
    ("a", 1e6), ("ha", 1e8), ("in2", 6.4516), ("ft2", 929.0304),
    ("yd2", 8361.27), ("Acre", 40468564.224),
];

const TEMPERATURE_UNITS: &[&str] = &["°C", "°F", "K"];

fn table(category: UnitCategory) -> &'static [(&'static str, f64)] {
    match category {
        UnitCategory::Length => LENGTH_UNITS,
        UnitCategory::Volume => VOLUME_UNITS,
        UnitCategory::Weight => WEIGHT_UNITS,
        UnitCategory::Area => AREA_UNITS,
        UnitCategory::Temperature => &[],
    }
}

/// Registry keyed by spelling. Each entry remembers its category so a lookup
/// can never silently mix factors from two categories.
static UNIT_REGISTRY: Lazy<HashMap<&'static str, UnitDefinition>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    for category in UnitCategory::ALL {
        for &(symbol, base_factor) in table(category) {
            registry.insert(symbol, UnitDefinition { category, base_factor });
        }
    }
    for &symbol in TEMPERATURE_UNITS {
        registry.insert(symbol, UnitDefinition { category: UnitCategory::Temperature, base_factor: 1.0 });
    }
    registry
});

pub fn lookup(unit: &str) -> Option<&'static UnitDefinition> {
    UNIT_REGISTRY.get(unit)
}

pub fn category_of(unit: &str) -> Option<UnitCategory> {
    lookup(unit).map(|def| def.category)
}

/// Units of a category in display order.
pub fn units_in(category: UnitCategory) -> Vec<&'static str> {
    match category {
        UnitCategory::Temperature => TEMPERATURE_UNITS.to_vec(),
        other => table(other).iter().map(|(symbol, _)| *symbol).collect(),
    }
}

pub fn is_temperature_unit(unit: &str) -> bool {
    category_of(unit) == Some(UnitCategory::Temperature)
}

/// Render exponents the way the shell labels buttons: `m2` -> `m²`.
pub fn display_unit(unit: &str) -> String {
    if let Some(stem) = unit.strip_suffix('2') {
        format!("{}²", stem)
    } else if let Some(stem) = unit.strip_suffix('3') {
        format!("{}³", stem)
    } else {
        unit.to_string()
    }
}

pub fn all_units() -> GetUnitsResponse {
    let units = UnitCategory::ALL
        .into_iter()
        .flat_map(|category| {
            units_in(category).into_iter().map(move |symbol| UnitDTO {
                id: symbol.to_string(),
                label: display_unit(symbol),
                category: category.as_str().to_string(),
            })
        })
        .collect();
    GetUnitsResponse { units }
}

// ============================================================================
// Conversion
// ============================================================================

/// `value * factor[from] / factor[to]` within a single linear category.
pub fn convert_linear(value: f64, from_unit: &str, to_unit: &str) -> AppResult<f64> {
    let from_def = lookup(from_unit)
        .ok_or_else(|| AppError::Validation(format!("Unknown source unit: {}", from_unit)))?;
    let to_def = lookup(to_unit)
        .ok_or_else(|| AppError::Validation(format!("Unknown target unit: {}", to_unit)))?;

    if from_def.category != to_def.category {
        return Err(AppError::Calculation(format!(
            "Cannot convert between {} and {} (incompatible categories)",
            from_def.category.as_str(),
            to_def.category.as_str()
        )));
    }
    if from_def.category == UnitCategory::Temperature {
        return Err(AppError::Calculation("Temperature is not a linear category".to_string()));
    }

    let base_value = value * from_def.base_factor;
    Ok(base_value / to_def.base_factor)
}

/// Convert through Celsius. Unknown units yield NaN.
pub fn convert_temperature(value: f64, from_unit: &str, to_unit: &str) -> f64 {
    if from_unit == to_unit {
        return value;
    }
    let celsius = match from_unit {
        "°C" => value,
        "°F" => (value - 32.0) * 5.0 / 9.0,
        "K" => value - 273.15,
        _ => return f64::NAN,
    };
    match to_unit {
        "°C" => celsius,
        "°F" => celsius * 9.0 / 5.0 + 32.0,
        "K" => celsius + 273.15,
        _ => f64::NAN,
    }
}

/// Temperature formulas when both units are temperatures, the factor table otherwise.
pub fn convert(value: f64, from_unit: &str, to_unit: &str) -> AppResult<f64> {
    let result = if is_temperature_unit(from_unit) && is_temperature_unit(to_unit) {
        convert_temperature(value, from_unit, to_unit)
    } else {
        convert_linear(value, from_unit, to_unit)?
    };
    tracing::debug!(value, from_unit, to_unit, result, "converted units");
    Ok(result)
}

// ============================================================================
// Converter state
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitIntent {
    Focus(ActiveInput),
    SetFromValue(String),
    SelectUnit(String),
    Convert,
    Reverse,
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitConverterEngine {
    active_input: ActiveInput,
    from_value: String,
    to_value: String,
    from_unit: Option<String>,
    to_unit: Option<String>,
}

impl UnitConverterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, intent: UnitIntent) -> bool {
        match intent {
            UnitIntent::Focus(input) => {
                self.set_focus(input);
                true
            }
            UnitIntent::SetFromValue(text) => {
                self.set_from_value(text);
                true
            }
            UnitIntent::SelectUnit(unit) => self.select_unit(&unit),
            UnitIntent::Convert => self.convert(),
            UnitIntent::Reverse => {
                self.reverse();
                true
            }
            UnitIntent::Cancel => {
                self.cancel();
                true
            }
        }
    }

    pub fn set_focus(&mut self, input: ActiveInput) {
        self.active_input = input;
    }

    pub fn set_from_value(&mut self, text: impl Into<String>) {
        self.from_value = text.into();
    }

    pub fn from_value(&self) -> &str {
        &self.from_value
    }

    pub fn to_value(&self) -> &str {
        &self.to_value
    }

    pub fn from_unit(&self) -> Option<&str> {
        self.from_unit.as_deref()
    }

    pub fn to_unit(&self) -> Option<&str> {
        self.to_unit.as_deref()
    }

    /// The first pick on a fresh converter fills the source unit; after that the
    /// focused input decides which side changes.
    pub fn select_unit(&mut self, unit: &str) -> bool {
        if lookup(unit).is_none() {
            tracing::warn!(unit, "ignoring unknown unit");
            return false;
        }
        let fresh = self.from_unit.is_none() && self.to_unit.is_none();
        if fresh || self.active_input == ActiveInput::From {
            self.from_unit = Some(unit.to_string());
        } else {
            self.to_unit = Some(unit.to_string());
        }
        true
    }

    /// Swap both units and both values as they stand; nothing is recomputed.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.from_unit, &mut self.to_unit);
        std::mem::swap(&mut self.from_value, &mut self.to_value);
    }

    pub fn cancel(&mut self) {
        self.from_value.clear();
        self.to_value.clear();
        self.from_unit = None;
        self.to_unit = None;
    }

    /// Silently does nothing until a numeric value and both units are present.
    pub fn convert(&mut self) -> bool {
        let (Some(from_unit), Some(to_unit)) = (self.from_unit.as_deref(), self.to_unit.as_deref()) else {
            return false;
        };
        if self.from_value.is_empty() {
            return false;
        }
        let value = formatter::parse(&self.from_value);
        if value.is_nan() {
            return false;
        }

        self.to_value = match convert(value, from_unit, to_unit) {
            Ok(result) if result.is_finite() => result.to_string(),
            Ok(result) => {
                tracing::warn!(from_unit, to_unit, result, "conversion has no finite result");
                ERROR_DISPLAY.to_string()
            }
            Err(e) => {
                tracing::warn!(from_unit, to_unit, error = %e, "conversion rejected");
                ERROR_DISPLAY.to_string()
            }
        };
        true
    }

    pub fn snapshot(&self) -> UnitConverterSnapshot {
        UnitConverterSnapshot {
            active_input: self.active_input,
            from_value: self.from_value.clone(),
            to_value: self.to_value.clone(),
            from_unit: self.from_unit.clone(),
            to_unit: self.to_unit.clone(),
        }
    }
}

impl FeatureSync for UnitConverterEngine {
    fn mode(&self) -> Mode {
        Mode::UnitConverter
    }

    fn handle_intent(&mut self, intent: &Intent) -> bool {
        match intent {
            Intent::Unit(intent) => self.apply(intent.clone()),
            _ => false,
        }
    }

    fn view(&self) -> FeatureSnapshot {
        FeatureSnapshot::UnitConverter(self.snapshot())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
