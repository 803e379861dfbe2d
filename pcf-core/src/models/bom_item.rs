use std::fmt;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Component category of a BOM line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BomCategory {
    #[default]
    Material,
    Energy,
    Transport,
    Other,
}

impl BomCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Energy => "energy",
            Self::Transport => "transport",
            Self::Other => "other",
        }
    }

    /// Case-insensitive parse of the lowercase category names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "material" => Some(Self::Material),
            "energy" => Some(Self::Energy),
            "transport" => Some(Self::Transport),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for BomCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Units a BOM quantity may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "L")]
    Litre,
    #[serde(rename = "mL")]
    Millilitre,
    #[serde(rename = "kWh")]
    KilowattHour,
    #[serde(rename = "MJ")]
    Megajoule,
    #[serde(rename = "tkm")]
    TonneKilometre,
    #[serde(rename = "m")]
    Metre,
    #[serde(rename = "cm")]
    Centimetre,
}

impl Unit {
    pub const ALL: [Unit; 9] = [
        Unit::Kilogram,
        Unit::Gram,
        Unit::Litre,
        Unit::Millilitre,
        Unit::KilowattHour,
        Unit::Megajoule,
        Unit::TonneKilometre,
        Unit::Metre,
        Unit::Centimetre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kilogram => "kg",
            Self::Gram => "g",
            Self::Litre => "L",
            Self::Millilitre => "mL",
            Self::KilowattHour => "kWh",
            Self::Megajoule => "MJ",
            Self::TonneKilometre => "tkm",
            Self::Metre => "m",
            Self::Centimetre => "cm",
        }
    }

    /// Exact (case-sensitive) match against the unit symbols; `"ml"` is not `"mL"`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.as_str() == s)
    }
}

impl fmt::Display for Unit {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a bill of materials.
///
/// Fields are stored as entered. Rules such as "quantity must be positive"
/// are checked by [`crate::validation::validate_bom`], not on construction,
/// so an edit in progress can hold an invalid value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomItem {
    pub id: String,
    pub name: String,
    pub quantity: Decimal,
    /// Unit symbol, expected to be one of [`Unit::ALL`].
    pub unit: String,
    pub category: BomCategory,
    /// `None` means the component is not matched to an emission factor yet.
    /// `Some("")` is never valid.
    pub emission_factor_id: Option<String>,
}

impl BomItem {
    /// Creates an unmatched item with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        quantity: Decimal,
        unit: Unit,
        category: BomCategory,
    ) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            quantity,
            unit: unit.as_str().to_string(),
            category,
            emission_factor_id: None,
        }
    }

    pub fn with_emission_factor(
        mut self,
        emission_factor_id: impl Into<String>,
    ) -> Self {
        self.emission_factor_id = Some(emission_factor_id.into());
        self
    }

    /// Shallow-merges `patch`; fields left as `None` in the patch are untouched.
    pub fn apply(
        &mut self,
        patch: &BomItemPatch,
    ) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = &patch.unit {
            self.unit = unit.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(emission_factor_id) = &patch.emission_factor_id {
            self.emission_factor_id = emission_factor_id.clone();
        }
    }
}

/// Partial update for a [`BomItem`]. The id is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomItemPatch {
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub category: Option<BomCategory>,
    /// `Some(None)` clears the factor; `None` leaves it as is.
    pub emission_factor_id: Option<Option<String>>,
}

impl BomItemPatch {
    pub fn quantity(quantity: Decimal) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Generates an item id from the current millisecond timestamp and a random
/// suffix, e.g. `item-1760800000000-3f2a9c1b`.
pub fn new_item_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("item-{}-{}", Utc::now().timestamp_millis(), &random[..8])
}
