//! # Unit Normalization Module
//!
//! Maps free-form unit strings (Thai and English) to canonical unit tokens.
//! The synonym table is closed: unrecognized or missing input degrades to a
//! configured default unit instead of failing the whole command.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical measurement units for buying and stocking ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalUnit {
    Kilogram,
    Gram,
    Liter,
    Milliliter,
    Piece,
    Pack,
    Box,
    Bottle,
    Bag,
    Can,
    Dozen,
    Pound,
    Ounce,
}

impl CanonicalUnit {
    /// English canonical token (used in structured results)
    pub fn token(&self) -> &'static str {
        match self {
            CanonicalUnit::Kilogram => "kilogram",
            CanonicalUnit::Gram => "gram",
            CanonicalUnit::Liter => "liter",
            CanonicalUnit::Milliliter => "milliliter",
            CanonicalUnit::Piece => "piece",
            CanonicalUnit::Pack => "pack",
            CanonicalUnit::Box => "box",
            CanonicalUnit::Bottle => "bottle",
            CanonicalUnit::Bag => "bag",
            CanonicalUnit::Can => "can",
            CanonicalUnit::Dozen => "dozen",
            CanonicalUnit::Pound => "pound",
            CanonicalUnit::Ounce => "ounce",
        }
    }

    /// Thai display name for user-facing messages
    pub fn thai_name(&self) -> &'static str {
        match self {
            CanonicalUnit::Kilogram => "กิโลกรัม",
            CanonicalUnit::Gram => "กรัม",
            CanonicalUnit::Liter => "ลิตร",
            CanonicalUnit::Milliliter => "มิลลิลิตร",
            CanonicalUnit::Piece => "ชิ้น",
            CanonicalUnit::Pack => "แพ็ค",
            CanonicalUnit::Box => "กล่อง",
            CanonicalUnit::Bottle => "ขวด",
            CanonicalUnit::Bag => "ถุง",
            CanonicalUnit::Can => "กระป๋อง",
            CanonicalUnit::Dozen => "โหล",
            CanonicalUnit::Pound => "ปอนด์",
            CanonicalUnit::Ounce => "ออนซ์",
        }
    }
}

impl std::fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

lazy_static! {
    /// Thai/English synonyms for each canonical unit, lower-cased keys
    static ref UNIT_SYNONYMS: HashMap<&'static str, CanonicalUnit> = {
        let mut map = HashMap::new();

        // Weight
        map.insert("กิโลกรัม", CanonicalUnit::Kilogram);
        map.insert("กิโล", CanonicalUnit::Kilogram);
        map.insert("โล", CanonicalUnit::Kilogram);
        map.insert("กก.", CanonicalUnit::Kilogram);
        map.insert("กก", CanonicalUnit::Kilogram);
        map.insert("kg", CanonicalUnit::Kilogram);
        map.insert("kilogram", CanonicalUnit::Kilogram);
        map.insert("กรัม", CanonicalUnit::Gram);
        map.insert("ก.", CanonicalUnit::Gram);
        map.insert("g", CanonicalUnit::Gram);
        map.insert("gram", CanonicalUnit::Gram);
        map.insert("ปอนด์", CanonicalUnit::Pound);
        map.insert("lb", CanonicalUnit::Pound);
        map.insert("pound", CanonicalUnit::Pound);
        map.insert("ออนซ์", CanonicalUnit::Ounce);
        map.insert("oz", CanonicalUnit::Ounce);
        map.insert("ounce", CanonicalUnit::Ounce);

        // Volume
        map.insert("ลิตร", CanonicalUnit::Liter);
        map.insert("l", CanonicalUnit::Liter);
        map.insert("liter", CanonicalUnit::Liter);
        map.insert("litre", CanonicalUnit::Liter);
        map.insert("มิลลิลิตร", CanonicalUnit::Milliliter);
        map.insert("มล.", CanonicalUnit::Milliliter);
        map.insert("ml", CanonicalUnit::Milliliter);

        // Count and packaging
        map.insert("ชิ้น", CanonicalUnit::Piece);
        map.insert("อัน", CanonicalUnit::Piece);
        map.insert("ตัว", CanonicalUnit::Piece);
        map.insert("ฟอง", CanonicalUnit::Piece);
        map.insert("ลูก", CanonicalUnit::Piece);
        map.insert("piece", CanonicalUnit::Piece);
        map.insert("pcs", CanonicalUnit::Piece);
        map.insert("แพ็ค", CanonicalUnit::Pack);
        map.insert("แพค", CanonicalUnit::Pack);
        map.insert("pack", CanonicalUnit::Pack);
        map.insert("กล่อง", CanonicalUnit::Box);
        map.insert("box", CanonicalUnit::Box);
        map.insert("ขวด", CanonicalUnit::Bottle);
        map.insert("bottle", CanonicalUnit::Bottle);
        map.insert("ถุง", CanonicalUnit::Bag);
        map.insert("bag", CanonicalUnit::Bag);
        map.insert("กระป๋อง", CanonicalUnit::Can);
        map.insert("can", CanonicalUnit::Can);
        map.insert("โหล", CanonicalUnit::Dozen);
        map.insert("dozen", CanonicalUnit::Dozen);

        map
    };
}

/// Unit normalizer with a configurable fallback unit
#[derive(Debug, Clone)]
pub struct UnitNormalizer {
    default_unit: CanonicalUnit,
}

impl UnitNormalizer {
    pub fn new(default_unit: CanonicalUnit) -> Self {
        Self { default_unit }
    }

    /// Map a raw unit string to its canonical unit
    ///
    /// Matching is case-insensitive. `None`, whitespace-only, or unrecognized
    /// input maps to the configured default unit; this function never fails.
    pub fn normalize(&self, raw_unit: Option<&str>) -> CanonicalUnit {
        let raw = match raw_unit {
            Some(r) if !r.trim().is_empty() => r.trim().to_lowercase(),
            _ => return self.default_unit,
        };

        match UNIT_SYNONYMS.get(raw.as_str()) {
            Some(unit) => *unit,
            None => {
                debug!("Unknown unit '{raw}', falling back to {}", self.default_unit);
                self.default_unit
            }
        }
    }

    /// Whether a raw token is a recognized unit synonym
    pub fn is_known(&self, raw_unit: &str) -> bool {
        UNIT_SYNONYMS.contains_key(raw_unit.trim().to_lowercase().as_str())
    }
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::new(CanonicalUnit::Piece)
    }
}

/// All recognized unit synonyms, longest first
///
/// The command parser builds its unit-token alternation from this list; the
/// longest-first ordering makes "กิโลกรัม" win over its prefix "กิโล".
pub fn known_synonyms() -> Vec<&'static str> {
    let mut synonyms: Vec<&'static str> = UNIT_SYNONYMS.keys().copied().collect();
    synonyms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    synonyms
}
