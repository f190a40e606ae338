//! Normalized player model built from the startup messages.
//!
//! Everything here is produced once per run and never mutated afterwards.
//! Field names serialize in camelCase to match the game's own vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Hero display identifier (definition id with its namespace prefix removed).
pub type HeroName = String;

/// Strip a namespace prefix from an identifier, passing it through unchanged
/// when the prefix is absent.
#[inline]
pub fn strip_namespace<'a>(id: &'a str, prefix: &str) -> &'a str {
    id.strip_prefix(prefix).unwrap_or(id)
}

/// The player's own profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub alliance_id: Option<String>,
}

impl PlayerProfile {
    /// Best available human-readable label.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("Unknown")
    }
}

/// An owned hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    /// Raw definition id, e.g. `hero.Boudica`.
    pub hero_definition_id: Option<String>,
    /// Display form, e.g. `Boudica`.
    pub name: Option<HeroName>,
    pub level: Option<i64>,
    pub ascension_level: Option<i64>,
    pub ability_level: Option<i64>,
    pub awakening_level: Option<i64>,
    pub ability_mastery_points: Option<i64>,
    pub unlocked_at: Option<String>,
}

/// A hero deck (team).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub definition_id: Option<String>,
    /// Hero display identifiers in deck order. Not checked against owned heroes.
    pub heroes: Vec<HeroName>,
}

/// Primary stat of an equipment item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainAttribute {
    pub stat: Option<String>,
    pub value: Option<f64>,
}

/// Secondary stat of an equipment item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAttribute {
    pub stat: Option<String>,
    pub unlocked_at_level: Option<i64>,
    pub rolled_value: Option<f64>,
}

/// A piece of equipment worn by an owned hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub id: Option<String>,
    pub slot: Option<String>,
    pub set: Option<String>,
    pub rarity: Option<String>,
    pub level: Option<i64>,
    pub main_attribute: MainAttribute,
    pub sub_attributes: Vec<SubAttribute>,
}

/// A relic supporting an owned hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relic {
    pub relic_definition_id: Option<String>,
    pub level: Option<i64>,
    pub age: Option<String>,
}

/// One of the player's own cities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: Option<String>,
    pub definition_id: Option<String>,
    /// Building definition id -> number placed.
    pub placed_building_amounts: BTreeMap<String, i64>,
    /// Passed through as delivered.
    pub building_limits: BTreeMap<String, Value>,
}

impl City {
    /// Total number of placed buildings across all kinds, saturating at
    /// the `i64` bounds.
    pub fn placed_building_total(&self) -> i64 {
        self.placed_building_amounts
            .values()
            .fold(0i64, |acc, &n| acc.saturating_add(n))
    }
}

/// A member of the player's alliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllianceMember {
    pub id: Option<String>,
    pub name: Option<String>,
    pub level: Option<i64>,
    pub power: Option<i64>,
    pub age: Option<String>,
}

/// A city owned by some alliance member (possibly the player).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllianceCity {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub definition_id: Option<String>,
}

/// The complete normalized model for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerModel {
    pub player: PlayerProfile,
    pub heroes: Vec<Hero>,
    pub decks: Vec<Deck>,
    /// Hero display identifier -> equipment worn by that hero.
    pub equipment: BTreeMap<HeroName, Vec<EquipmentItem>>,
    /// Hero display identifier -> relics supporting that hero.
    pub relics: BTreeMap<HeroName, Vec<Relic>>,
    pub cities: Vec<City>,
    pub alliance_members: Vec<AllianceMember>,
    pub alliance_cities: Vec<AllianceCity>,
}

impl PlayerModel {
    /// Total equipment items across all heroes.
    pub fn equipment_count(&self) -> usize {
        self.equipment.values().map(Vec::len).sum()
    }

    /// Total relics across all heroes.
    pub fn relic_count(&self) -> usize {
        self.relics.values().map(Vec::len).sum()
    }

    /// Look up an owned hero by display identifier.
    pub fn hero(&self, name: &str) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.name.as_deref() == Some(name))
    }
}
