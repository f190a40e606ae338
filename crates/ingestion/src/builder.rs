//! Player model building from classified buckets.
//!
//! The build runs as a fixed sequence of stages. Each stage reads the buckets
//! (and, for the equipment and relic joins, the hero roster produced earlier)
//! and returns its own piece of the model; nothing is shared mutably between
//! stages.
//!
//! Only a missing `HeroPush` is fatal. Every other absent bucket or field
//! degrades to an empty or `None` value.

use crate::classifier::ClassifiedBuckets;
use hoh_core::record::value_as_int;
use hoh_core::{
    strip_namespace, AllianceCity, AllianceMember, City, Deck, EquipmentItem, Error, Hero,
    HeroName, MainAttribute, PlayerModel, PlayerProfile, RawRecord, Relic, Result, SubAttribute,
};
use std::collections::{BTreeMap, HashSet};

/// Statistics about a model build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Heroes in the roster.
    pub heroes: usize,
    /// `unlocked` entries skipped because their id was already seen.
    pub duplicate_heroes: usize,
    pub decks: usize,
    pub equipment_kept: usize,
    /// Equipment whose wearer is not an owned hero.
    pub equipment_dropped: usize,
    pub relics_kept: usize,
    /// Relics with no supporting unit, or one that is not an owned hero.
    pub relics_dropped: usize,
    pub cities: usize,
    pub alliance_members: usize,
    pub alliance_cities: usize,
}

/// Owned heroes plus the join key derived from them.
#[derive(Debug, Clone, Default)]
pub struct HeroRoster {
    pub heroes: Vec<Hero>,
    /// Raw hero definition ids of every owned hero.
    pub owned: HashSet<String>,
    pub duplicates: usize,
}

impl HeroRoster {
    /// Whether the raw hero definition id belongs to an owned hero.
    pub fn owns(&self, hero_definition_id: &str) -> bool {
        self.owned.contains(hero_definition_id)
    }
}

/// Items grouped under owned heroes, with a count of what was left out.
#[derive(Debug, Clone)]
pub struct HeroJoin<T> {
    pub grouped: BTreeMap<HeroName, Vec<T>>,
    pub kept: usize,
    pub dropped: usize,
}

impl<T> Default for HeroJoin<T> {
    fn default() -> Self {
        Self {
            grouped: BTreeMap::new(),
            kept: 0,
            dropped: 0,
        }
    }
}

impl<T> HeroJoin<T> {
    fn keep(&mut self, hero: HeroName, item: T) {
        self.grouped.entry(hero).or_default().push(item);
        self.kept += 1;
    }
}

/// Builds a [`PlayerModel`] from classified buckets.
pub struct EntityBuilder {
    /// Namespace prefix stripped from hero ids for display.
    hero_prefix: String,
    /// Statistics of the last build.
    stats: BuildStats,
}

impl EntityBuilder {
    /// Create a builder stripping the given hero id prefix.
    pub fn new(hero_prefix: impl Into<String>) -> Self {
        Self {
            hero_prefix: hero_prefix.into(),
            stats: BuildStats::default(),
        }
    }

    /// Create a builder from configuration.
    pub fn from_config(config: &hoh_core::Config) -> Self {
        Self::new(config.naming.hero_prefix.clone())
    }

    /// Build the model. Fails only when the `HeroPush` record is missing.
    pub fn build(&mut self, buckets: &ClassifiedBuckets) -> Result<PlayerModel> {
        let prefix = self.hero_prefix.as_str();

        let player = build_profile(buckets.player.as_ref());

        let hero_push = buckets
            .hero_push
            .as_ref()
            .ok_or_else(|| Error::missing_aggregate("HeroPush"))?;
        let roster = build_roster(hero_push, prefix);
        let decks = build_decks(hero_push, prefix);

        let equipment = join_equipment(&buckets.equipment_lists, &roster, prefix);
        let relics = join_relics(&buckets.relics, &roster, prefix);

        // Cities come from the player record; the CityDTO bucket is not consulted.
        let cities = build_cities(buckets.player.as_ref());
        let alliance_members = build_alliance_members(buckets.alliance_members.as_ref());
        let alliance_cities = build_alliance_cities(&buckets.alliance_cities);

        self.stats = BuildStats {
            heroes: roster.heroes.len(),
            duplicate_heroes: roster.duplicates,
            decks: decks.len(),
            equipment_kept: equipment.kept,
            equipment_dropped: equipment.dropped,
            relics_kept: relics.kept,
            relics_dropped: relics.dropped,
            cities: cities.len(),
            alliance_members: alliance_members.len(),
            alliance_cities: alliance_cities.len(),
        };

        tracing::info!(
            heroes = self.stats.heroes,
            decks = self.stats.decks,
            equipment = self.stats.equipment_kept,
            relics = self.stats.relics_kept,
            cities = self.stats.cities,
            alliance_members = self.stats.alliance_members,
            "built player model"
        );

        Ok(PlayerModel {
            player,
            heroes: roster.heroes,
            decks,
            equipment: equipment.grouped,
            relics: relics.grouped,
            cities,
            alliance_members,
            alliance_cities,
        })
    }

    /// Get statistics of the last successful build.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self::new("hero.")
    }
}

/// Project the player record, or an all-`None` profile when absent.
pub fn build_profile(player: Option<&RawRecord>) -> PlayerProfile {
    let Some(player) = player else {
        return PlayerProfile::default();
    };
    PlayerProfile {
        id: player.text_field("id"),
        display_name: player.text_field("displayName"),
        username: player.text_field("username"),
        alliance_id: player.text_field("allianceId"),
    }
}

/// Build the owned-hero roster from `HeroPush.unlocked`.
pub fn build_roster(hero_push: &RawRecord, prefix: &str) -> HeroRoster {
    let mut roster = HeroRoster::default();

    for entry in hero_push.records_field("unlocked") {
        let hero_definition_id = entry.str_field("heroDefinitionId").map(str::to_string);

        if let Some(id) = &hero_definition_id {
            if !roster.owned.insert(id.clone()) {
                roster.duplicates += 1;
                tracing::warn!(hero = %id, "duplicate hero in unlocked list, keeping the first");
                continue;
            }
        }

        roster.heroes.push(Hero {
            name: hero_definition_id
                .as_deref()
                .map(|id| strip_namespace(id, prefix).to_string()),
            hero_definition_id,
            level: entry.int_field("level"),
            ascension_level: entry.int_field("ascensionLevel"),
            ability_level: entry.int_field("abilityLevel"),
            awakening_level: entry.int_field("awakeningLevel"),
            ability_mastery_points: entry.int_field("abilityMasteryPoints"),
            unlocked_at: entry.text_field("unlockedAt"),
        });
    }

    roster
}

/// Build decks from `HeroPush.deck`. Hero references are not checked
/// against the roster.
pub fn build_decks(hero_push: &RawRecord, prefix: &str) -> Vec<Deck> {
    hero_push
        .records_field("deck")
        .iter()
        .map(|deck| Deck {
            definition_id: deck.text_field("definitionId"),
            heroes: deck
                .string_list_field("heroDefinitionId")
                .iter()
                .map(|id| strip_namespace(id, prefix).to_string())
                .collect(),
        })
        .collect()
}

/// Keep equipment worn by owned heroes, grouped by hero display name.
pub fn join_equipment(
    lists: &[Vec<RawRecord>],
    roster: &HeroRoster,
    prefix: &str,
) -> HeroJoin<EquipmentItem> {
    let mut join = HeroJoin::default();

    for entry in lists.iter().flatten() {
        match owned_hero(entry.str_field("equippedOnHeroDefinitionId"), roster) {
            Some(hero) => join.keep(
                strip_namespace(hero, prefix).to_string(),
                parse_equipment(entry),
            ),
            None => {
                join.dropped += 1;
                tracing::debug!(
                    equipment = ?entry.text_field("id"),
                    "equipment not worn by an owned hero, dropped"
                );
            }
        }
    }

    join
}

/// Keep relics supporting owned heroes, grouped by hero display name.
pub fn join_relics(relics: &[RawRecord], roster: &HeroRoster, prefix: &str) -> HeroJoin<Relic> {
    let mut join = HeroJoin::default();

    for entry in relics {
        let supporting = entry.record_field("supportingUnit");
        let hero_id = supporting.as_ref().and_then(|unit| unit.str_field("definitionId"));

        match owned_hero(hero_id, roster) {
            Some(hero) => join.keep(
                strip_namespace(hero, prefix).to_string(),
                Relic {
                    relic_definition_id: entry.text_field("relicDefinitionId"),
                    level: entry.int_field("level"),
                    age: entry.text_field("ageDefinitionId"),
                },
            ),
            None => {
                join.dropped += 1;
                tracing::debug!(
                    relic = ?entry.text_field("relicDefinitionId"),
                    "relic not attributable to an owned hero, dropped"
                );
            }
        }
    }

    join
}

/// Build cities from `PlayerDTO.unlockedCities`.
pub fn build_cities(player: Option<&RawRecord>) -> Vec<City> {
    let Some(player) = player else {
        return Vec::new();
    };
    player
        .records_field("unlockedCities")
        .iter()
        .map(|city| City {
            id: city.text_field("id"),
            definition_id: city.text_field("definitionId"),
            placed_building_amounts: city
                .object_field("placedBuildingAmounts")
                .map(|amounts| {
                    amounts
                        .iter()
                        .filter_map(|(building, n)| {
                            value_as_int(n).map(|n| (building.clone(), n))
                        })
                        .collect()
                })
                .unwrap_or_default(),
            building_limits: city
                .object_field("buildingLimits")
                .map(|limits| limits.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        })
        .collect()
}

/// Build the alliance roster, empty when the response is absent.
pub fn build_alliance_members(response: Option<&RawRecord>) -> Vec<AllianceMember> {
    let Some(response) = response else {
        return Vec::new();
    };
    response
        .records_field("members")
        .iter()
        .map(|member| AllianceMember {
            id: member.text_field("playerId"),
            name: member.text_field("playerName"),
            level: member.int_field("level"),
            power: member.int_field("power"),
            age: member.text_field("ageDefinitionId"),
        })
        .collect()
}

/// One alliance city per record, kept apart from the player's cities.
pub fn build_alliance_cities(records: &[RawRecord]) -> Vec<AllianceCity> {
    records
        .iter()
        .map(|city| AllianceCity {
            id: city.text_field("id"),
            owner_id: city.text_field("playerId"),
            definition_id: city.text_field("definitionId"),
        })
        .collect()
}

fn owned_hero<'a>(hero_id: Option<&'a str>, roster: &HeroRoster) -> Option<&'a str> {
    hero_id.filter(|id| !id.is_empty() && roster.owns(id))
}

fn parse_equipment(entry: &RawRecord) -> EquipmentItem {
    let stat_boost = entry
        .record_field("mainAttribute")
        .and_then(|main| main.record_field("statBoost"));

    EquipmentItem {
        id: entry.text_field("id"),
        slot: entry.text_field("equipmentSlotTypeDefinitionId"),
        set: entry.text_field("equipmentSetDefinitionId"),
        rarity: entry.text_field("equipmentRarityDefinitionId"),
        level: entry.int_field("level"),
        main_attribute: MainAttribute {
            stat: stat_boost
                .as_ref()
                .and_then(|boost| boost.text_field("unitStatDefinitionId")),
            value: stat_boost.as_ref().and_then(|boost| boost.float_field("value")),
        },
        sub_attributes: entry
            .array_field("subAttributes")
            .iter()
            .filter(|v| v.is_object())
            .cloned()
            .map(RawRecord::from)
            .map(|sub| SubAttribute {
                stat: sub.text_field("unitStatAttributeDefinitionId"),
                unlocked_at_level: sub.int_field("unlockedAtLevel"),
                rolled_value: sub.float_field("rolledValue"),
            })
            .collect(),
    }
}

/// Parse and build in one go, for callers that already hold the messages.
pub fn build_model<I>(records: I, hero_prefix: &str) -> Result<PlayerModel>
where
    I: IntoIterator<Item = RawRecord>,
{
    let buckets = crate::classifier::RecordClassifier::new().partition(records);
    EntityBuilder::new(hero_prefix).build(&buckets)
}
