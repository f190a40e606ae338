//! Startup message classification.
//!
//! Routes each raw record to a typed bucket by matching its `@type`
//! discriminator against an ordered table of suffixes. The first matching
//! rule wins; records matching no rule are dropped.

use hoh_core::RawRecord;
use serde::Serialize;

/// Known startup message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    /// `PlayerDTO`: the player's own profile (singleton).
    Player,
    /// `HeroPush`: owned heroes and decks (singleton, required).
    HeroPush,
    /// `AllEquipmentUnitDataDTO`: one list of equipment entries per record.
    Equipment,
    /// `RelicUnitDataDTO`: one relic per record.
    Relic,
    /// `CityDTO`: city snapshot. Classified but not used to build cities.
    City,
    /// `AllianceMembersResponse`: alliance roster (singleton).
    AllianceMembers,
    /// `AllianceCityDTO`: a city belonging to an alliance member.
    AllianceCity,
    /// Anything else.
    Unknown,
}

impl RecordKind {
    /// Whether a later record of this kind replaces an earlier one.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            RecordKind::Player | RecordKind::HeroPush | RecordKind::AllianceMembers
        )
    }

    /// Discriminator suffix naming this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            RecordKind::Player => "PlayerDTO",
            RecordKind::HeroPush => "HeroPush",
            RecordKind::Equipment => "AllEquipmentUnitDataDTO",
            RecordKind::Relic => "RelicUnitDataDTO",
            RecordKind::City => "CityDTO",
            RecordKind::AllianceMembers => "AllianceMembersResponse",
            RecordKind::AllianceCity => "AllianceCityDTO",
            RecordKind::Unknown => "Unknown",
        }
    }
}

/// One entry of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRule {
    /// Discriminator suffix to match.
    pub suffix: &'static str,
    /// Bucket the record is routed to.
    pub kind: RecordKind,
}

impl DispatchRule {
    const fn new(suffix: &'static str, kind: RecordKind) -> Self {
        Self { suffix, kind }
    }

    /// Whether this rule matches the discriminator.
    #[inline]
    pub fn matches(&self, discriminator: &str) -> bool {
        discriminator.ends_with(self.suffix)
    }
}

/// Ordered dispatch table.
///
/// `AllianceCityDTO` must precede `CityDTO`, since the latter is a suffix of
/// the former.
pub const DISPATCH_RULES: &[DispatchRule] = &[
    DispatchRule::new("PlayerDTO", RecordKind::Player),
    DispatchRule::new("HeroPush", RecordKind::HeroPush),
    DispatchRule::new("AllEquipmentUnitDataDTO", RecordKind::Equipment),
    DispatchRule::new("RelicUnitDataDTO", RecordKind::Relic),
    DispatchRule::new("AllianceCityDTO", RecordKind::AllianceCity),
    DispatchRule::new("CityDTO", RecordKind::City),
    DispatchRule::new("AllianceMembersResponse", RecordKind::AllianceMembers),
];

/// Key of the equipment list inside an `AllEquipmentUnitDataDTO` record.
pub const EQUIPMENT_LIST_KEY: &str = "allEquipment";

/// Records grouped by kind, in stream order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifiedBuckets {
    /// Last `PlayerDTO` seen.
    #[serde(rename = "playerDTO")]
    pub player: Option<RawRecord>,
    /// Last `HeroPush` seen.
    #[serde(rename = "heroPush")]
    pub hero_push: Option<RawRecord>,
    /// One inner list per `AllEquipmentUnitDataDTO` record.
    #[serde(rename = "equipmentRawLists")]
    pub equipment_lists: Vec<Vec<RawRecord>>,
    #[serde(rename = "relicsRaw")]
    pub relics: Vec<RawRecord>,
    #[serde(rename = "citiesRaw")]
    pub cities: Vec<RawRecord>,
    /// Last `AllianceMembersResponse` seen.
    #[serde(rename = "allianceMembersRaw")]
    pub alliance_members: Option<RawRecord>,
    #[serde(rename = "allianceCitiesRaw")]
    pub alliance_cities: Vec<RawRecord>,
}

/// Statistics about a classification pass.
#[derive(Debug, Clone, Default)]
pub struct ClassificationStats {
    /// Total records seen.
    pub total_records: u64,
    pub player_records: u64,
    pub hero_push_records: u64,
    pub equipment_records: u64,
    pub relic_records: u64,
    pub city_records: u64,
    pub alliance_members_records: u64,
    pub alliance_city_records: u64,
    /// Records matching no rule (dropped).
    pub unknown_records: u64,
    /// Singleton records that replaced an earlier one.
    pub singleton_overwrites: u64,
    /// Equipment records with no `allEquipment` list.
    pub equipment_without_list: u64,
}

impl ClassificationStats {
    /// Number of records routed to the given kind.
    pub fn count(&self, kind: RecordKind) -> u64 {
        match kind {
            RecordKind::Player => self.player_records,
            RecordKind::HeroPush => self.hero_push_records,
            RecordKind::Equipment => self.equipment_records,
            RecordKind::Relic => self.relic_records,
            RecordKind::City => self.city_records,
            RecordKind::AllianceMembers => self.alliance_members_records,
            RecordKind::AllianceCity => self.alliance_city_records,
            RecordKind::Unknown => self.unknown_records,
        }
    }

    /// Records that landed in some bucket.
    pub fn routed_records(&self) -> u64 {
        self.total_records - self.unknown_records
    }

    fn record(&mut self, kind: RecordKind) {
        self.total_records += 1;
        let slot = match kind {
            RecordKind::Player => &mut self.player_records,
            RecordKind::HeroPush => &mut self.hero_push_records,
            RecordKind::Equipment => &mut self.equipment_records,
            RecordKind::Relic => &mut self.relic_records,
            RecordKind::City => &mut self.city_records,
            RecordKind::AllianceMembers => &mut self.alliance_members_records,
            RecordKind::AllianceCity => &mut self.alliance_city_records,
            RecordKind::Unknown => &mut self.unknown_records,
        };
        *slot += 1;
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Record classifier driven by a dispatch table.
pub struct RecordClassifier {
    /// Ordered rules; first match wins.
    rules: Vec<DispatchRule>,
    /// Classification statistics.
    stats: ClassificationStats,
}

impl RecordClassifier {
    /// Create a classifier using [`DISPATCH_RULES`].
    pub fn new() -> Self {
        Self::with_rules(DISPATCH_RULES.to_vec())
    }

    /// Create a classifier with a custom rule table.
    pub fn with_rules(rules: Vec<DispatchRule>) -> Self {
        Self {
            rules,
            stats: ClassificationStats::default(),
        }
    }

    /// Determine the kind of a single record.
    pub fn classify(&self, record: &RawRecord) -> RecordKind {
        let discriminator = record.discriminator();
        self.rules
            .iter()
            .find(|rule| rule.matches(discriminator))
            .map(|rule| rule.kind)
            .unwrap_or(RecordKind::Unknown)
    }

    /// Partition an ordered record stream into buckets.
    pub fn partition<I>(&mut self, records: I) -> ClassifiedBuckets
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut buckets = ClassifiedBuckets::default();

        for record in records {
            let kind = self.classify(&record);
            self.stats.record(kind);
            self.route(&mut buckets, kind, record);
        }

        tracing::info!(
            total = self.stats.total_records,
            routed = self.stats.routed_records(),
            dropped = self.stats.unknown_records,
            "classified startup messages"
        );

        buckets
    }

    fn route(&mut self, buckets: &mut ClassifiedBuckets, kind: RecordKind, record: RawRecord) {
        match kind {
            RecordKind::Player => self.replace(&mut buckets.player, kind, record),
            RecordKind::HeroPush => self.replace(&mut buckets.hero_push, kind, record),
            RecordKind::AllianceMembers => {
                self.replace(&mut buckets.alliance_members, kind, record)
            }
            RecordKind::Equipment => {
                if record.has_array(EQUIPMENT_LIST_KEY) {
                    buckets
                        .equipment_lists
                        .push(record.records_field(EQUIPMENT_LIST_KEY));
                } else {
                    self.stats.equipment_without_list += 1;
                    tracing::debug!("equipment record without {EQUIPMENT_LIST_KEY} list skipped");
                }
            }
            RecordKind::Relic => buckets.relics.push(record),
            RecordKind::City => buckets.cities.push(record),
            RecordKind::AllianceCity => buckets.alliance_cities.push(record),
            RecordKind::Unknown => {
                tracing::debug!(
                    discriminator = record.discriminator(),
                    "dropped unrecognized record"
                );
            }
        }
    }

    /// Last write wins.
    fn replace(&mut self, slot: &mut Option<RawRecord>, kind: RecordKind, record: RawRecord) {
        if slot.replace(record).is_some() {
            self.stats.singleton_overwrites += 1;
            tracing::warn!(
                kind = kind.type_name(),
                "duplicate singleton record, keeping the latest"
            );
        }
    }

    /// Get classification statistics.
    pub fn stats(&self) -> &ClassificationStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

impl Default for RecordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const NS: &str = "type.googleapis.com/xyz.heroes.proto.";

    fn make_record(type_suffix: &str, mut fields: Value) -> RawRecord {
        fields["@type"] = Value::String(format!("{NS}{type_suffix}"));
        RawRecord::from(fields)
    }

    #[test]
    fn test_classify_known_kinds() {
        let classifier = RecordClassifier::new();
        let cases = [
            ("PlayerDTO", RecordKind::Player),
            ("HeroPush", RecordKind::HeroPush),
            ("AllEquipmentUnitDataDTO", RecordKind::Equipment),
            ("RelicUnitDataDTO", RecordKind::Relic),
            ("CityDTO", RecordKind::City),
            ("AllianceMembersResponse", RecordKind::AllianceMembers),
            ("AllianceCityDTO", RecordKind::AllianceCity),
            ("ResourcePush", RecordKind::Unknown),
        ];
        for (suffix, expected) in cases {
            let record = make_record(suffix, json!({}));
            assert_eq!(classifier.classify(&record), expected, "suffix {suffix}");
        }
    }

    #[test]
    fn test_alliance_city_not_routed_to_city() {
        let classifier = RecordClassifier::new();
        let record = make_record("AllianceCityDTO", json!({"id": 1}));
        assert_eq!(classifier.classify(&record), RecordKind::AllianceCity);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let classifier = RecordClassifier::with_rules(vec![
            DispatchRule::new("CityDTO", RecordKind::City),
            DispatchRule::new("AllianceCityDTO", RecordKind::AllianceCity),
        ]);
        let record = make_record("AllianceCityDTO", json!({}));
        assert_eq!(classifier.classify(&record), RecordKind::City);
    }

    #[test]
    fn test_unknown_and_untyped_dropped() {
        let mut classifier = RecordClassifier::new();
        let records = vec![
            make_record("QuestPush", json!({})),
            RawRecord::from(json!({"no": "type"})),
            RawRecord::from(json!("not an object")),
        ];
        let buckets = classifier.partition(records);

        assert!(buckets.player.is_none());
        assert!(buckets.hero_push.is_none());
        assert!(buckets.relics.is_empty());
        assert_eq!(classifier.stats().total_records, 3);
        assert_eq!(classifier.stats().unknown_records, 3);
        assert_eq!(classifier.stats().routed_records(), 0);
    }

    #[test]
    fn test_singleton_last_write_wins() {
        let mut classifier = RecordClassifier::new();
        let records = vec![
            make_record("PlayerDTO", json!({"id": 1, "displayName": "A"})),
            make_record("PlayerDTO", json!({"id": 2, "displayName": "B"})),
        ];
        let buckets = classifier.partition(records);

        let player = buckets.player.unwrap();
        assert_eq!(player.str_field("displayName"), Some("B"));
        assert_eq!(player.int_field("id"), Some(2));
        assert_eq!(classifier.stats().singleton_overwrites, 1);
        assert_eq!(classifier.stats().count(RecordKind::Player), 2);
    }

    #[test]
    fn test_lists_accumulate_in_order() {
        let mut classifier = RecordClassifier::new();
        let records = vec![
            make_record("RelicUnitDataDTO", json!({"level": 1})),
            make_record("CityDTO", json!({"id": "c1"})),
            make_record("RelicUnitDataDTO", json!({"level": 2})),
            make_record("RelicUnitDataDTO", json!({"level": 2})),
            make_record("AllianceCityDTO", json!({"id": "a1"})),
        ];
        let buckets = classifier.partition(records);

        let levels: Vec<_> = buckets.relics.iter().map(|r| r.int_field("level")).collect();
        assert_eq!(levels, vec![Some(1), Some(2), Some(2)]);
        assert_eq!(buckets.cities.len(), 1);
        assert_eq!(buckets.alliance_cities.len(), 1);
    }

    #[test]
    fn test_equipment_list_of_lists() {
        let mut classifier = RecordClassifier::new();
        let records = vec![
            make_record("AllEquipmentUnitDataDTO", json!({"allEquipment": [{"id": "e1"}, {"id": "e2"}]})),
            make_record("AllEquipmentUnitDataDTO", json!({"other": true})),
            make_record("AllEquipmentUnitDataDTO", json!({"allEquipment": [{"id": "e3"}]})),
        ];
        let buckets = classifier.partition(records);

        assert_eq!(buckets.equipment_lists.len(), 2);
        assert_eq!(buckets.equipment_lists[0].len(), 2);
        assert_eq!(buckets.equipment_lists[1][0].str_field("id"), Some("e3"));
        assert_eq!(classifier.stats().equipment_records, 3);
        assert_eq!(classifier.stats().equipment_without_list, 1);
    }

    #[test]
    fn test_malformed_records_accepted() {
        let mut classifier = RecordClassifier::new();
        let records = vec![
            make_record("HeroPush", json!({"unlocked": "not a list"})),
            make_record("RelicUnitDataDTO", json!({"supportingUnit": 5})),
        ];
        let buckets = classifier.partition(records);
        assert!(buckets.hero_push.is_some());
        assert_eq!(buckets.relics.len(), 1);
    }

    #[test]
    fn test_bucket_serialization_keys() {
        let buckets = ClassifiedBuckets::default();
        let value = serde_json::to_value(&buckets).unwrap();
        assert!(value.get("playerDTO").is_some());
        assert!(value.get("equipmentRawLists").is_some());
        assert!(value.get("allianceCitiesRaw").is_some());
    }

    #[test]
    fn test_reset_stats() {
        let mut classifier = RecordClassifier::new();
        classifier.partition(vec![make_record("HeroPush", json!({}))]);
        assert_eq!(classifier.stats().total_records, 1);
        classifier.reset_stats();
        assert_eq!(classifier.stats().total_records, 0);
    }
}
