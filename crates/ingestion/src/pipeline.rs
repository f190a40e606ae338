//! End-to-end ingestion: payload -> messages -> buckets -> model.

use crate::builder::{BuildStats, EntityBuilder};
use crate::classifier::{ClassificationStats, ClassifiedBuckets, RecordClassifier};
use crate::startup::{parse_messages, StartupSource};
use hoh_core::{Config, PlayerModel, Result};

/// Everything produced by one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestionOutput {
    /// Classified raw records, kept for debugging dumps.
    pub buckets: ClassifiedBuckets,
    /// The normalized model.
    pub model: PlayerModel,
    pub classification: ClassificationStats,
    pub build: BuildStats,
    /// Protobuf rendering of the startup response, when the source had one.
    pub binary: Option<Vec<u8>>,
}

/// Runs classification and building with a fixed configuration.
pub struct Pipeline {
    messages_pointer: String,
    hero_prefix: String,
}

impl Pipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            messages_pointer: config.input.messages_pointer.clone(),
            hero_prefix: config.naming.hero_prefix.clone(),
        }
    }

    /// Fetch from a source and run the whole pipeline.
    pub fn run(&self, source: &dyn StartupSource) -> Result<IngestionOutput> {
        let payload = source.fetch()?;
        let mut output = self.run_json(&payload.json_text)?;
        output.binary = payload.binary;
        Ok(output)
    }

    /// Run the pipeline over a startup JSON document.
    pub fn run_json(&self, json_text: &str) -> Result<IngestionOutput> {
        let records = parse_messages(json_text, &self.messages_pointer)?;

        let mut classifier = RecordClassifier::new();
        let buckets = classifier.partition(records);

        let mut builder = EntityBuilder::new(self.hero_prefix.clone());
        let model = builder.build(&buckets)?;

        Ok(IngestionOutput {
            buckets,
            model,
            classification: classifier.stats().clone(),
            build: builder.stats().clone(),
            binary: None,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::startup::StartupPayload;
    use hoh_core::Error;
    use serde_json::json;

    struct StaticSource(String, Option<Vec<u8>>);

    impl StartupSource for StaticSource {
        fn fetch(&self) -> Result<StartupPayload> {
            Ok(StartupPayload {
                json_text: self.0.clone(),
                binary: self.1.clone(),
            })
        }
    }

    fn make_document() -> String {
        json!({
            "rootContext": {
                "messages": [
                    {"@type": "type.googleapis.com/p.PlayerDTO", "id": 42, "displayName": "Me"},
                    {"@type": "type.googleapis.com/p.HeroPush", "unlocked": [
                        {"heroDefinitionId": "hero.Boudica", "level": 20}
                    ]},
                    {"@type": "type.googleapis.com/p.AllEquipmentUnitDataDTO", "allEquipment": [
                        {"id": "e1", "equippedOnHeroDefinitionId": "hero.Boudica"},
                        {"id": "e2", "equippedOnHeroDefinitionId": "hero.Caesar"}
                    ]},
                    {"@type": "type.googleapis.com/p.SomethingElse"}
                ]
            }
        })
        .to_string()
    }

    #[test]
    fn test_run_from_source() {
        let source = StaticSource(make_document(), None);
        let output = Pipeline::default().run(&source).unwrap();

        assert_eq!(output.model.player.display_name.as_deref(), Some("Me"));
        assert_eq!(output.model.heroes.len(), 1);
        assert_eq!(output.model.equipment_count(), 1);
        assert_eq!(output.classification.total_records, 4);
        assert_eq!(output.classification.unknown_records, 1);
        assert_eq!(output.build.equipment_dropped, 1);
        assert!(output.buckets.player.is_some());
        assert!(output.binary.is_none());
    }

    #[test]
    fn test_binary_payload_passed_through() {
        let source = StaticSource(make_document(), Some(vec![8, 1, 2]));
        let output = Pipeline::default().run(&source).unwrap();
        assert_eq!(output.binary, Some(vec![8, 1, 2]));
    }

    #[test]
    fn test_run_without_hero_push_fails() {
        let doc = json!({"rootContext": {"messages": [
            {"@type": "type.googleapis.com/p.PlayerDTO", "id": 1}
        ]}});
        let err = Pipeline::default().run_json(&doc.to_string()).unwrap_err();
        assert!(err.is_fatal_build_error());
    }

    #[test]
    fn test_custom_pointer() {
        let mut config = Config::default();
        config.input.messages_pointer = "/messages".to_string();
        let doc = json!({"messages": [{"@type": "x.HeroPush"}]});

        let output = Pipeline::new(&config).run_json(&doc.to_string()).unwrap();
        assert!(output.model.heroes.is_empty());

        let err = Pipeline::default().run_json(&doc.to_string()).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }
}
