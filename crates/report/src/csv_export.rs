//! CSV exports, one file per model collection.

use hoh_core::{Error, PlayerModel, Result};
use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

type CsvWriter<W> = csv::Writer<W>;

/// Writes every collection of a model as CSV into one directory.
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    /// Exporter writing into `dir` (created if missing).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write all CSV files, returning their paths.
    pub fn export_all(&self, model: &PlayerModel) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)?;

        let files: [(&str, fn(&PlayerModel, &mut CsvWriter<File>) -> Result<()>); 7] = [
            ("heroes.csv", write_heroes),
            ("equipment.csv", write_equipment),
            ("relics.csv", write_relics),
            ("decks.csv", write_decks),
            ("cities.csv", write_cities),
            ("alliance_members.csv", write_alliance_members),
            ("alliance_cities.csv", write_alliance_cities),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, write) in files {
            let path = self.dir.join(name);
            let mut writer = open(&path)?;
            write(model, &mut writer)?;
            writer.flush()?;
            written.push(path);
        }

        tracing::info!(dir = %self.dir.display(), files = written.len(), "wrote CSV exports");
        Ok(written)
    }
}

fn open(path: &Path) -> Result<CsvWriter<File>> {
    csv::Writer::from_path(path)
        .map_err(|e| Error::export(format!("cannot create {}: {e}", path.display())))
}

fn row<W: Write>(writer: &mut CsvWriter<W>, fields: &[String]) -> Result<()> {
    writer
        .write_record(fields)
        .map_err(|e| Error::export(format!("CSV write failed: {e}")))
}

fn header<W: Write>(writer: &mut CsvWriter<W>, names: &[&str]) -> Result<()> {
    writer
        .write_record(names)
        .map_err(|e| Error::export(format!("CSV write failed: {e}")))
}

/// Empty cell for `None`.
fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn json_cell<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// `heroes.csv`
pub fn write_heroes<W: Write>(model: &PlayerModel, writer: &mut CsvWriter<W>) -> Result<()> {
    header(
        writer,
        &[
            "heroDefinitionId",
            "name",
            "level",
            "ascensionLevel",
            "awakeningLevel",
            "abilityLevel",
            "abilityMasteryPoints",
            "unlockedAt",
        ],
    )?;
    for hero in &model.heroes {
        row(
            writer,
            &[
                cell(hero.hero_definition_id.as_deref()),
                cell(hero.name.as_deref()),
                cell(hero.level),
                cell(hero.ascension_level),
                cell(hero.awakening_level),
                cell(hero.ability_level),
                cell(hero.ability_mastery_points),
                cell(hero.unlocked_at.as_deref()),
            ],
        )?;
    }
    Ok(())
}

/// `equipment.csv`; sub-attributes are embedded as a JSON array.
pub fn write_equipment<W: Write>(model: &PlayerModel, writer: &mut CsvWriter<W>) -> Result<()> {
    header(
        writer,
        &[
            "heroName",
            "equipmentId",
            "slot",
            "set",
            "rarity",
            "level",
            "mainAttribute_stat",
            "mainAttribute_value",
            "subAttributes",
        ],
    )?;
    for (hero, items) in &model.equipment {
        for item in items {
            row(
                writer,
                &[
                    hero.clone(),
                    cell(item.id.as_deref()),
                    cell(item.slot.as_deref()),
                    cell(item.set.as_deref()),
                    cell(item.rarity.as_deref()),
                    cell(item.level),
                    cell(item.main_attribute.stat.as_deref()),
                    cell(item.main_attribute.value),
                    json_cell(&item.sub_attributes)?,
                ],
            )?;
        }
    }
    Ok(())
}

/// `relics.csv`
pub fn write_relics<W: Write>(model: &PlayerModel, writer: &mut CsvWriter<W>) -> Result<()> {
    header(writer, &["heroName", "relicDefinitionId", "level", "age"])?;
    for (hero, relics) in &model.relics {
        for relic in relics {
            row(
                writer,
                &[
                    hero.clone(),
                    cell(relic.relic_definition_id.as_deref()),
                    cell(relic.level),
                    cell(relic.age.as_deref()),
                ],
            )?;
        }
    }
    Ok(())
}

/// `decks.csv`; heroes joined with `", "`.
pub fn write_decks<W: Write>(model: &PlayerModel, writer: &mut CsvWriter<W>) -> Result<()> {
    header(writer, &["definitionId", "heroes"])?;
    for deck in &model.decks {
        row(
            writer,
            &[cell(deck.definition_id.as_deref()), deck.heroes.join(", ")],
        )?;
    }
    Ok(())
}

/// `cities.csv`; building maps embedded as JSON objects.
pub fn write_cities<W: Write>(model: &PlayerModel, writer: &mut CsvWriter<W>) -> Result<()> {
    header(
        writer,
        &["id", "definitionId", "placedBuildingsJSON", "buildingLimitsJSON"],
    )?;
    for city in &model.cities {
        row(
            writer,
            &[
                cell(city.id.as_deref()),
                cell(city.definition_id.as_deref()),
                json_cell(&city.placed_building_amounts)?,
                json_cell(&city.building_limits)?,
            ],
        )?;
    }
    Ok(())
}

/// `alliance_members.csv`
pub fn write_alliance_members<W: Write>(
    model: &PlayerModel,
    writer: &mut CsvWriter<W>,
) -> Result<()> {
    header(writer, &["id", "name", "level", "power", "age"])?;
    for member in &model.alliance_members {
        row(
            writer,
            &[
                cell(member.id.as_deref()),
                cell(member.name.as_deref()),
                cell(member.level),
                cell(member.power),
                cell(member.age.as_deref()),
            ],
        )?;
    }
    Ok(())
}

/// `alliance_cities.csv`
pub fn write_alliance_cities<W: Write>(
    model: &PlayerModel,
    writer: &mut CsvWriter<W>,
) -> Result<()> {
    header(writer, &["id", "ownerId", "definitionId"])?;
    for city in &model.alliance_cities {
        row(
            writer,
            &[
                cell(city.id.as_deref()),
                cell(city.owner_id.as_deref()),
                cell(city.definition_id.as_deref()),
            ],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoh_core::{Deck, EquipmentItem, MainAttribute, SubAttribute};

    type WriteFn = fn(&PlayerModel, &mut CsvWriter<Vec<u8>>) -> Result<()>;

    fn render(write: WriteFn, model: &PlayerModel) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write(model, &mut writer).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    fn make_model() -> PlayerModel {
        let mut model = PlayerModel::default();
        model.decks.push(Deck {
            definition_id: Some("deck.Main".to_string()),
            heroes: vec!["Boudica".to_string(), "Caesar".to_string()],
        });
        model.equipment.insert(
            "Boudica".to_string(),
            vec![EquipmentItem {
                id: Some("e1".to_string()),
                slot: Some("slot.Ring".to_string()),
                set: None,
                rarity: Some("rarity.Epic".to_string()),
                level: Some(3),
                main_attribute: MainAttribute {
                    stat: Some("stat.Attack".to_string()),
                    value: Some(12.5),
                },
                sub_attributes: vec![SubAttribute {
                    stat: Some("stat.Hp".to_string()),
                    unlocked_at_level: Some(4),
                    rolled_value: None,
                }],
            }],
        );
        model
    }

    #[test]
    fn test_decks_csv() {
        let out = render(write_decks, &make_model());
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("definitionId,heroes"));
        assert_eq!(lines.next(), Some("deck.Main,\"Boudica, Caesar\""));
    }

    #[test]
    fn test_equipment_csv() {
        let out = render(write_equipment, &make_model());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Boudica,e1,slot.Ring,,rarity.Epic,3,stat.Attack,12.5,"));
        assert!(lines[1].contains("unlockedAtLevel"));
    }

    #[test]
    fn test_empty_model_writes_headers_only() {
        let model = PlayerModel::default();
        assert_eq!(render(write_heroes, &model).lines().count(), 1);
        assert_eq!(render(write_relics, &model).lines().count(), 1);
        assert_eq!(render(write_cities, &model).lines().count(), 1);
        assert_eq!(render(write_alliance_members, &model).lines().count(), 1);
        assert_eq!(render(write_alliance_cities, &model).lines().count(), 1);
    }

    #[test]
    fn test_export_all_writes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path().join("csv"));
        let paths = exporter.export_all(&make_model()).unwrap();

        assert_eq!(paths.len(), 7);
        for path in &paths {
            assert!(path.is_file(), "{} missing", path.display());
        }
        let decks = std::fs::read_to_string(tmp.path().join("csv/decks.csv")).unwrap();
        assert!(decks.contains("deck.Main"));
    }
}
