//! Self-contained HTML dashboard.

use crate::summary::ModelSummary;
use chrono::{DateTime, Local};
use hoh_core::{Config, PlayerModel, Result};
use std::cmp::Reverse;
use std::fmt::{Display, Write as _};
use std::path::Path;

/// Era spellings used in building ids, with their display form.
const ERA_NAMES: &[(&str, &str)] = &[
    ("AgeOfTheFranks", "Age of the Franks"),
    ("FeudalAge", "Feudal Age"),
    ("IberianEra", "Iberian Era"),
    ("MinoanEra", "Minoan Era"),
    ("ClassicGreece", "Classic Greece"),
    ("BronzeAge", "Bronze Age"),
    ("TreasureHunt", "Treasure Hunt"),
];

const BUILDING_NAMES: &[(&str, &str)] = &[("CultureSite", "Culture Site")];

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; background-color: #f4f4f4; margin: 20px; }
        h1 { color: #2c3e50; }
        h2 { margin-top: 40px; color: #34495e; }
        h3 { margin-top: 25px; color: #7f8c8d; }
        table { width: 100%; border-collapse: collapse; margin-bottom: 30px; }
        th { background-color: #2c3e50; color: white; padding: 8px; text-align: left; }
        td { background-color: #ffffff; padding: 8px; border-bottom: 1px solid #ddd; }
        .summary-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 15px;
            margin-bottom: 30px;
        }
        .summary-box { background: #3498db; color: white; padding: 15px; border-radius: 6px; text-align: center; }
        .label { font-size: 0.8em; opacity: 0.9; }
        .value { font-size: 1.6em; font-weight: bold; }
"#;

/// Renders a [`PlayerModel`] as a single HTML page.
pub struct Dashboard {
    building_prefix: String,
    generated_at: DateTime<Local>,
}

impl Dashboard {
    /// Dashboard stamped with the current time.
    pub fn new(config: &Config) -> Self {
        Self {
            building_prefix: config.naming.building_prefix.clone(),
            generated_at: Local::now(),
        }
    }

    /// Override the generation timestamp.
    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Render and write the page.
    pub fn write(&self, model: &PlayerModel, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render(model))?;
        tracing::info!(path = %path.display(), "wrote dashboard");
        Ok(())
    }

    /// Render the full page.
    pub fn render(&self, model: &PlayerModel) -> String {
        let summary = ModelSummary::from_model(model);
        let mut html = String::with_capacity(16 * 1024);

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n");
        html.push_str("    <title>Heroes of History - Full Dashboard</title>\n");
        let _ = write!(html, "    <style>{STYLE}    </style>\n</head>\n<body>\n");
        html.push_str("    <h1>Heroes of History - Full Dashboard</h1>\n");
        let _ = writeln!(
            html,
            "    <p>Player: {} | Alliance ID: {} | Generated: {}</p>",
            escape(&summary.player),
            escape(summary.alliance_id.as_deref().unwrap_or("None")),
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
        );

        self.render_summary(&mut html, &summary);
        self.render_heroes(&mut html, model);
        self.render_equipment(&mut html, model);
        self.render_relics(&mut html, model);
        self.render_decks(&mut html, model);
        self.render_cities(&mut html, model);
        self.render_alliance(&mut html, model);

        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_summary(&self, html: &mut String, summary: &ModelSummary) {
        html.push_str("    <div class=\"summary-grid\">\n");
        for (value, label) in [
            (summary.heroes, "Heroes"),
            (summary.equipment_items, "Equipment Items"),
            (summary.relics, "Relics"),
            (summary.cities, "Cities"),
            (summary.alliance_members, "Alliance Members"),
        ] {
            let _ = writeln!(
                html,
                "        <div class=\"summary-box\"><div class=\"value\">{value}</div><div class=\"label\">{label}</div></div>"
            );
        }
        html.push_str("    </div>\n");
    }

    fn render_heroes(&self, html: &mut String, model: &PlayerModel) {
        let mut heroes: Vec<_> = model.heroes.iter().collect();
        heroes.sort_by_key(|h| Reverse(h.level));

        html.push_str("    <h2>Hero List</h2>\n");
        table_open(
            html,
            &["Hero", "Level", "Ascension", "Awakening", "Ability Level", "Mastery"],
        );
        for hero in heroes {
            table_row(
                html,
                &[
                    text(hero.name.as_deref()),
                    text(hero.level),
                    text(hero.ascension_level),
                    text(hero.awakening_level),
                    text(hero.ability_level),
                    text(hero.ability_mastery_points),
                ],
            );
        }
        table_close(html);
    }

    fn render_equipment(&self, html: &mut String, model: &PlayerModel) {
        html.push_str("    <h2>Equipment by Hero</h2>\n");
        for (hero, items) in &model.equipment {
            let _ = writeln!(html, "    <h3>{}</h3>", escape(hero));
            table_open(
                html,
                &["Slot", "Set", "Rarity", "Level", "Main Stat", "Value", "Subattributes"],
            );
            for item in items {
                let subs = item
                    .sub_attributes
                    .iter()
                    .map(|s| {
                        escape(&format!(
                            "{} (unlock {}, rolled {})",
                            s.stat.as_deref().unwrap_or("None"),
                            display_or_none(s.unlocked_at_level),
                            display_or_none(s.rolled_value),
                        ))
                    })
                    .collect::<Vec<_>>()
                    .join("<br>");
                table_row(
                    html,
                    &[
                        text(item.slot.as_deref()),
                        text(item.set.as_deref()),
                        text(item.rarity.as_deref()),
                        text(item.level),
                        text(item.main_attribute.stat.as_deref()),
                        text(item.main_attribute.value),
                        subs,
                    ],
                );
            }
            table_close(html);
        }
    }

    fn render_relics(&self, html: &mut String, model: &PlayerModel) {
        html.push_str("    <h2>Relics by Hero</h2>\n");
        for (hero, relics) in &model.relics {
            let _ = writeln!(html, "    <h3>{}</h3>", escape(hero));
            table_open(html, &["Relic", "Level", "Age"]);
            for relic in relics {
                table_row(
                    html,
                    &[
                        text(relic.relic_definition_id.as_deref()),
                        text(relic.level),
                        text(relic.age.as_deref()),
                    ],
                );
            }
            table_close(html);
        }
    }

    fn render_decks(&self, html: &mut String, model: &PlayerModel) {
        html.push_str("    <h2>Hero Decks (Teams)</h2>\n");
        table_open(html, &["Deck", "Heroes"]);
        for deck in &model.decks {
            table_row(
                html,
                &[text(deck.definition_id.as_deref()), escape(&deck.heroes.join(", "))],
            );
        }
        table_close(html);
    }

    fn render_cities(&self, html: &mut String, model: &PlayerModel) {
        html.push_str("    <h2>Cities</h2>\n");
        table_open(html, &["ID", "DefinitionId", "Placed Buildings"]);
        for city in &model.cities {
            let buildings = if city.placed_building_amounts.is_empty() {
                "None".to_string()
            } else {
                city.placed_building_amounts
                    .iter()
                    .map(|(key, amount)| {
                        escape(&format!(
                            "{}: {amount}",
                            format_building_name(key, &self.building_prefix)
                        ))
                    })
                    .collect::<Vec<_>>()
                    .join("<br>")
            };
            table_row(
                html,
                &[
                    text(city.id.as_deref()),
                    text(city.definition_id.as_deref()),
                    buildings,
                ],
            );
        }
        table_close(html);
    }

    fn render_alliance(&self, html: &mut String, model: &PlayerModel) {
        html.push_str("    <h2>Alliance Members</h2>\n");
        table_open(html, &["ID", "Name", "Level", "Power", "Age"]);
        for member in &model.alliance_members {
            table_row(
                html,
                &[
                    text(member.id.as_deref()),
                    text(member.name.as_deref()),
                    text(member.level),
                    text(member.power),
                    text(member.age.as_deref()),
                ],
            );
        }
        table_close(html);
    }
}

/// Humanize a building definition id.
///
/// `building.Building_AgeOfTheFranks_Home_Small_2` becomes
/// `Age of the Franks – Home Small (Level 2)`. Ids with fewer than four
/// `_`-separated parts after the prefix are returned unchanged.
pub fn format_building_name(raw_key: &str, prefix: &str) -> String {
    let key = raw_key.strip_prefix(prefix).unwrap_or(raw_key);
    let parts: Vec<&str> = key.split('_').collect();
    if parts.len() < 4 {
        return raw_key.to_string();
    }

    let era = lookup(ERA_NAMES, parts[0]);
    let name = lookup(BUILDING_NAMES, parts[1]);
    format!("{era} – {name} {} (Level {})", parts[2], parts[3])
}

fn lookup<'a>(table: &[(&str, &'a str)], raw: &'a str) -> &'a str {
    table
        .iter()
        .find(|(from, _)| *from == raw)
        .map(|(_, to)| *to)
        .unwrap_or(raw)
}

/// Minimal HTML escaping for text content.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn display_or_none<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
}

/// Escaped cell text; empty for `None`.
fn text<T: Display>(value: Option<T>) -> String {
    value.map(|v| escape(&v.to_string())).unwrap_or_default()
}

fn table_open(html: &mut String, headers: &[&str]) {
    html.push_str("    <table>\n        <tr>");
    for h in headers {
        let _ = write!(html, "<th>{h}</th>");
    }
    html.push_str("</tr>\n");
}

/// Cells must already be escaped.
fn table_row(html: &mut String, cells: &[String]) {
    html.push_str("        <tr>");
    for c in cells {
        let _ = write!(html, "<td>{c}</td>");
    }
    html.push_str("</tr>\n");
}

fn table_close(html: &mut String) {
    html.push_str("    </table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hoh_core::{City, Hero, PlayerProfile};
    use std::collections::BTreeMap;

    const PREFIX: &str = "building.Building_";

    fn make_hero(name: &str, level: Option<i64>) -> Hero {
        Hero {
            hero_definition_id: Some(format!("hero.{name}")),
            name: Some(name.to_string()),
            level,
            ascension_level: None,
            ability_level: None,
            awakening_level: None,
            ability_mastery_points: None,
            unlocked_at: None,
        }
    }

    fn make_dashboard() -> Dashboard {
        let ts = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        Dashboard::new(&Config::default()).with_timestamp(ts)
    }

    #[test]
    fn test_format_building_name() {
        assert_eq!(
            format_building_name("building.Building_AgeOfTheFranks_Home_Small_2", PREFIX),
            "Age of the Franks – Home Small (Level 2)"
        );
        assert_eq!(
            format_building_name("building.Building_BronzeAge_CultureSite_Large_1", PREFIX),
            "Bronze Age – Culture Site Large (Level 1)"
        );
        assert_eq!(
            format_building_name("building.Building_Odd_Key", PREFIX),
            "building.Building_Odd_Key"
        );
    }

    #[test]
    fn test_unknown_era_passes_through() {
        assert_eq!(
            format_building_name("building.Building_VikingAge_Farm_Average_3", PREFIX),
            "VikingAge – Farm Average (Level 3)"
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_render_contains_sections() {
        let model = PlayerModel {
            player: PlayerProfile {
                display_name: Some("<Me>".to_string()),
                ..Default::default()
            },
            heroes: vec![make_hero("Low", Some(1)), make_hero("High", Some(50))],
            ..Default::default()
        };
        let html = make_dashboard().render(&model);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Player: &lt;Me&gt; | Alliance ID: None | Generated: 2024-01-02 03:04:05"));
        assert!(html.contains("<h2>Hero List</h2>"));
        assert!(html.contains("<h2>Alliance Members</h2>"));
        let high = html.find("<td>High</td>").unwrap();
        let low = html.find("<td>Low</td>").unwrap();
        assert!(high < low, "heroes should be sorted by level descending");
    }

    #[test]
    fn test_render_cities_humanized() {
        let mut placed = BTreeMap::new();
        placed.insert("building.Building_FeudalAge_Workshop_Moderate_4".to_string(), 2);
        let model = PlayerModel {
            cities: vec![
                City {
                    id: Some("1".to_string()),
                    definition_id: Some("city.Capital".to_string()),
                    placed_building_amounts: placed,
                    building_limits: BTreeMap::new(),
                },
                City {
                    id: Some("2".to_string()),
                    definition_id: None,
                    placed_building_amounts: BTreeMap::new(),
                    building_limits: BTreeMap::new(),
                },
            ],
            ..Default::default()
        };
        let html = make_dashboard().render(&model);
        assert!(html.contains("Feudal Age – Workshop Moderate (Level 4): 2"));
        assert!(html.contains("<td>2</td><td></td><td>None</td>"));
    }

    #[test]
    fn test_write_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("analysis/dashboard.html");
        make_dashboard().write(&PlayerModel::default(), &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("</html>"));
    }
}
