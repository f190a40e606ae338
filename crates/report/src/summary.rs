//! Summary counts over a finished model.

use hoh_core::PlayerModel;
use serde::Serialize;

/// Headline numbers shown on the dashboard and at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub player: String,
    pub alliance_id: Option<String>,
    pub heroes: usize,
    pub decks: usize,
    pub equipment_items: usize,
    /// Heroes wearing at least one item.
    pub equipped_heroes: usize,
    pub relics: usize,
    pub cities: usize,
    pub placed_buildings: i64,
    pub alliance_members: usize,
    pub alliance_cities: usize,
}

impl ModelSummary {
    /// Compute the summary of a model.
    pub fn from_model(model: &PlayerModel) -> Self {
        Self {
            player: model.player.label().to_string(),
            alliance_id: model.player.alliance_id.clone(),
            heroes: model.heroes.len(),
            decks: model.decks.len(),
            equipment_items: model.equipment_count(),
            equipped_heroes: model.equipment.values().filter(|v| !v.is_empty()).count(),
            relics: model.relic_count(),
            cities: model.cities.len(),
            placed_buildings: model
                .cities
                .iter()
                .fold(0i64, |acc, c| acc.saturating_add(c.placed_building_total())),
            alliance_members: model.alliance_members.len(),
            alliance_cities: model.alliance_cities.len(),
        }
    }

    /// Human-readable multi-line report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Player: {}\n", self.player));
        if let Some(alliance) = &self.alliance_id {
            out.push_str(&format!("Alliance: {alliance}\n"));
        }
        out.push_str(&format!("Heroes: {}\n", self.heroes));
        out.push_str(&format!("Decks: {}\n", self.decks));
        out.push_str(&format!(
            "Equipment items: {} (on {} heroes)\n",
            self.equipment_items, self.equipped_heroes
        ));
        out.push_str(&format!("Relics: {}\n", self.relics));
        out.push_str(&format!(
            "Cities: {} ({} placed buildings)\n",
            self.cities, self.placed_buildings
        ));
        out.push_str(&format!("Alliance members: {}\n", self.alliance_members));
        out.push_str(&format!("Alliance cities: {}\n", self.alliance_cities));
        out
    }
}
