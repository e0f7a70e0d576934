use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{StructuredPayload, strings};
use crate::roster::Role;

// Meta summary for the current game version, shown before the draft panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchOverview {
    #[serde(default)]
    pub version: String,
    pub summary: String,
    #[serde(default)]
    pub champion_changes: Vec<String>,
    #[serde(default)]
    pub item_changes: Vec<String>,
    #[serde(default)]
    pub meta_predictions: Vec<String>,
    #[serde(default)]
    pub trending_picks: BTreeMap<String, Vec<String>>, // "Top", "Jungle", "Mid", "ADC", "Support"
    #[serde(default)]
    pub player_tips: Vec<String>,
}

impl PatchOverview {
    // Lookup by role display name, tolerant of case.
    pub fn trending_for(&self, role: Role) -> &[String] {
        let key = role.to_string();
        self.trending_picks
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&key))
            .map(|(_, picks)| picks.as_slice())
            .unwrap_or(&[])
    }
}

impl StructuredPayload for PatchOverview {
    const LABEL: &'static str = "patch overview";

    fn fallback() -> Self {
        PatchOverview {
            version: "14.1".to_string(),
            summary: "Current patch focuses on champion balance and item adjustments to maintain competitive integrity.".to_string(),
            champion_changes: strings(&[
                "Several ADC champions received minor buffs",
                "Tank supports got defensive improvements",
                "Mid lane assassins saw slight nerfs",
            ]),
            item_changes: strings(&[
                "Mythic items received cost adjustments",
                "Support items got utility improvements",
            ]),
            meta_predictions: strings(&[
                "Tank supports will see increased play",
                "Scaling ADCs become more viable",
                "Early game junglers remain strong",
            ]),
            trending_picks: BTreeMap::from([
                ("Top".to_string(), strings(&["Aatrox", "Gnar"])),
                ("Jungle".to_string(), strings(&["Graves", "Nidalee"])),
                ("Mid".to_string(), strings(&["Azir", "Orianna"])),
                ("ADC".to_string(), strings(&["Jinx", "Caitlyn"])),
                ("Support".to_string(), strings(&["Thresh", "Nautilus"])),
            ]),
            player_tips: strings(&[
                "Focus on scaling compositions",
                "Prioritize vision control",
                "Practice team fighting",
            ]),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("field 'summary' is empty".to_string());
        }
        Ok(())
    }
}
