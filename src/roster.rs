use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{AppError, Result};
use crate::reference;

pub const TEAM_SIZE: usize = 5;

// A team's five picks, in Role order.
pub type Team = [String; TEAM_SIZE];

// Positions, in the order picks are stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    Top,
    Jungle,
    Mid,
    #[serde(rename = "ADC", alias = "Adc", alias = "adc", alias = "Bot")]
    #[strum(to_string = "ADC", serialize = "Bot")]
    Adc,
    Support,
}

impl Role {
    pub fn index(self) -> usize {
        self as usize
    }

    // Key used for this lane in matchup payloads.
    pub fn lane_key(self) -> &'static str {
        match self {
            Role::Top => "top",
            Role::Jungle => "jungle",
            Role::Mid => "mid",
            Role::Adc => "adc",
            Role::Support => "support",
        }
    }
}

// Which side is "your team". Also names the two rosters.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Side {
    #[default]
    #[serde(alias = "blue", alias = "BLUE")]
    Blue,
    #[serde(alias = "red", alias = "RED")]
    Red,
}

pub type Perspective = Side;

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum Region {
    #[default]
    NA,
    EUW,
    EUNE,
    KR,
    BR,
    LAN,
    LAS,
    OCE,
    RU,
    TR,
    JP,
}

// Both rosters. Empty string means the slot is not picked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSelection {
    pub blue: Team,
    pub red: Team,
}

impl RosterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_teams(blue: Team, red: Team) -> Self {
        RosterSelection { blue, red }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }

    pub fn get(&self, side: Side, role: Role) -> &str {
        &self.team(side)[role.index()]
    }

    // Picks a champion for a slot. Passing an empty string clears the slot.
    // The same champion may sit in several slots.
    pub fn set(&mut self, side: Side, role: Role, champion: &str) -> Result<()> {
        let champion = champion.trim();
        if !champion.is_empty() && !reference::is_known_champion(champion) {
            return Err(AppError::invalid(format!("unknown champion '{}'", champion)));
        }
        let team = match side {
            Side::Blue => &mut self.blue,
            Side::Red => &mut self.red,
        };
        team[role.index()] = champion.to_string();
        Ok(())
    }

    // Same picks with surrounding whitespace removed.
    pub fn trimmed(&self) -> RosterSelection {
        RosterSelection {
            blue: self.blue.clone().map(|c| c.trim().to_string()),
            red: self.red.clone().map(|c| c.trim().to_string()),
        }
    }

    pub fn missing_slots(&self) -> Vec<(Side, Role)> {
        Side::iter()
            .flat_map(|side| Role::iter().map(move |role| (side, role)))
            .filter(|(side, role)| self.get(*side, *role).trim().is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_slots().is_empty()
    }

    // All ten slots filled, each with a known champion.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_slots();
        if !missing.is_empty() {
            let slots = missing
                .iter()
                .map(|(side, role)| format!("{} {}", side, role))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::invalid(format!(
                "please fill in all champion selections for both teams (missing: {})",
                slots
            )));
        }

        for side in Side::iter() {
            for champion in self.team(side).iter().map(|c| c.trim()) {
                if !reference::is_known_champion(champion) {
                    return Err(AppError::invalid(format!(
                        "unknown champion '{}' on the {} team",
                        champion, side
                    )));
                }
            }
        }
        Ok(())
    }
}

// Who is asking, and which slot on their team they play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonerIdentity {
    pub name: String,
    #[serde(default)]
    pub region: Region,
    pub role: Role,
}

impl SummonerIdentity {
    pub fn new(name: impl Into<String>, region: Region, role: Role) -> Self {
        SummonerIdentity {
            name: name.into(),
            region,
            role,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid("please enter your summoner name"));
        }
        Ok(())
    }
}
