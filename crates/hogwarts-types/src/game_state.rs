//! Game-state snapshot of a player character.
//!
//! The authoritative copy lives in the persistence layer; the relay only ever
//! reads a snapshot handed to it by the caller. Maps are `BTreeMap` so the
//! serialized form is stable across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Game mode tag marking the opening narrative phase.
pub const GAME_MODE_PROLOGUE: &str = "prologue";

/// Game mode tag used for the regular week-by-week loop.
pub const GAME_MODE_WEEKLY: &str = "weekly";

/// Year in which the story opens.
pub const PROLOGUE_YEAR: i32 = 1991;

/// Last month of the opening year still treated as prologue.
pub const PROLOGUE_LAST_MONTH: i32 = 9;

/// Numeric stats, calendar position and location of a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterStatus {
    pub hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub gold: i32,
    pub ap: i32,
    pub max_ap: i32,

    pub knowledge: i32,
    pub athletics: i32,
    pub charm: i32,
    pub morality: i32,
    pub mental: i32,

    pub current_year: i32,
    pub current_month: i32,
    pub current_week: i32,
    pub current_weekday: i32,
    pub location: String,
    /// `"weekly"`, `"event"` or `"prologue"`.
    pub game_mode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellInfo {
    #[serde(default)]
    pub level: f64,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub level: f64,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub desc: String,
}

/// Read-only view of a character's game state used for prompt construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStateSnapshot {
    pub status: CharacterStatus,
    /// Item name -> description.
    pub inventory: BTreeMap<String, InventoryItem>,
    /// Spell name -> proficiency.
    pub spells: BTreeMap<String, SpellInfo>,
    /// Person name -> relationship.
    pub relationships: BTreeMap<String, Relationship>,
    /// World-line change tags, oldest first.
    pub world_log: Vec<String>,
}

impl GameStateSnapshot {
    /// Whether the story is still in its opening phase.
    ///
    /// True when the mode tag says so, or when the calendar has not yet
    /// passed September of the opening year.
    pub fn is_prologue(&self) -> bool {
        self.status.game_mode == GAME_MODE_PROLOGUE
            || (self.status.current_year == PROLOGUE_YEAR
                && self.status.current_month <= PROLOGUE_LAST_MONTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(mode: &str, year: i32, month: i32) -> GameStateSnapshot {
        GameStateSnapshot {
            status: CharacterStatus {
                game_mode: mode.to_string(),
                current_year: year,
                current_month: month,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_prologue_by_mode() {
        assert!(state("prologue", 1995, 12).is_prologue());
    }

    #[test]
    fn test_prologue_by_calendar() {
        assert!(state("weekly", 1991, 1).is_prologue());
        assert!(state("weekly", 1991, 9).is_prologue());
        assert!(!state("weekly", 1991, 10).is_prologue());
        assert!(!state("weekly", 1992, 3).is_prologue());
    }

    #[test]
    fn test_snapshot_deserializes_partial_json() {
        let json = r#"{
            "status": {"hp": 80, "current_year": 1992, "location": "Great Hall"},
            "spells": {"Lumos": {"level": 2.5, "desc": "steady"}},
            "inventory": {"Wand": {"desc": "holly, phoenix feather"}}
        }"#;
        let snapshot: GameStateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.status.hp, 80);
        assert_eq!(snapshot.status.location, "Great Hall");
        assert_eq!(snapshot.spells["Lumos"].level, 2.5);
        assert!(snapshot.relationships.is_empty());
        assert!(snapshot.world_log.is_empty());
    }

    #[test]
    fn test_snapshot_serialization_is_ordered() {
        let mut snapshot = GameStateSnapshot::default();
        snapshot
            .inventory
            .insert("Zonko's joke kit".to_string(), InventoryItem::default());
        snapshot
            .inventory
            .insert("Chocolate frog".to_string(), InventoryItem::default());
        let json = serde_json::to_string(&snapshot).unwrap();
        let frog = json.find("Chocolate frog").unwrap();
        let kit = json.find("Zonko").unwrap();
        assert!(frog < kit);
    }
}
