use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use crate::settlement::Settlement;

pub const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
}

/// One settled game. `players`, `scores` and `points` are all indexed by seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub players: Vec<String>,
    pub scores: Vec<i64>,
    pub points: Vec<f64>,
    /// Table fee in currency units at the time the game was recorded
    pub table_fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_points: Option<f64>,
}

impl GameRecord {
    /// First 8 characters of the id, enough to address a game from the CLI
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((i, _)) => &self.id[..i],
            None => &self.id,
        }
    }

    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player_id)
    }

    pub fn points_for(&self, player_id: &str) -> Option<f64> {
        self.seat_of(player_id)
            .and_then(|seat| self.points.get(seat).copied())
    }

    /// Fee points for this game. Records written without fee points fall
    /// back to `table_fee / 100`.
    pub fn effective_fee_points(&self) -> f64 {
        self.fee_points.unwrap_or(self.table_fee / 100.0)
    }
}

/// Players and game results, persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub version: u32,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub results: Vec<GameRecord>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a new empty ledger at the current version
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION,
            players: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Register a player. Names are trimmed and must be unique.
    pub fn add_player(&mut self, name: &str) -> Result<&Player, LedgerError> {
        let name = self.check_name(name, None)?;
        self.players.push(Player {
            id: uuid::Uuid::new_v4().to_string(),
            name,
        });
        let index = self.players.len() - 1;
        Ok(&self.players[index])
    }

    /// Look up a player by id, then by exact name, then by name ignoring case
    pub fn find_player(&self, key: &str) -> Option<&Player> {
        let key = key.trim();
        self.players
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.players.iter().find(|p| p.name == key))
            .or_else(|| {
                self.players
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(key))
            })
    }

    /// Display name for a player id. Removed players show their id.
    pub fn player_name<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.as_str())
            .unwrap_or(player_id)
    }

    pub fn rename_player(&mut self, key: &str, new_name: &str) -> Result<(), LedgerError> {
        let id = self
            .find_player(key)
            .map(|p| p.id.clone())
            .ok_or_else(|| LedgerError::UnknownPlayer(key.to_string()))?;
        let name = self.check_name(new_name, Some(&id))?;
        if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
            player.name = name;
        }
        Ok(())
    }

    /// Remove a player from the roster. Recorded games keep the player's id.
    pub fn remove_player(&mut self, key: &str) -> Result<Player, LedgerError> {
        let id = self
            .find_player(key)
            .map(|p| p.id.clone())
            .ok_or_else(|| LedgerError::UnknownPlayer(key.to_string()))?;
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LedgerError::UnknownPlayer(key.to_string()))?;
        Ok(self.players.remove(index))
    }

    /// Resolve names or ids to player ids for one table, in seat order.
    pub fn resolve_seats(
        &self,
        keys: &[String],
        expected: usize,
    ) -> Result<Vec<String>, LedgerError> {
        if keys.len() != expected {
            return Err(LedgerError::SeatCountMismatch {
                expected,
                actual: keys.len(),
            });
        }

        let mut seats: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            let player = self
                .find_player(key)
                .ok_or_else(|| LedgerError::UnknownPlayer(key.clone()))?;
            if seats.contains(&player.id) {
                return Err(LedgerError::DuplicateSeat(player.name.clone()));
            }
            seats.push(player.id.clone());
        }
        Ok(seats)
    }

    /// Append a settled game and return the stored record
    pub fn record_game(
        &mut self,
        seats: Vec<String>,
        scores: Vec<i64>,
        settlement: &Settlement,
        table_fee: f64,
        at: DateTime<Utc>,
    ) -> &GameRecord {
        self.results.push(GameRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date: at,
            players: seats,
            scores,
            points: settlement.points.clone(),
            table_fee,
            fee_points: Some(settlement.fee_points),
        });
        let index = self.results.len() - 1;
        &self.results[index]
    }

    /// Find a game by full id or unique id prefix
    pub fn find_game(&self, key: &str) -> Result<&GameRecord, LedgerError> {
        let index = self.game_index(key)?;
        Ok(&self.results[index])
    }

    /// Replace seats, scores and points of a recorded game. Id and date are kept.
    pub fn update_game(
        &mut self,
        key: &str,
        seats: Vec<String>,
        scores: Vec<i64>,
        settlement: &Settlement,
        table_fee: f64,
    ) -> Result<&GameRecord, LedgerError> {
        let index = self.game_index(key)?;
        let record = &mut self.results[index];
        record.players = seats;
        record.scores = scores;
        record.points = settlement.points.clone();
        record.table_fee = table_fee;
        record.fee_points = Some(settlement.fee_points);
        Ok(&self.results[index])
    }

    pub fn delete_game(&mut self, key: &str) -> Result<GameRecord, LedgerError> {
        let index = self.game_index(key)?;
        Ok(self.results.remove(index))
    }

    fn game_index(&self, key: &str) -> Result<usize, LedgerError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(LedgerError::UnknownGame(key.to_string()));
        }
        if let Some(index) = self.results.iter().position(|r| r.id == key) {
            return Ok(index);
        }

        let mut matches = self
            .results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.id.starts_with(key))
            .map(|(i, _)| i);
        match (matches.next(), matches.next()) {
            (Some(index), None) => Ok(index),
            (Some(_), Some(_)) => Err(LedgerError::AmbiguousGame(key.to_string())),
            (None, _) => Err(LedgerError::UnknownGame(key.to_string())),
        }
    }

    fn check_name(&self, name: &str, except_id: Option<&str>) -> Result<String, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        let taken = self
            .players
            .iter()
            .any(|p| p.name == name && Some(p.id.as_str()) != except_id);
        if taken {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }
        Ok(name.to_string())
    }
}
