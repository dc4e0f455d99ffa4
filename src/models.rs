use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Identity of the signed-in player, as issued by the backend.
pub type UserId = String;

/// Largest buy-in or cash-out accepted from a client
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// One recorded poker session
/// Profit is derived, never stored
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    pub location: String,
    pub buy_in: i64,
    pub cash_out: i64,
    pub duration: String,
    pub game_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Session {
    pub fn profit(&self) -> i64 {
        self.cash_out.saturating_sub(self.buy_in)
    }
}

/// Session input from the client, before the backend assigns an id
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub date: NaiveDate,
    pub location: String,
    pub buy_in: i64,
    pub cash_out: i64,
    pub duration: String,
    pub game_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewSession {
    /// Required-field checks done by the client-facing layer.
    pub fn validate(&self) -> Result<(), StoreError> {
        let required = [
            ("location", &self.location),
            ("gameType", &self.game_type),
            ("duration", &self.duration),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(StoreError::Validation(format!("{field} is required")));
            }
        }
        if self.buy_in < 0 || self.cash_out < 0 {
            return Err(StoreError::Validation(
                "buyIn and cashOut must not be negative".to_string(),
            ));
        }
        if self.buy_in > MAX_AMOUNT || self.cash_out > MAX_AMOUNT {
            return Err(StoreError::Validation(format!(
                "buyIn and cashOut must not exceed {MAX_AMOUNT}"
            )));
        }
        Ok(())
    }

    pub(crate) fn to_row(&self) -> NewSessionRow {
        NewSessionRow {
            location: self.location.clone(),
            game_type: self.game_type.clone(),
            buy_in: self.buy_in,
            cash_out: self.cash_out,
            duration: self.duration.clone(),
            date: self.date,
            notes: self.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewLocation {
    pub name: String,
}

impl NewLocation {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name is required".to_string()));
        }
        Ok(())
    }
}

/// Blind structure: small blind, big blind, optional straddle
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameType {
    pub id: String,
    pub sb: f64,
    pub bb: f64,
    #[serde(default)]
    pub str: Option<f64>,
}

impl GameType {
    /// Stake label as stored on a session, e.g. `1/2` or `1/2/5`.
    /// A zero straddle counts as no straddle.
    pub fn label(&self) -> String {
        match self.str {
            Some(straddle) if straddle != 0.0 => format!("{}/{}/{}", self.sb, self.bb, straddle),
            _ => format!("{}/{}", self.sb, self.bb),
        }
    }

    /// Stakes available before anything is fetched
    pub fn defaults() -> Vec<GameType> {
        [(1.0, 2.0), (2.0, 5.0), (5.0, 10.0), (10.0, 20.0)]
            .into_iter()
            .map(|(sb, bb)| GameType {
                id: String::new(),
                sb,
                bb,
                str: Some(0.0),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewGameType {
    pub sb: f64,
    pub bb: f64,
    #[serde(default)]
    pub str: Option<f64>,
}

impl NewGameType {
    pub fn validate(&self) -> Result<(), StoreError> {
        if !(self.sb > 0.0 && self.bb > 0.0) {
            return Err(StoreError::Validation(
                "small blind and big blind are required".to_string(),
            ));
        }
        if matches!(self.str, Some(s) if s < 0.0) {
            return Err(StoreError::Validation("straddle must not be negative".to_string()));
        }
        Ok(())
    }
}

/// `sessions` table row, as the backend stores it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionRow {
    pub id: String,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub location: String,
    pub buy_in: i64,
    pub cash_out: i64,
    pub duration: String,
    pub game_type: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            date: row.date,
            location: row.location,
            buy_in: row.buy_in,
            cash_out: row.cash_out,
            duration: row.duration,
            game_type: row.game_type,
            notes: row.notes.filter(|n| !n.is_empty()),
        }
    }
}

/// Insert payload for `sessions`; `user_id` is supplied separately
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewSessionRow {
    pub location: String,
    pub game_type: String,
    pub buy_in: i64,
    pub cash_out: i64,
    pub duration: String,
    pub date: NaiveDate,
    pub notes: String,
}

/// API Response
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}
