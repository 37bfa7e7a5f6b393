use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum PlayerStatus {
    Active,
    Inactive,
}

impl PlayerStatus {
    pub fn from_active(active: bool) -> PlayerStatus {
        if active { PlayerStatus::Active } else { PlayerStatus::Inactive }
    }

    pub fn is_active(self) -> bool {
        self == PlayerStatus::Active
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerStatus::Active => write!(f, "active"),
            PlayerStatus::Inactive => write!(f, "inactive"),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Player {
    pub id: i32,
    pub name: String,
    pub status: PlayerStatus,
}

impl Player {
    pub fn new(id: i32, name: &str) -> Player {
        Player { id, name: name.to_string(), status: PlayerStatus::Active }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    // names are unique regardless of case, and ordered the same way on every screen
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Trims a submitted player name, returning `None` when nothing is left.
pub fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn name_taken(players: &[Player], name: &str) -> bool {
    let wanted = name.to_lowercase();
    players.iter().any(|p| p.sort_key() == wanted)
}
