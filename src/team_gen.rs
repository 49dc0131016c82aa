use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::config::app_data_dir;
use crate::store::{ALL_ROLES, Role};

pub const TEAM_SIZE: usize = 5;
const DEFAULT_WEIGHT: u32 = 1;

/// Per-player per-role draw weights for one play session. Every weight
/// starts at 1; a player assigned a role has that weight doubled, making
/// repeat assignments of the same role more likely as the session goes on.
/// `Session::new()` is the reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    weights: HashMap<String, HashMap<Role, u32>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weight(&self, player: &str, role: Role) -> u32 {
        self.weights
            .get(player)
            .and_then(|per_role| per_role.get(&role))
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    fn double_weight(&mut self, player: &str, role: Role) {
        let weight = self
            .weights
            .entry(player.to_string())
            .or_default()
            .entry(role)
            .or_insert(DEFAULT_WEIGHT);
        *weight = weight.saturating_mul(2);
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub role: Role,
    pub player: String,
}

/// Draws one player per role, in draw order, weighted by the session
/// table and without replacement. The drawn player's weight for that role
/// doubles within the session.
pub fn generate_team(
    session: &mut Session,
    players: &[String],
    rng: &mut impl Rng,
) -> Result<Vec<Assignment>> {
    if players.len() != TEAM_SIZE {
        bail!(
            "team generation needs exactly {TEAM_SIZE} players, got {}",
            players.len()
        );
    }
    let mut seen = HashSet::new();
    for player in players {
        if !seen.insert(player.to_lowercase()) {
            bail!("player {player} selected twice");
        }
    }

    let mut pool: Vec<String> = players.to_vec();
    let mut out = Vec::with_capacity(TEAM_SIZE);
    for role in ALL_ROLES {
        let weights: Vec<u32> = pool.iter().map(|p| session.weight(p, role)).collect();
        let draw = WeightedIndex::new(&weights).context("build weighted draw")?;
        let player = pool.swap_remove(draw.sample(rng));
        session.double_weight(&player, role);
        out.push(Assignment { role, player });
    }
    Ok(out)
}

pub fn default_session_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("team_session.json"))
}

/// A missing or unreadable session file is a fresh session.
pub fn load_session(path: &Path) -> Session {
    let Ok(raw) = fs::read_to_string(path) else {
        return Session::new();
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(session).context("serialize team session")?;
    fs::write(&tmp, json).context("write team session")?;
    fs::rename(&tmp, path).context("swap team session")?;
    Ok(())
}
