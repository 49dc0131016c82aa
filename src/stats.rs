use anyhow::Result;
use rusqlite::Connection;

use crate::store::{self, Participation, RoleLine};

#[derive(Debug, Clone)]
pub struct PlayerWinRates {
    pub summoner_name: String,
    pub lines: Vec<RoleLine>,
}

pub fn win_rate_pct(wins: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (wins as f64 / total as f64) * 100.0
}

pub fn format_win_rate(wins: i64, total: i64) -> String {
    format!("{:.2}%", win_rate_pct(wins, total))
}

/// Per-role win/total lines for one player. `None` means nobody by that
/// name is registered; an empty `lines` means registered but no recorded
/// matches yet. Roles without matches never appear.
pub fn player_breakdown(conn: &Connection, summoner_name: &str) -> Result<Option<PlayerWinRates>> {
    let Some(player) = store::find_player(conn, summoner_name)? else {
        return Ok(None);
    };
    let lines = store::role_breakdown(conn, player.id)?;
    Ok(Some(PlayerWinRates {
        summoner_name: player.summoner_name,
        lines,
    }))
}

/// Win-rate lines for every registered player, skipping players with no
/// recorded matches.
pub fn all_player_winrates(conn: &Connection) -> Result<Vec<PlayerWinRates>> {
    let mut out = Vec::new();
    for player in store::list_players(conn)? {
        let lines = store::role_breakdown(conn, player.id)?;
        if lines.is_empty() {
            continue;
        }
        out.push(PlayerWinRates {
            summoner_name: player.summoner_name,
            lines,
        });
    }
    Ok(out)
}

/// The raw recorded participations for one player, oldest first.
pub fn player_matches(conn: &Connection, summoner_name: &str) -> Result<Option<Vec<Participation>>> {
    let Some(player) = store::find_player(conn, summoner_name)? else {
        return Ok(None);
    };
    Ok(Some(store::load_participations(conn, player.id)?))
}
