use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::config::app_data_dir;

/// Lane roles in draw order. Also the only values the `matches.role`
/// column accepts.
pub const ALL_ROLES: [Role; 5] = [Role::Top, Role::Jungle, Role::Mid, Role::Adc, Role::Support];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jungle,
    Mid,
    #[serde(rename = "ADC")]
    Adc,
    Support,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Jungle => "Jungle",
            Role::Mid => "Mid",
            Role::Adc => "ADC",
            Role::Support => "Support",
        }
    }

    /// Accepts both the platform's position strings (`TOP`, `JUNGLE`,
    /// `MIDDLE`, `BOTTOM`, `UTILITY`) and the canonical names above,
    /// case-insensitively. Anything else is not a lane.
    pub fn from_position(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TOP" => Some(Role::Top),
            "JUNGLE" => Some(Role::Jungle),
            "MIDDLE" | "MID" => Some(Role::Mid),
            "BOTTOM" | "BOT" | "ADC" => Some(Role::Adc),
            "UTILITY" | "SUPPORT" => Some(Role::Support),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: i64,
    pub summoner_name: String,
    pub game_name: String,
    pub tag_line: String,
}

#[derive(Debug, Clone)]
pub struct Participation {
    pub match_id: String,
    pub role: Role,
    pub win: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RoleLine {
    pub role: Role,
    pub wins: i64,
    pub total: i64,
}

pub fn default_db_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("flex_stats.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            summoner_name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            game_name TEXT NOT NULL,
            tag_line TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            match_id TEXT NOT NULL,
            player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            role TEXT NOT NULL CHECK (role IN ('Top', 'Jungle', 'Mid', 'ADC', 'Support')),
            win INTEGER NOT NULL,
            UNIQUE (match_id, player_id)
        );
        CREATE INDEX IF NOT EXISTS idx_matches_player ON matches(player_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Returns true when a new row was created; an already-registered name
/// (compared case-insensitively) leaves the store untouched.
pub fn insert_player(
    conn: &Connection,
    summoner_name: &str,
    game_name: &str,
    tag_line: &str,
) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO players (summoner_name, game_name, tag_line)
             VALUES (?1, ?2, ?3)",
            params![summoner_name, game_name, tag_line],
        )
        .context("insert player")?;
    Ok(changed > 0)
}

pub fn find_player(conn: &Connection, summoner_name: &str) -> Result<Option<Player>> {
    conn.query_row(
        "SELECT id, summoner_name, game_name, tag_line FROM players WHERE summoner_name = ?1",
        params![summoner_name],
        |row| {
            Ok(Player {
                id: row.get(0)?,
                summoner_name: row.get(1)?,
                game_name: row.get(2)?,
                tag_line: row.get(3)?,
            })
        },
    )
    .optional()
    .context("query player")
}

pub fn list_players(conn: &Connection) -> Result<Vec<Player>> {
    let mut stmt = conn
        .prepare("SELECT id, summoner_name, game_name, tag_line FROM players ORDER BY id ASC")
        .context("prepare list players query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Player {
                id: row.get(0)?,
                summoner_name: row.get(1)?,
                game_name: row.get(2)?,
                tag_line: row.get(3)?,
            })
        })
        .context("query list players")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player row")?);
    }
    Ok(out)
}

/// Deletes the player and, through the foreign key, every recorded
/// participation. Returns false when no such player exists.
pub fn remove_player(conn: &Connection, summoner_name: &str) -> Result<bool> {
    let changed = conn
        .execute(
            "DELETE FROM players WHERE summoner_name = ?1",
            params![summoner_name],
        )
        .context("delete player")?;
    Ok(changed > 0)
}

/// Idempotent upsert: recording the same (match, player) pair twice is a
/// no-op enforced by the unique constraint, never an error. Returns true
/// when the row is new.
pub fn record_participation(
    conn: &Connection,
    player_id: i64,
    match_id: &str,
    role: Role,
    win: bool,
) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO matches (match_id, player_id, role, win)
             VALUES (?1, ?2, ?3, ?4)",
            params![match_id, player_id, role.as_str(), win as i64],
        )
        .context("insert participation")?;
    Ok(changed > 0)
}

pub fn load_participations(conn: &Connection, player_id: i64) -> Result<Vec<Participation>> {
    let mut stmt = conn
        .prepare("SELECT match_id, role, win FROM matches WHERE player_id = ?1 ORDER BY id ASC")
        .context("prepare participations query")?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .context("query participations")?;

    let mut out = Vec::new();
    for row in rows {
        let (match_id, role_raw, win) = row.context("decode participation row")?;
        let role = Role::from_position(&role_raw)
            .ok_or_else(|| anyhow!("stored role {role_raw} is not a known lane"))?;
        out.push(Participation {
            match_id,
            role,
            win: win != 0,
        });
    }
    Ok(out)
}

/// Per-role win/total counts for one player, in draw order. Roles the
/// player never recorded a match in do not appear.
pub fn role_breakdown(conn: &Connection, player_id: i64) -> Result<Vec<RoleLine>> {
    let mut stmt = conn
        .prepare(
            "SELECT role, SUM(win), COUNT(*) FROM matches WHERE player_id = ?1 GROUP BY role",
        )
        .context("prepare breakdown query")?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .context("query breakdown")?;

    let mut out = Vec::new();
    for row in rows {
        let (role_raw, wins, total) = row.context("decode breakdown row")?;
        let role = Role::from_position(&role_raw)
            .ok_or_else(|| anyhow!("stored role {role_raw} is not a known lane"))?;
        out.push(RoleLine { role, wins, total });
    }
    out.sort_by_key(|line| line.role);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{
        Role, find_player, insert_player, list_players, load_participations, open_in_memory,
        record_participation, remove_player, role_breakdown,
    };

    #[test]
    fn from_position_maps_platform_strings() {
        assert_eq!(Role::from_position("TOP"), Some(Role::Top));
        assert_eq!(Role::from_position("JUNGLE"), Some(Role::Jungle));
        assert_eq!(Role::from_position("MIDDLE"), Some(Role::Mid));
        assert_eq!(Role::from_position("BOTTOM"), Some(Role::Adc));
        assert_eq!(Role::from_position("UTILITY"), Some(Role::Support));
        assert_eq!(Role::from_position("support"), Some(Role::Support));
        assert_eq!(Role::from_position("adc"), Some(Role::Adc));
        assert_eq!(Role::from_position("Invalid"), None);
        assert_eq!(Role::from_position(""), None);
    }

    #[test]
    fn register_same_name_twice_keeps_one_row() {
        let conn = open_in_memory().expect("open");
        assert!(insert_player(&conn, "Faker", "faker", "kr1").expect("insert"));
        assert!(!insert_player(&conn, "Faker", "faker", "kr1").expect("insert"));
        assert!(!insert_player(&conn, "FAKER", "faker", "kr1").expect("insert"));
        assert_eq!(list_players(&conn).expect("list").len(), 1);
    }

    #[test]
    fn find_player_is_case_insensitive() {
        let conn = open_in_memory().expect("open");
        insert_player(&conn, "UmbreonReaper", "umbreon", "flex").expect("insert");
        let found = find_player(&conn, "umbreonreaper").expect("query").expect("row");
        assert_eq!(found.summoner_name, "UmbreonReaper");
        assert!(find_player(&conn, "nobody").expect("query").is_none());
    }

    #[test]
    fn duplicate_participation_is_ignored() {
        let conn = open_in_memory().expect("open");
        insert_player(&conn, "Faker", "faker", "kr1").expect("insert");
        let player = find_player(&conn, "Faker").expect("query").expect("row");
        assert!(record_participation(&conn, player.id, "EUW1_1", Role::Mid, true).expect("insert"));
        assert!(
            !record_participation(&conn, player.id, "EUW1_1", Role::Mid, true).expect("insert")
        );
        assert_eq!(load_participations(&conn, player.id).expect("load").len(), 1);
    }

    #[test]
    fn remove_player_drops_their_participations() {
        let conn = open_in_memory().expect("open");
        insert_player(&conn, "Faker", "faker", "kr1").expect("insert");
        let player = find_player(&conn, "Faker").expect("query").expect("row");
        record_participation(&conn, player.id, "EUW1_1", Role::Mid, true).expect("insert");
        record_participation(&conn, player.id, "EUW1_2", Role::Top, false).expect("insert");

        assert!(remove_player(&conn, "faker").expect("remove"));
        assert!(!remove_player(&conn, "faker").expect("remove"));

        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
            .expect("count");
        assert_eq!(orphans, 0);
    }

    #[test]
    fn breakdown_counts_wins_per_role_in_draw_order() {
        let conn = open_in_memory().expect("open");
        insert_player(&conn, "Faker", "faker", "kr1").expect("insert");
        let player = find_player(&conn, "Faker").expect("query").expect("row");
        record_participation(&conn, player.id, "EUW1_1", Role::Support, true).expect("insert");
        record_participation(&conn, player.id, "EUW1_2", Role::Mid, true).expect("insert");
        record_participation(&conn, player.id, "EUW1_3", Role::Mid, false).expect("insert");
        record_participation(&conn, player.id, "EUW1_4", Role::Mid, true).expect("insert");

        let lines = role_breakdown(&conn, player.id).expect("breakdown");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].role, Role::Mid);
        assert_eq!(lines[0].wins, 2);
        assert_eq!(lines[0].total, 3);
        assert_eq!(lines[1].role, Role::Support);
        assert_eq!(lines[1].total, 1);
    }

    #[test]
    fn out_of_enum_role_is_rejected_by_schema() {
        let conn = open_in_memory().expect("open");
        insert_player(&conn, "Faker", "faker", "kr1").expect("insert");
        let player = find_player(&conn, "Faker").expect("query").expect("row");
        let result = conn.execute(
            "INSERT INTO matches (match_id, player_id, role, win) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params!["EUW1_9", player.id, "Feeder", 1_i64],
        );
        assert!(result.is_err());
    }
}
