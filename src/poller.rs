use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::aliases::AliasMap;
use crate::ingest::{IngestOutcome, ingest_for_player};
use crate::riot_fetch::MatchApi;
use crate::store;

pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 900;
const MIN_SYNC_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Default)]
pub struct CycleReport {
    pub players_total: usize,
    pub players_synced: usize,
    pub recorded: usize,
    pub already_recorded: usize,
    pub errors: Vec<String>,
}

/// One pass over every registered player. A player whose sync fails is
/// reported and skipped; the cycle carries on with the rest. Only a store
/// fault aborts the cycle.
pub fn run_sync_cycle(
    conn: &Connection,
    api: &dyn MatchApi,
    aliases: &AliasMap,
    match_count: u32,
) -> Result<CycleReport> {
    let players = store::list_players(conn)?;
    let mut report = CycleReport {
        players_total: players.len(),
        ..CycleReport::default()
    };

    for player in &players {
        match ingest_for_player(
            conn,
            api,
            aliases,
            &player.game_name,
            &player.tag_line,
            match_count,
        )? {
            IngestOutcome::Completed(sync) => {
                report.players_synced += 1;
                report.recorded += sync.recorded;
                report.already_recorded += sync.already_recorded;
                for failure in sync.failed {
                    report.errors.push(format!("{}: {failure}", sync.summoner_name));
                }
            }
            IngestOutcome::Failed(err) => {
                report
                    .errors
                    .push(format!("{}: {err}", player.summoner_name));
            }
            IngestOutcome::NotRegistered { summoner_name } => {
                // Racing removal between list and sync; nothing to do.
                warn!("{summoner_name} vanished mid-cycle");
                report.errors.push(format!("{summoner_name}: removed"));
            }
        }
    }
    Ok(report)
}

/// Runs sync cycles forever at a fixed cadence. Cycle failures are logged
/// and the next cycle still fires.
pub fn run_scheduler(
    conn: &Connection,
    api: &dyn MatchApi,
    aliases: &AliasMap,
    interval: Duration,
    match_count: u32,
) {
    let interval = interval.max(Duration::from_secs(MIN_SYNC_INTERVAL_SECS));
    info!("sync scheduler running every {}s", interval.as_secs());
    loop {
        let started = Instant::now();
        match run_sync_cycle(conn, api, aliases, match_count) {
            Ok(report) => info!(
                "cycle done: {}/{} players, {} new rows, {} known, {} errors",
                report.players_synced,
                report.players_total,
                report.recorded,
                report.already_recorded,
                report.errors.len()
            ),
            Err(err) => warn!("sync cycle aborted: {err:#}"),
        }
        let elapsed = started.elapsed();
        if let Some(remaining) = interval.checked_sub(elapsed) {
            thread::sleep(remaining);
        }
    }
}
