use anyhow::Result;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::aliases::AliasMap;
use crate::riot_fetch::{FetchError, MatchApi, RANKED_FLEX_QUEUE};
use crate::store::{self, Role};

/// How many recent matches one ingestion fetches when the caller does not
/// say otherwise. The scheduler always uses this.
pub const DEFAULT_MATCH_COUNT: u32 = 5;

#[derive(Debug)]
pub enum RegisterOutcome {
    Registered { summoner_name: String },
    AlreadyRegistered { summoner_name: String },
    LookupFailed(FetchError),
}

/// Resolves the Riot ID first, then stores the player. The stored display
/// name keeps the case the platform reports; the two external identifier
/// parts are stored lower-cased. Registering an already-present name is a
/// reported no-op.
pub fn register_player(
    conn: &Connection,
    api: &dyn MatchApi,
    game_name: &str,
    tag_line: &str,
) -> Result<RegisterOutcome> {
    let game_name = game_name.to_lowercase();
    let tag_line = tag_line.to_lowercase();

    let identity = match api.resolve_account(&game_name, &tag_line) {
        Ok(identity) => identity,
        Err(err) => {
            warn!("account lookup failed for {game_name}#{tag_line}: {err}");
            return Ok(RegisterOutcome::LookupFailed(err));
        }
    };

    let summoner_name = identity.game_name;
    if store::insert_player(conn, &summoner_name, &game_name, &tag_line)? {
        info!("registered {summoner_name} as {game_name}#{tag_line}");
        Ok(RegisterOutcome::Registered { summoner_name })
    } else {
        Ok(RegisterOutcome::AlreadyRegistered { summoner_name })
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub summoner_name: String,
    pub matches_seen: usize,
    pub recorded: usize,
    pub already_recorded: usize,
    pub no_participant: usize,
    pub failed: Vec<String>,
}

#[derive(Debug)]
pub enum IngestOutcome {
    Completed(IngestReport),
    /// Account resolution or the match-id page failed; nothing recorded.
    Failed(FetchError),
    /// The Riot ID resolves but nobody registered it.
    NotRegistered { summoner_name: String },
}

/// One player's ingestion pass: resolve, remap, fetch the recent
/// ranked-flex window, then record each match the player appears in.
/// A failure on one match never aborts the rest of the batch.
pub fn ingest_for_player(
    conn: &Connection,
    api: &dyn MatchApi,
    aliases: &AliasMap,
    game_name: &str,
    tag_line: &str,
    match_count: u32,
) -> Result<IngestOutcome> {
    let game_name = game_name.to_lowercase();
    let tag_line = tag_line.to_lowercase();

    let identity = match api.resolve_account(&game_name, &tag_line) {
        Ok(identity) => identity,
        Err(err) => {
            warn!("account lookup failed for {game_name}#{tag_line}: {err}");
            return Ok(IngestOutcome::Failed(err));
        }
    };

    let summoner_name = identity.game_name.clone();
    let Some(player) = store::find_player(conn, &summoner_name)? else {
        return Ok(IngestOutcome::NotRegistered { summoner_name });
    };

    // The remap changes which participant name we look for, nothing else.
    let effective_name = aliases.resolve(&summoner_name);

    let match_ids = match api.fetch_recent_match_ids(&identity.puuid, RANKED_FLEX_QUEUE, match_count)
    {
        Ok(ids) => ids,
        Err(err) => {
            warn!("match id fetch failed for {summoner_name}: {err}");
            return Ok(IngestOutcome::Failed(err));
        }
    };

    let mut report = IngestReport {
        summoner_name: summoner_name.clone(),
        matches_seen: match_ids.len(),
        ..Default::default()
    };

    for match_id in &match_ids {
        let detail = match api.fetch_match_detail(match_id) {
            Ok(detail) => detail,
            Err(err) => {
                warn!("match {match_id}: detail fetch failed: {err}");
                report.failed.push(format!("{match_id}: {err}"));
                continue;
            }
        };

        let Some(participant) = detail
            .participants
            .iter()
            .find(|p| names_match(&p.name, effective_name))
        else {
            // Legitimate when the account was renamed after the match.
            info!("match {match_id}: no participant named {effective_name}");
            report.no_participant += 1;
            continue;
        };

        let Some(role) = Role::from_position(&participant.position) else {
            warn!(
                "match {match_id}: position {:?} is not a lane",
                participant.position
            );
            report
                .failed
                .push(format!("{match_id}: position {:?} is not a lane", participant.position));
            continue;
        };

        if store::record_participation(conn, player.id, match_id, role, participant.win)? {
            info!(
                "recorded {match_id} for {summoner_name}: {} win={}",
                role.as_str(),
                participant.win
            );
            report.recorded += 1;
        } else {
            report.already_recorded += 1;
        }
    }

    Ok(IngestOutcome::Completed(report))
}

fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
