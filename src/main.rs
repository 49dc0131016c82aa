use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use flexbot::aliases::{self, AliasMap};
use flexbot::config::{self, Secrets};
use flexbot::ingest::{self, DEFAULT_MATCH_COUNT, IngestOutcome, RegisterOutcome};
use flexbot::poller::{self, DEFAULT_SYNC_INTERVAL_SECS};
use flexbot::riot_fetch::{FetchError, MatchApi, RiotClient};
use flexbot::stats;
use flexbot::store;
use flexbot::team_gen::{self, Session};

#[derive(Parser)]
#[command(version, about = "Ranked flex tracker for a five-stack")]
struct Cli {
    /// SQLite database file (defaults to the per-user data dir)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Alias table mapping in-game names back to registered players
    #[arg(long, global = true, value_name = "FILE")]
    aliases: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Register a player by Riot ID
    Register {
        game_name: String,
        tag_line: String,
    },
    /// List registered players
    Players,
    /// Remove a registered player and their recorded matches
    Remove { summoner_name: String },
    /// Pull recent ranked flex matches for one player
    Update {
        game_name: String,
        tag_line: String,
        /// How many recent matches to scan
        #[arg(long, default_value_t = DEFAULT_MATCH_COUNT, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,
    },
    /// Look up account details without registering
    Info {
        game_name: String,
        tag_line: String,
    },
    /// Per-role win rates for one player
    Winrate { summoner_name: String },
    /// Matches played per role for one player
    Roles { summoner_name: String },
    /// Win rates for every registered player
    Winrates,
    /// Recorded matches for one player
    Matches { summoner_name: String },
    /// Draw a weighted role assignment for five players
    Team {
        #[arg(num_args = 5, value_name = "PLAYER")]
        players: Vec<String>,
        /// Session file holding the role weights
        #[arg(long, value_name = "FILE")]
        session: Option<PathBuf>,
    },
    /// Reset the session role weights
    NewSession {
        #[arg(long, value_name = "FILE")]
        session: Option<PathBuf>,
    },
    /// Keep every registered player's stats in sync
    Run {
        /// Seconds between sync cycles
        #[arg(long, default_value_t = DEFAULT_SYNC_INTERVAL_SECS)]
        interval_secs: u64,
        /// How many recent matches to scan per player
        #[arg(long, default_value_t = DEFAULT_MATCH_COUNT, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,
    },
}

fn main() -> Result<()> {
    config::load_env_files();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let secrets = Secrets::from_env()?;
    debug!("chat credential loaded ({} chars)", secrets.bot_token.len());

    let db_path = cli
        .db
        .or_else(store::default_db_path)
        .context("unable to resolve a database path")?;
    let conn = store::open_db(&db_path)?;

    let aliases_path = cli
        .aliases
        .or_else(aliases::default_aliases_path)
        .context("unable to resolve an alias table path")?;
    let aliases = AliasMap::load(&aliases_path)?;

    let api = RiotClient::new(secrets.riot_api_key);

    match cli.cmd {
        Cmd::Register {
            game_name,
            tag_line,
        } => cmd_register(&conn, &api, &game_name, &tag_line),
        Cmd::Players => cmd_players(&conn),
        Cmd::Remove { summoner_name } => cmd_remove(&conn, &summoner_name),
        Cmd::Update {
            game_name,
            tag_line,
            count,
        } => cmd_update(&conn, &api, &aliases, &game_name, &tag_line, count),
        Cmd::Info {
            game_name,
            tag_line,
        } => cmd_info(&api, &game_name, &tag_line),
        Cmd::Winrate { summoner_name } => cmd_winrate(&conn, &summoner_name),
        Cmd::Roles { summoner_name } => cmd_roles(&conn, &summoner_name),
        Cmd::Winrates => cmd_winrates(&conn),
        Cmd::Matches { summoner_name } => cmd_matches(&conn, &summoner_name),
        Cmd::Team { players, session } => {
            let session_path = session
                .or_else(team_gen::default_session_path)
                .context("unable to resolve a session path")?;
            cmd_team(&conn, &players, &session_path)
        }
        Cmd::NewSession { session } => {
            let session_path = session
                .or_else(team_gen::default_session_path)
                .context("unable to resolve a session path")?;
            cmd_new_session(&session_path)
        }
        Cmd::Run {
            interval_secs,
            count,
        } => {
            poller::run_scheduler(
                &conn,
                &api,
                &aliases,
                Duration::from_secs(interval_secs),
                count,
            );
            Ok(())
        }
    }
}

fn cmd_register(
    conn: &Connection,
    api: &dyn MatchApi,
    game_name: &str,
    tag_line: &str,
) -> Result<()> {
    match ingest::register_player(conn, api, game_name, tag_line)? {
        RegisterOutcome::Registered { summoner_name } => {
            println!("Registered {summoner_name} as {game_name}#{tag_line}");
        }
        RegisterOutcome::AlreadyRegistered { summoner_name } => {
            println!("{summoner_name} is already registered");
        }
        RegisterOutcome::LookupFailed(err) => {
            println!("Failed to resolve {game_name}#{tag_line}: {err}");
        }
    }
    Ok(())
}

fn cmd_players(conn: &Connection) -> Result<()> {
    let players = store::list_players(conn)?;
    if players.is_empty() {
        println!("No registered players.");
        return Ok(());
    }
    println!("Registered players:");
    for player in &players {
        println!(
            "  {} (Riot ID: {}#{})",
            player.summoner_name, player.game_name, player.tag_line
        );
    }
    Ok(())
}

fn cmd_remove(conn: &Connection, summoner_name: &str) -> Result<()> {
    if store::remove_player(conn, summoner_name)? {
        println!("Removed {summoner_name}");
    } else {
        println!("No player found with the name {summoner_name}.");
    }
    Ok(())
}

fn cmd_update(
    conn: &Connection,
    api: &dyn MatchApi,
    aliases: &AliasMap,
    game_name: &str,
    tag_line: &str,
    count: u32,
) -> Result<()> {
    match ingest::ingest_for_player(conn, api, aliases, game_name, tag_line, count)? {
        IngestOutcome::Completed(report) => {
            println!(
                "Updated stats for {}: {} new, {} already recorded",
                report.summoner_name, report.recorded, report.already_recorded
            );
            if report.no_participant > 0 {
                println!(
                    "{} matches did not include {}",
                    report.no_participant, report.summoner_name
                );
            }
            if !report.failed.is_empty() {
                println!("{} matches could not be ingested:", report.failed.len());
                for failure in report.failed.iter().take(8) {
                    println!("  {failure}");
                }
            }
        }
        IngestOutcome::Failed(err) => {
            println!("Failed to update {game_name}#{tag_line}: {err}");
        }
        IngestOutcome::NotRegistered { summoner_name } => {
            println!("{summoner_name} is not registered; run register first.");
        }
    }
    Ok(())
}

fn cmd_info(api: &dyn MatchApi, game_name: &str, tag_line: &str) -> Result<()> {
    let identity = match api.resolve_account(game_name, tag_line) {
        Ok(identity) => identity,
        Err(FetchError::NotFound) => {
            println!("No Riot account found for {game_name}#{tag_line}.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    println!("Riot ID: {}#{}", identity.game_name, identity.tag_line);
    println!("PUUID: {}", identity.puuid);
    let summoner = api.fetch_summoner(&identity.puuid)?;
    println!("Summoner level: {}", summoner.summoner_level);
    println!("Profile icon: {}", summoner.profile_icon_id);
    Ok(())
}

fn cmd_winrate(conn: &Connection, summoner_name: &str) -> Result<()> {
    let Some(rates) = stats::player_breakdown(conn, summoner_name)? else {
        println!("No data found for {summoner_name}.");
        return Ok(());
    };
    if rates.lines.is_empty() {
        println!("No recorded matches for {}.", rates.summoner_name);
        return Ok(());
    }
    println!("Win rates for {}:", rates.summoner_name);
    for line in &rates.lines {
        println!(
            "  {}: {}",
            line.role.as_str(),
            stats::format_win_rate(line.wins, line.total)
        );
    }
    Ok(())
}

fn cmd_roles(conn: &Connection, summoner_name: &str) -> Result<()> {
    let Some(rates) = stats::player_breakdown(conn, summoner_name)? else {
        println!("No data found for {summoner_name}.");
        return Ok(());
    };
    if rates.lines.is_empty() {
        println!("No recorded matches for {}.", rates.summoner_name);
        return Ok(());
    }
    println!("Roles played by {}:", rates.summoner_name);
    for line in &rates.lines {
        println!("  {}: {}", line.role.as_str(), line.total);
    }
    Ok(())
}

fn cmd_winrates(conn: &Connection) -> Result<()> {
    let all = stats::all_player_winrates(conn)?;
    if all.is_empty() {
        println!("No recorded matches for any registered player.");
        return Ok(());
    }
    println!("Current win rates:");
    for rates in &all {
        let parts: Vec<String> = rates
            .lines
            .iter()
            .map(|line| {
                format!(
                    "{}: {}",
                    line.role.as_str(),
                    stats::format_win_rate(line.wins, line.total)
                )
            })
            .collect();
        println!("  {}: {}", rates.summoner_name, parts.join(" | "));
    }
    Ok(())
}

fn cmd_matches(conn: &Connection, summoner_name: &str) -> Result<()> {
    let Some(rows) = stats::player_matches(conn, summoner_name)? else {
        println!("No data found for {summoner_name}.");
        return Ok(());
    };
    if rows.is_empty() {
        println!("No recorded matches for {summoner_name}.");
        return Ok(());
    }
    println!("Recorded matches for {summoner_name}:");
    for row in &rows {
        println!(
            "  Match ID: {}, Role: {}, Win: {}",
            row.match_id,
            row.role.as_str(),
            row.win
        );
    }
    Ok(())
}

fn cmd_team(conn: &Connection, names: &[String], session_path: &Path) -> Result<()> {
    let mut players = Vec::with_capacity(names.len());
    for name in names {
        let Some(player) = store::find_player(conn, name)? else {
            bail!("{name} is not a registered player");
        };
        players.push(player.summoner_name);
    }
    let mut session = team_gen::load_session(session_path);
    let team = team_gen::generate_team(&mut session, &players, &mut rand::thread_rng())?;
    team_gen::save_session(session_path, &session)?;
    println!("Team generated:");
    for assignment in &team {
        println!("  {}: {}", assignment.role.as_str(), assignment.player);
    }
    Ok(())
}

fn cmd_new_session(session_path: &Path) -> Result<()> {
    team_gen::save_session(session_path, &Session::new())?;
    println!("New session started. Role weights have been reset.");
    Ok(())
}
