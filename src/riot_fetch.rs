use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::pacer::Pacer;

/// Queue code for ranked flex; the only queue this system ingests.
pub const RANKED_FLEX_QUEUE: u32 = 440;

const REGIONAL_HOST: &str = "https://europe.api.riotgames.com";
const PLATFORM_HOST: &str = "https://euw1.api.riotgames.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client, FetchError> {
    Ok(CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
    })?)
}

/// Why a remote call produced no value. Callers can always tell a failed
/// call apart from a legitimately empty result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found")]
    NotFound,
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountIdentity {
    pub puuid: String,
    /// Display-case name as the platform reports it.
    #[serde(rename = "gameName")]
    pub game_name: String,
    #[serde(rename = "tagLine")]
    pub tag_line: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummonerInfo {
    pub puuid: String,
    #[serde(rename = "summonerLevel", default)]
    pub summoner_level: u64,
    #[serde(rename = "profileIconId", default)]
    pub profile_icon_id: i64,
    #[serde(rename = "revisionDate", default)]
    pub revision_date: i64,
}

#[derive(Debug, Clone)]
pub struct MatchDetail {
    pub match_id: String,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub position: String,
    pub win: bool,
}

#[derive(Debug, Deserialize)]
struct MatchPayload {
    metadata: MatchMetadata,
    info: MatchInfo,
}

#[derive(Debug, Deserialize)]
struct MatchMetadata {
    #[serde(rename = "matchId")]
    match_id: String,
}

#[derive(Debug, Deserialize)]
struct MatchInfo {
    #[serde(default)]
    participants: Vec<WireParticipant>,
}

#[derive(Debug, Deserialize)]
struct WireParticipant {
    #[serde(rename = "summonerName", default)]
    summoner_name: String,
    #[serde(rename = "riotIdGameName", default)]
    riot_id_game_name: String,
    #[serde(rename = "individualPosition", default)]
    individual_position: String,
    #[serde(rename = "teamPosition", default)]
    team_position: String,
    win: bool,
}

impl WireParticipant {
    /// The platform blanks `summonerName` after a rename and reports
    /// `individualPosition: Invalid` for remade games, so both fields
    /// carry a fallback.
    fn into_participant(self) -> Participant {
        let name = if self.summoner_name.trim().is_empty() {
            self.riot_id_game_name
        } else {
            self.summoner_name
        };
        let position = if self.individual_position.is_empty()
            || self.individual_position.eq_ignore_ascii_case("invalid")
        {
            self.team_position
        } else {
            self.individual_position
        };
        Participant {
            name,
            position,
            win: self.win,
        }
    }
}

pub fn parse_account_json(raw: &str) -> Result<AccountIdentity, FetchError> {
    serde_json::from_str(raw.trim()).map_err(|err| FetchError::Decode(err.to_string()))
}

pub fn parse_summoner_json(raw: &str) -> Result<SummonerInfo, FetchError> {
    serde_json::from_str(raw.trim()).map_err(|err| FetchError::Decode(err.to_string()))
}

pub fn parse_match_ids_json(raw: &str) -> Result<Vec<String>, FetchError> {
    serde_json::from_str(raw.trim()).map_err(|err| FetchError::Decode(err.to_string()))
}

pub fn parse_match_detail_json(raw: &str) -> Result<MatchDetail, FetchError> {
    let payload: MatchPayload =
        serde_json::from_str(raw.trim()).map_err(|err| FetchError::Decode(err.to_string()))?;
    Ok(MatchDetail {
        match_id: payload.metadata.match_id,
        participants: payload
            .info
            .participants
            .into_iter()
            .map(WireParticipant::into_participant)
            .collect(),
    })
}

/// The four read endpoints the ingestion pipeline and commands consume.
pub trait MatchApi {
    fn resolve_account(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountIdentity, FetchError>;
    fn fetch_summoner(&self, puuid: &str) -> Result<SummonerInfo, FetchError>;
    fn fetch_recent_match_ids(
        &self,
        puuid: &str,
        queue_id: u32,
        count: u32,
    ) -> Result<Vec<String>, FetchError>;
    fn fetch_match_detail(&self, match_id: &str) -> Result<MatchDetail, FetchError>;
}

pub struct RiotClient {
    api_key: String,
    pacer: Pacer,
}

impl RiotClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            pacer: Pacer::default(),
        }
    }

    pub fn with_pacer(api_key: String, pacer: Pacer) -> Self {
        Self { api_key, pacer }
    }

    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.pacer.acquire();
        debug!("GET {url}");
        let client = http_client()?;
        let resp = client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        Ok(body)
    }
}

impl MatchApi for RiotClient {
    fn resolve_account(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountIdentity, FetchError> {
        let url =
            format!("{REGIONAL_HOST}/riot/account/v1/accounts/by-riot-id/{game_name}/{tag_line}");
        let body = self.get_text(&url)?;
        parse_account_json(&body)
    }

    fn fetch_summoner(&self, puuid: &str) -> Result<SummonerInfo, FetchError> {
        let url = format!("{PLATFORM_HOST}/lol/summoner/v4/summoners/by-puuid/{puuid}");
        let body = self.get_text(&url)?;
        parse_summoner_json(&body)
    }

    fn fetch_recent_match_ids(
        &self,
        puuid: &str,
        queue_id: u32,
        count: u32,
    ) -> Result<Vec<String>, FetchError> {
        let url = format!(
            "{REGIONAL_HOST}/lol/match/v5/matches/by-puuid/{puuid}/ids?queue={queue_id}&start=0&count={count}"
        );
        let body = self.get_text(&url)?;
        parse_match_ids_json(&body)
    }

    fn fetch_match_detail(&self, match_id: &str) -> Result<MatchDetail, FetchError> {
        let url = format!("{REGIONAL_HOST}/lol/match/v5/matches/{match_id}");
        let body = self.get_text(&url)?;
        parse_match_detail_json(&body)
    }
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .replace('\r', " ")
        .chars()
        .take(220)
        .collect()
}
