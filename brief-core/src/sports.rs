//! ESPN scoreboard snapshots for the tracked Charlotte teams.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    cache::TtlCache,
    error::FetchError,
    http::{build_client, fetch_json},
    model::{GameSnapshot, GameStatus, RecentGame, UpcomingGame},
};

pub const SPORTS_TTL: Duration = Duration::from_secs(15 * 60);

const DEFAULT_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    Nfl,
    Nba,
}

impl League {
    /// Path segment under the ESPN sports API.
    pub fn path(&self) -> &'static str {
        match self {
            League::Nfl => "football/nfl",
            League::Nba => "basketball/nba",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackedTeam {
    /// ESPN `displayName`.
    pub name: &'static str,
    pub league: League,
}

pub const PANTHERS: TrackedTeam = TrackedTeam { name: "Carolina Panthers", league: League::Nfl };
pub const HORNETS: TrackedTeam = TrackedTeam { name: "Charlotte Hornets", league: League::Nba };

pub const TRACKED_TEAMS: [TrackedTeam; 2] = [PANTHERS, HORNETS];

#[derive(Debug)]
pub struct SportsClient {
    http: Client,
    base_url: String,
    cache: TtlCache<TrackedTeam, GameSnapshot>,
}

impl SportsClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL, SPORTS_TTL)
    }

    pub fn with_base_url(base_url: impl Into<String>, ttl: Duration) -> Result<Self, FetchError> {
        Ok(Self { http: build_client()?, base_url: base_url.into(), cache: TtlCache::new(ttl) })
    }

    /// Latest result and next fixture for `team` in the league's current scoreboard.
    ///
    /// A team with no games in the window comes back as [`GameStatus::Offseason`],
    /// not as an error.
    #[instrument(skip(self, team), fields(team = team.name))]
    pub async fn team_snapshot(&self, team: TrackedTeam) -> Result<GameSnapshot, FetchError> {
        self.cache.get_or_fetch(team, || self.fetch_snapshot(team)).await
    }

    async fn fetch_snapshot(&self, team: TrackedTeam) -> Result<GameSnapshot, FetchError> {
        let url =
            format!("{}/{}/scoreboard", self.base_url.trim_end_matches('/'), team.league.path());
        let scoreboard: Scoreboard = fetch_json(self.http.get(url), "ESPN scoreboard").await?;

        let snapshot = snapshot_from_events(&scoreboard.events, team.name);
        if snapshot.status == GameStatus::Offseason {
            tracing::debug!("no games in the scoreboard window");
        }
        Ok(snapshot)
    }
}

fn snapshot_from_events(events: &[Event], team_name: &str) -> GameSnapshot {
    let mut completed: Vec<(DateTime<Utc>, &Event, &Competition)> = Vec::new();
    let mut upcoming: Vec<(DateTime<Utc>, &Event, &Competition)> = Vec::new();

    for event in events {
        let Some(competition) = event.competitions.first() else { continue };
        if !competition.competitors.iter().any(|c| c.is_team(team_name)) {
            continue;
        }
        let Some(date) = event.date.as_deref().and_then(parse_espn_date) else { continue };

        if event.is_final() {
            completed.push((date, event, competition));
        } else {
            upcoming.push((date, event, competition));
        }
    }

    let recent = completed.into_iter().max_by_key(|(date, ..)| *date).and_then(
        |(date, event, competition)| {
            let ours = competition.competitors.iter().find(|c| c.is_team(team_name))?;
            let theirs = competition.competitors.iter().find(|c| !c.is_team(team_name));
            Some(RecentGame {
                name: event.display_name(),
                opponent: theirs
                    .map(Competitor::display_name)
                    .unwrap_or_else(|| "Unknown".to_string()),
                team_score: ours.score_text(),
                opponent_score: theirs
                    .map(Competitor::score_text)
                    .unwrap_or_else(|| "0".to_string()),
                date,
            })
        },
    );

    let next = upcoming.into_iter().min_by_key(|(date, ..)| *date).map(
        |(date, event, competition)| UpcomingGame {
            name: event.display_name(),
            opponent: competition
                .competitors
                .iter()
                .find(|c| !c.is_team(team_name))
                .map(Competitor::display_name)
                .unwrap_or_else(|| "TBD".to_string()),
            date,
        },
    );

    let status = match (&recent, &next) {
        (_, Some(_)) => GameStatus::Scheduled,
        (Some(_), None) => GameStatus::Completed,
        (None, None) => GameStatus::Offseason,
    };

    GameSnapshot { team: team_name.to_string(), recent, next, status }
}

/// ESPN dates are minute precision (`2024-09-08T17:00Z`); full RFC 3339 is accepted too.
fn parse_espn_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ").ok().map(|dt| dt.and_utc())
        })
}

#[derive(Debug, Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    name: Option<String>,
    date: Option<String>,
    #[serde(default)]
    competitions: Vec<Competition>,
    status: Option<EventStatus>,
}

impl Event {
    fn is_final(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.kind.state == "post")
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "Game".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct EventStatus {
    #[serde(rename = "type")]
    kind: StatusType,
}

#[derive(Debug, Deserialize)]
struct StatusType {
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    team: Option<TeamRef>,
    #[serde(default)]
    score: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamRef {
    display_name: Option<String>,
}

impl Competitor {
    fn is_team(&self, name: &str) -> bool {
        self.team.as_ref().and_then(|t| t.display_name.as_deref()) == Some(name)
    }

    fn display_name(&self) -> String {
        self.team
            .as_ref()
            .and_then(|t| t.display_name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Scoreboards send the score as a string; other ESPN feeds use a number
    /// or an object with `displayValue`.
    fn score_text(&self) -> String {
        match &self.score {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Object(obj)) => obj
                .get("displayValue")
                .and_then(|v| v.as_str())
                .unwrap_or("0")
                .to_string(),
            _ => "0".to_string(),
        }
    }
}
