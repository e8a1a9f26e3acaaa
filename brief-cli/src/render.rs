//! Plain-text rendering of dashboard sections.
//!
//! Every section renders on its own; a failed fetch turns into an explanation
//! line in its place.

use brief_core::{
    FetchError, GameSnapshot, GameStatus, GroceryItem, ListsSection, NewsSection, SportsSection,
    TodoItem, TrackedTeam, WeatherSection,
};
use chrono::{DateTime, Local, NaiveDate, Utc};

const DASH: &str = "—";

pub fn header(today: NaiveDate) -> String {
    format!(
        "Charlotte Daily Family Brief\nToday is {}\n",
        today.format("%A, %B %d, %Y")
    )
}

pub fn weather(section: &WeatherSection) -> String {
    let mut lines = vec![title("Weather & Air")];

    match &section.current {
        Ok(now) => lines.push(format!(
            "Now: {:.0}°F, {}% humidity, {}",
            now.temperature_f, now.humidity_pct, now.condition
        )),
        Err(err) => lines.push(failed("Current conditions", err)),
    }

    lines.push(String::new());
    lines.push("7-Day Forecast".to_string());
    match &section.forecast {
        Ok(days) => lines.extend(days.iter().map(|day| {
            format!(
                "  {}  High {:>3}°F  Low {:>3}°F  {}",
                day.date.format("%a, %b %d"),
                degrees(day.high_f),
                degrees(day.low_f),
                day.condition
            )
        })),
        Err(err) => lines.push(failed("Forecast", err)),
    }

    lines.push(String::new());
    match &section.air {
        Ok(air) => {
            let category = air.category().map(|c| format!(" ({})", c.label())).unwrap_or_default();
            lines.push(format!(
                "Air quality: US AQI {}{category}, PM2.5 {}, PM10 {}",
                air.us_aqi.map(|aqi| aqi.to_string()).unwrap_or_else(|| DASH.to_string()),
                reading(air.pm2_5),
                reading(air.pm10),
            ));
        }
        Err(err) => lines.push(failed("Air quality", err)),
    }

    lines.push(
        "Tip: spring pollen can spike quickly here; on high-allergen days close windows early."
            .to_string(),
    );
    lines.join("\n")
}

pub fn news(section: &NewsSection) -> String {
    let mut lines = vec![title("Top U.S. Headlines")];

    match &section.headlines {
        Ok(headlines) => {
            for (idx, headline) in headlines.iter().enumerate() {
                let n = idx + 1;
                let heading = if headline.title.trim().is_empty() {
                    format!("Headline {n}")
                } else {
                    headline.title.clone()
                };
                lines.push(format!("{n:>2}. {heading}"));
                if let Some(description) = &headline.description {
                    lines.push(format!("    {description}"));
                }
                lines.push(format!(
                    "    {} | {}",
                    headline.source_name,
                    headline.published_at.map(local_time).unwrap_or_else(|| "Unknown".to_string())
                ));
                if !headline.url.is_empty() {
                    lines.push(format!("    {}", headline.url));
                }
            }
        }
        Err(err) => lines.push(failed("Headlines", err)),
    }

    lines.join("\n")
}

pub fn sports(section: &SportsSection) -> String {
    let mut lines = vec![title("Panthers & Hornets")];
    for (team, result) in &section.teams {
        lines.extend(team_block(team, result));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn team_block(team: &TrackedTeam, result: &Result<GameSnapshot, FetchError>) -> Vec<String> {
    let mut lines = vec![team.name.to_string()];

    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(err) => {
            lines.push(format!("  Scores unavailable: {}", err.user_message()));
            return lines;
        }
    };

    if snapshot.status == GameStatus::Offseason {
        lines.push("  No games on the current scoreboard (offseason or break).".to_string());
        return lines;
    }

    match &snapshot.recent {
        Some(game) => {
            lines.push(format!(
                "  Recent: {} {} - {} {}",
                snapshot.team, game.team_score, game.opponent_score, game.opponent
            ));
            lines.push(format!("  {} ({})", game.name, local_time(game.date)));
        }
        None => lines.push("  Recent: no recent game found".to_string()),
    }

    match &snapshot.next {
        Some(game) => {
            lines.push(format!("  Next: vs {} on {}", game.opponent, local_time(game.date)));
        }
        None => lines.push("  Next: no upcoming game found".to_string()),
    }

    lines
}

pub fn lists(section: &ListsSection) -> String {
    let mut lines = vec![title("Grocery & Todo")];

    match &section.grocery {
        Ok(items) => lines.push(grocery_list(items)),
        Err(err) => lines.push(format!("Grocery list: {}", err.user_message())),
    }
    lines.push(String::new());
    match &section.todo {
        Ok(items) => lines.push(todo_list(items)),
        Err(err) => lines.push(format!("Todo list: {}", err.user_message())),
    }

    lines.join("\n")
}

pub fn grocery_list(items: &[GroceryItem]) -> String {
    let mut lines = vec!["Grocery List".to_string()];
    if items.is_empty() {
        lines.push("  (empty)".to_string());
    }
    for (idx, item) in items.iter().enumerate() {
        let mut line = format!("  {:>2}. {}", idx + 1, item.item);
        if !item.quantity.is_empty() {
            line.push_str(&format!(" x {}", item.quantity));
        }
        if !item.notes.is_empty() {
            line.push_str(&format!(" ({})", item.notes));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn todo_list(items: &[TodoItem]) -> String {
    let mut lines = vec!["Family Todo".to_string()];
    if items.is_empty() {
        lines.push("  (nothing left to do)".to_string());
    }
    lines.extend(
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("  {:>2}. [ ] {}", idx + 1, item.task)),
    );
    lines.join("\n")
}

fn title(name: &str) -> String {
    format!("== {name} ==")
}

fn failed(what: &str, err: &FetchError) -> String {
    format!("{what}: {}", err.user_message())
}

fn reading(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| DASH.to_string())
}

fn degrees(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.0}")).unwrap_or_else(|| DASH.to_string())
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%a, %b %d at %I:%M %p").to_string()
}
