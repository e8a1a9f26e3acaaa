//! Page composition: one independent result per dashboard section.

use crate::{
    config::{CHARLOTTE, Config, NEWS_COUNTRY, NEWS_LIMIT, TIMEZONE},
    error::{FetchError, StoreError},
    model::{AirQuality, CurrentConditions, Forecast, GameSnapshot, GroceryItem, Headline, TodoItem},
    news::NewsClient,
    sports::{SportsClient, TRACKED_TEAMS, TrackedTeam},
    store::{Grocery, ListStore, Todo},
    weather::WeatherClient,
};

#[derive(Debug)]
pub struct WeatherSection {
    pub current: Result<CurrentConditions, FetchError>,
    pub forecast: Result<Forecast, FetchError>,
    pub air: Result<AirQuality, FetchError>,
}

#[derive(Debug)]
pub struct NewsSection {
    pub headlines: Result<Vec<Headline>, FetchError>,
}

#[derive(Debug)]
pub struct SportsSection {
    pub teams: Vec<(TrackedTeam, Result<GameSnapshot, FetchError>)>,
}

#[derive(Debug)]
pub struct ListsSection {
    pub grocery: Result<Vec<GroceryItem>, StoreError>,
    pub todo: Result<Vec<TodoItem>, StoreError>,
}

#[derive(Debug)]
pub struct Dashboard {
    weather: WeatherClient,
    news: NewsClient,
    sports: SportsClient,
    store: ListStore,
}

impl Dashboard {
    pub fn new(
        weather: WeatherClient,
        news: NewsClient,
        sports: SportsClient,
        store: ListStore,
    ) -> Self {
        Self { weather, news, sports, store }
    }

    /// Production clients, with the news credential resolved from `config`.
    pub fn from_config(config: &Config, store: ListStore) -> Result<Self, FetchError> {
        Ok(Self::new(
            WeatherClient::new()?,
            NewsClient::new(config.news_api_key())?,
            SportsClient::new()?,
            store,
        ))
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    pub async fn weather(&self) -> WeatherSection {
        WeatherSection {
            current: self.weather.current_conditions(CHARLOTTE).await,
            forecast: self.weather.forecast(CHARLOTTE, TIMEZONE).await,
            air: self.weather.air_quality(CHARLOTTE).await,
        }
    }

    pub async fn news(&self) -> NewsSection {
        NewsSection { headlines: self.news.top_headlines(NEWS_COUNTRY, NEWS_LIMIT).await }
    }

    pub async fn sports(&self) -> SportsSection {
        let mut teams = Vec::with_capacity(TRACKED_TEAMS.len());
        for team in TRACKED_TEAMS {
            teams.push((team, self.sports.team_snapshot(team).await));
        }
        SportsSection { teams }
    }

    pub fn lists(&self) -> ListsSection {
        ListsSection { grocery: self.store.load::<Grocery>(), todo: self.store.load::<Todo>() }
    }
}
