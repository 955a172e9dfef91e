use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single screening slot. Both times are pre-formatted by the backend
/// (e.g. "18:00"); no timezone or duration arithmetic happens client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Showtime {
    pub start: String,
    pub end: String,
}

/// One movie's metadata plus its showtimes at a given venue on the
/// selected date.
///
/// Everything except the title is optional in the backend payload: the
/// scraper does not always find genres, actors, a release date or a poster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Film {
    pub title: String,
    #[serde(default)]
    pub director: String,
    /// Pre-formatted duration string, e.g. "1h 45min".
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// ISO date string ("YYYY-MM-DD"); only the year is displayed.
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub showtimes: Vec<Showtime>,
}

impl Film {
    /// The release year, derived from the leading `YYYY` of `release_date`.
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

/// The full day's film listings across all venues for one date,
/// keyed by venue display name.
pub type Schedule = HashMap<String, Vec<Film>>;

/// Response envelope for `GET /cinemas`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CinemasResponse {
    pub cinemas: Vec<String>,
}

/// Response envelope for `GET /showtimes?date=YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ShowtimesResponse {
    pub showtimes: Schedule,
}
