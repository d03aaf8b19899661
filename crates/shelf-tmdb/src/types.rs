// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TMDB v3 response types.

use serde::Deserialize;

/// `GET /search/movie`.
#[derive(Debug, Deserialize)]
pub struct MovieSearchPage {
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Empty string for unreleased titles.
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
}

/// `GET /movie/{id}?append_to_response=credits`.
#[derive(Debug, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub imdb_id: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub credits: Credits,
}

#[derive(Debug, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

impl MovieDetails {
    /// Crew members credited as director, in billing order, without duplicates.
    pub fn directors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for member in self.credits.crew.iter().filter(|m| m.job == "Director") {
            if !names.contains(&member.name.as_str()) {
                names.push(&member.name);
            }
        }
        names
    }
}

/// The four-digit year of a `YYYY-MM-DD` date.
pub fn release_year(date: Option<&str>) -> Option<String> {
    let date = date?.trim();
    let year = date.get(..4)?;
    year.chars()
        .all(|c| c.is_ascii_digit())
        .then(|| year.to_string())
}
