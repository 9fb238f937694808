//! Grouping of upcoming sessions for the movie and cinema pages.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use cinema_shared::{DateGroup, Movie, MovieSession, MovieWithSessions};
use std::collections::BTreeMap;

use crate::format::format_date;
use crate::lookup::find_by_id;

/// Sessions of one calendar day, grouped per cinema
#[derive(Debug, Clone, PartialEq)]
pub struct CinemaDay {
    pub date: String,
    pub day: NaiveDate,
    pub cinemas: BTreeMap<i64, Vec<MovieSession>>,
}

/// Future sessions grouped by day (ascending) and then by movie.
///
/// Movies keep first-seen order within a day, sessions are sorted by start
/// time. Sessions whose movie is unknown are skipped.
pub fn group_by_date<Tz: TimeZone>(
    sessions: &[MovieSession],
    movies: &[Movie],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<DateGroup> {
    let mut days: BTreeMap<NaiveDate, (String, Vec<MovieWithSessions>)> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.start_time > now) {
        let Some(movie) = find_by_id(movies, session.movie_id) else {
            continue;
        };
        let local = session.start_time.with_timezone(tz);
        let (_, movie_groups) = days
            .entry(local.date_naive())
            .or_insert_with(|| (format_date(&local), Vec::new()));

        match movie_groups.iter_mut().find(|g| g.movie.id == movie.id) {
            Some(group) => group.sessions.push(session.clone()),
            None => movie_groups.push(MovieWithSessions {
                movie: movie.clone(),
                sessions: vec![session.clone()],
            }),
        }
    }

    days.into_iter()
        .map(|(day, (date, mut movies))| {
            for group in &mut movies {
                group.sessions.sort_by_key(|s| s.start_time);
            }
            DateGroup { date, day, movies }
        })
        .collect()
}

/// Future sessions grouped by day (ascending) and then by cinema id
pub fn group_by_date_and_cinema<Tz: TimeZone>(
    sessions: &[MovieSession],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<CinemaDay> {
    let mut days: BTreeMap<NaiveDate, CinemaDay> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.start_time > now) {
        let local = session.start_time.with_timezone(tz);
        let day = local.date_naive();
        days.entry(day)
            .or_insert_with(|| CinemaDay {
                date: format_date(&local),
                day,
                cinemas: BTreeMap::new(),
            })
            .cinemas
            .entry(session.cinema_id)
            .or_default()
            .push(session.clone());
    }

    days.into_values().collect()
}
