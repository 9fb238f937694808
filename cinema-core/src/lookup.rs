use chrono::{DateTime, Utc};
use cinema_shared::{Cinema, Movie, MovieSession, SessionDetails};

/// Anything addressable by a numeric backend id
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for Movie {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Cinema {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for MovieSession {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for SessionDetails {
    fn id(&self) -> i64 {
        self.id
    }
}

pub fn find_by_id<T: Identified>(items: &[T], id: i64) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

fn movie_for_session<'a>(
    session_id: i64,
    movies: &'a [Movie],
    sessions: &[MovieSession],
) -> Option<&'a Movie> {
    let session = find_by_id(sessions, session_id)?;
    find_by_id(movies, session.movie_id)
}

fn cinema_for_session<'a>(
    session_id: i64,
    cinemas: &'a [Cinema],
    sessions: &[MovieSession],
) -> Option<&'a Cinema> {
    let session = find_by_id(sessions, session_id)?;
    find_by_id(cinemas, session.cinema_id)
}

pub fn movie_title<'a>(session_id: i64, movies: &'a [Movie], sessions: &[MovieSession]) -> Option<&'a str> {
    movie_for_session(session_id, movies, sessions).map(|m| m.title.as_str())
}

pub fn movie_poster<'a>(session_id: i64, movies: &'a [Movie], sessions: &[MovieSession]) -> Option<&'a str> {
    movie_for_session(session_id, movies, sessions).map(|m| m.poster_image.as_str())
}

pub fn cinema_name<'a>(session_id: i64, cinemas: &'a [Cinema], sessions: &[MovieSession]) -> Option<&'a str> {
    cinema_for_session(session_id, cinemas, sessions).map(|c| c.name.as_str())
}

pub fn cinema_address<'a>(session_id: i64, cinemas: &'a [Cinema], sessions: &[MovieSession]) -> Option<&'a str> {
    cinema_for_session(session_id, cinemas, sessions).map(|c| c.address.as_str())
}

pub fn session_start_time(session_id: i64, sessions: &[MovieSession]) -> Option<DateTime<Utc>> {
    find_by_id(sessions, session_id).map(|s| s.start_time)
}
