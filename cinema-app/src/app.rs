//! Command handlers: one page of the booking flow per subcommand.

use chrono::{FixedOffset, Local};
use cinema_core::countdown::{format_countdown, remaining_seconds};
use cinema_core::format::{
    format_cinema_name, format_date_time, format_duration, format_tickets, format_time, image_url,
};
use cinema_core::schedule::{group_by_date, group_by_date_and_cinema};
use cinema_core::{ApiError, BookingStage, SeatGrid, SeatState};
use cinema_shared::{Booking, Cinema, Movie, MovieSession, Seat};
use cinema_store::RootStore;
use comfy_table::{presets::UTF8_FULL, Table};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::Command;
use crate::error::AppError;
use crate::loader::DataLoader;
use crate::notifications::{Notification, NotificationCenter};
use crate::router::{Route, Router};
use crate::timer::PaymentTimer;

/// The client: stores, navigation and notifications behind the CLI
pub struct App {
    root: Arc<RootStore>,
    router: Router,
    notifications: Arc<NotificationCenter>,
    json: bool,
    tz: FixedOffset,
}

impl App {
    pub fn new(root: Arc<RootStore>, json: bool) -> Self {
        let tz = *Local::now().offset();
        Self::with_timezone(root, json, tz)
    }

    /// Render times in `tz` instead of the local offset
    pub fn with_timezone(root: Arc<RootStore>, json: bool, tz: FixedOffset) -> Self {
        let router = Router::new(root.auth.clone(), root.location.clone());
        Self {
            root,
            router,
            notifications: Arc::new(NotificationCenter::new()),
            json,
            tz,
        }
    }

    pub fn root(&self) -> &Arc<RootStore> {
        &self.root
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    /// Take every pending notification, oldest first
    pub fn drain_notifications(&self) -> Vec<Notification> {
        let pending = self.notifications.list();
        for notification in &pending {
            self.notifications.remove(notification.id);
        }
        pending
    }

    /// Whether a 401 sent the client back to the login page
    pub fn needs_login(&self) -> bool {
        self.root.location.redirect_count() > 0
    }

    pub async fn run(&self, command: Command, out: &mut dyn Write) -> Result<(), AppError> {
        self.root.auth.restore_token().await;

        let result = match command {
            Command::Movies => self.movies(out).await,
            Command::Movie { id } => self.movie(id, out).await,
            Command::Cinemas => self.cinemas(out).await,
            Command::Cinema { id } => self.cinema(id, out).await,
            Command::Session { id } => self.session(id, out).await,
            Command::Book(args) => self.book(args.session, &args.seats, out).await,
            Command::Bookings => self.bookings(out).await,
            Command::Pay { booking } => self.pay(&booking, out).await,
            Command::Countdown { booking } => self.countdown(&booking, out).await,
            Command::Login(args) => self.login(&args.username, &args.password, out).await,
            Command::Register(args) => {
                self.register(&args.username, &args.password, &args.confirmation, out)
                    .await
            }
            Command::Logout => self.logout(out).await,
        };

        match result {
            Err(e) if e.is_cancelled() => {
                debug!("Command superseded by a newer request");
                Ok(())
            }
            other => other,
        }
    }

    async fn movies(&self, out: &mut dyn Write) -> Result<(), AppError> {
        self.router.navigate(&Route::Movies.path()).await?;
        let movies = self.root.movies.fetch_movies(false).await?;

        if self.json {
            return self.print_json(out, &movies);
        }

        let mut table = new_table(["ID", "Название", "Год", "Рейтинг", "Длительность", "Постер"]);
        for movie in &movies {
            table.add_row(vec![
                movie.id.to_string(),
                movie.title.clone(),
                movie.year.to_string(),
                format!("{:.1}", movie.rating),
                format_duration(movie.length_minutes),
                image_url(self.root.base_url(), &movie.poster_image),
            ]);
        }
        writeln!(out, "{table}")?;
        Ok(())
    }

    async fn movie(&self, id: i64, out: &mut dyn Write) -> Result<(), AppError> {
        self.router.navigate(&Route::MovieDetail(id).path()).await?;
        let (detail, cinemas) = tokio::try_join!(
            self.root.movies.load_movie_detail(id),
            self.root.cinemas.fetch_cinemas(false),
        )?;
        let movie = detail.movie.ok_or(AppError::MovieNotFound(id))?;
        let now = self.root.clock.now();

        if self.json {
            let upcoming: Vec<_> = detail.sessions.iter().filter(|s| s.start_time > now).collect();
            return self.print_json(out, &json!({ "movie": movie, "sessions": upcoming }));
        }

        write_movie_header(out, &movie)?;
        let days = group_by_date_and_cinema(&detail.sessions, now, &self.tz);
        if days.is_empty() {
            writeln!(out, "Нет ближайших сеансов")?;
        }
        for day in days {
            writeln!(out, "{}", day.date)?;
            for (cinema_id, sessions) in &day.cinemas {
                let name = self
                    .root
                    .movies
                    .cinema_name(*cinema_id, &cinemas)
                    .unwrap_or_else(|| format!("Кинотеатр {}", cinema_id));
                writeln!(out, "  {}: {}", name, self.session_times(sessions))?;
            }
        }
        Ok(())
    }

    async fn cinemas(&self, out: &mut dyn Write) -> Result<(), AppError> {
        self.router.navigate(&Route::Cinemas.path()).await?;
        let cinemas = self.root.cinemas.fetch_cinemas(false).await?;

        if self.json {
            return self.print_json(out, &cinemas);
        }

        let mut table = new_table(["ID", "Название", "Адрес"]);
        for cinema in &cinemas {
            table.add_row(vec![
                cinema.id.to_string(),
                format_cinema_name(&cinema.name),
                cinema.address.clone(),
            ]);
        }
        writeln!(out, "{table}")?;
        Ok(())
    }

    async fn cinema(&self, id: i64, out: &mut dyn Write) -> Result<(), AppError> {
        self.router.navigate(&Route::CinemaDetail(id).path()).await?;

        let root = self.root.clone();
        let loader = DataLoader::new(move || {
            let root = root.clone();
            async move {
                tokio::try_join!(root.cinemas.load_cinema_detail(id), root.movies.fetch_movies(false))
            }
        });
        let (detail, movies) = loader.load(false).await?;
        let cinema = detail.cinema.ok_or(AppError::CinemaNotFound(id))?;
        let now = self.root.clock.now();

        if self.json {
            let upcoming: Vec<_> = detail.sessions.iter().filter(|s| s.start_time > now).collect();
            return self.print_json(out, &json!({ "cinema": cinema, "sessions": upcoming }));
        }

        writeln!(out, "{}", format_cinema_name(&cinema.name))?;
        writeln!(out, "{}", cinema.address)?;
        writeln!(out)?;

        let days = group_by_date(&detail.sessions, &movies, now, &self.tz);
        if days.is_empty() {
            writeln!(out, "Нет ближайших сеансов")?;
        }
        for day in days {
            writeln!(out, "{}", day.date)?;
            for group in &day.movies {
                writeln!(out, "  {}: {}", group.movie.title, self.session_times(&group.sessions))?;
            }
        }
        Ok(())
    }

    async fn session(&self, id: i64, out: &mut dyn Write) -> Result<(), AppError> {
        self.router.navigate(&Route::Booking(id).path()).await?;
        let details = self
            .root
            .sessions
            .load_session_for_booking(id)
            .await?
            .ok_or(ApiError::Cancelled)?;

        if self.json {
            return self.print_json(out, &details);
        }

        let (movies, cinemas) = tokio::try_join!(
            self.root.movies.fetch_movies(false),
            self.root.cinemas.fetch_cinemas(false),
        )?;
        let grid = SeatGrid::for_session(&details)?;
        let start = details.start_time.with_timezone(&self.tz);

        let sessions = &self.root.sessions;
        writeln!(
            out,
            "{}",
            sessions
                .movie_title(details.movie_id, &movies)
                .unwrap_or_else(|| format!("Фильм {}", details.movie_id))
        )?;
        if let Some(name) = sessions.cinema_name(details.cinema_id, &cinemas) {
            let address = sessions
                .cinema_address(details.cinema_id, &cinemas)
                .unwrap_or_default();
            writeln!(out, "{}, {}", name, address)?;
        }
        writeln!(out, "{}", format_date_time(&start))?;
        writeln!(out)?;
        write_seat_map(out, &grid)?;
        Ok(())
    }

    async fn book(&self, session_id: i64, seats: &[Seat], out: &mut dyn Write) -> Result<(), AppError> {
        self.router.navigate(&Route::Booking(session_id).path()).await?;
        let details = self
            .root
            .sessions
            .load_session_for_booking(session_id)
            .await?
            .ok_or(ApiError::Cancelled)?;

        let mut grid = SeatGrid::for_session(&details)?;
        for &seat in seats {
            if grid.state(seat) == Some(SeatState::Selected) {
                continue;
            }
            if grid.toggle(seat)?.is_none() {
                return Err(AppError::SeatTaken(seat));
            }
        }

        let selection = grid.selection().to_vec();
        let booking_id = self.root.sessions.create_booking(session_id, &selection).await?;
        // Next `bookings` call must see the new one
        self.root.bookings.clear().await;

        let tickets = format_tickets(selection.len() as u64);
        self.notifications
            .success(format!("Забронировано {}, оплатите бронирование", tickets));

        if self.json {
            return self.print_json(out, &json!({ "id": booking_id, "seats": selection }));
        }
        writeln!(out, "Бронирование {}: {}", booking_id, tickets)?;
        Ok(())
    }

    async fn bookings(&self, out: &mut dyn Write) -> Result<(), AppError> {
        if self.router.navigate(&Route::MyBookings.path()).await? == Route::Login {
            return Err(AppError::AuthenticationRequired);
        }

        let (_, movies, cinemas) = tokio::try_join!(
            self.root.bookings.initialize_bookings_page(),
            self.root.movies.fetch_movies(false),
            self.root.cinemas.fetch_cinemas(false),
        )?;

        let expired = self.root.bookings.purge_expired().await;
        if !expired.is_empty() {
            info!(count = expired.len(), "Dropped expired unpaid bookings");
            self.notifications.warning(format!(
                "Время оплаты истекло: {}",
                expired.join(", ")
            ));
        }

        let unpaid = self.root.bookings.unpaid_bookings().await;
        let upcoming = self.root.bookings.upcoming_bookings().await;
        let past = self.root.bookings.past_bookings().await;

        if self.json {
            return self.print_json(
                out,
                &json!({ "unpaid": unpaid, "upcoming": upcoming, "past": past }),
            );
        }

        let window = self.root.bookings.payment_time_seconds().await;
        let now = self.root.clock.now();

        writeln!(out, "Неоплаченные")?;
        self.write_bookings(out, &unpaid, &movies, &cinemas, |b| {
            format!(
                "осталось {}",
                format_countdown(remaining_seconds(b.booked_at, window, now))
            )
        })
        .await?;

        writeln!(out, "Будущие")?;
        self.write_bookings(out, &upcoming, &movies, &cinemas, |_| "оплачено".to_string())
            .await?;

        writeln!(out, "Прошедшие")?;
        self.write_bookings(out, &past, &movies, &cinemas, |_| "сеанс прошёл".to_string())
            .await?;
        Ok(())
    }

    async fn write_bookings(
        &self,
        out: &mut dyn Write,
        bookings: &[Booking],
        movies: &[Movie],
        cinemas: &[Cinema],
        status: impl Fn(&Booking) -> String,
    ) -> Result<(), AppError> {
        if bookings.is_empty() {
            writeln!(out, "  нет")?;
            return Ok(());
        }

        let store = &self.root.bookings;
        for booking in bookings {
            let session_id = booking.movie_session_id;
            let title = store
                .movie_title(session_id, movies)
                .await
                .unwrap_or_else(|| format!("Сеанс {}", session_id));
            let cinema = store.cinema_name(session_id, cinemas).await.unwrap_or_default();
            let start = store
                .session_start_time(session_id)
                .await
                .map(|t| format_date_time(&t.with_timezone(&self.tz)))
                .unwrap_or_default();
            let seats: Vec<String> = booking
                .seats
                .iter()
                .map(|s| format!("{}:{}", s.row_number, s.seat_number))
                .collect();

            writeln!(
                out,
                "  {}  {}  {}  {}  {}  [{}]  {}",
                booking.id,
                title,
                cinema,
                start,
                format_tickets(booking.seats.len() as u64),
                seats.join(" "),
                status(booking)
            )?;
        }
        Ok(())
    }

    async fn pay(&self, booking_id: &str, out: &mut dyn Write) -> Result<(), AppError> {
        let booking = self.find_booking(booking_id).await?;
        if self.root.bookings.stage_of(&booking).await == BookingStage::Expired {
            self.root.bookings.remove_booking(booking_id).await;
            return Err(AppError::PaymentWindowClosed(booking_id.to_string()));
        }

        self.root.bookings.pay_booking(booking_id).await?;
        self.notifications.success("Бронирование оплачено");

        if self.json {
            return self.print_json(out, &json!({ "id": booking_id, "paid": true }));
        }
        writeln!(out, "Бронирование {} оплачено", booking_id)?;
        Ok(())
    }

    async fn countdown(&self, booking_id: &str, out: &mut dyn Write) -> Result<(), AppError> {
        let booking = self.find_booking(booking_id).await?;
        if booking.is_paid {
            writeln!(out, "Бронирование {} уже оплачено", booking_id)?;
            return Ok(());
        }

        let window = self.root.bookings.payment_time_seconds().await;
        let timer = PaymentTimer::start(booking.booked_at, window, self.root.clock.clone());
        let mut updates = timer.subscribe();
        let first = updates.borrow_and_update().clone();
        writeln!(out, "{}", first)?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut last = first;
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    last = updates.borrow_and_update().clone();
                    writeln!(out, "{}", last)?;
                }
                _ = &mut ctrl_c => {
                    debug!(booking_id, "Countdown interrupted");
                    return Ok(());
                }
            }
        }

        if last == format_countdown(0) {
            self.root.bookings.remove_booking(booking_id).await;
            self.notifications.warning("Время оплаты истекло");
            return Err(AppError::PaymentWindowClosed(booking_id.to_string()));
        }
        Ok(())
    }

    async fn login(&self, username: &str, password: &str, out: &mut dyn Write) -> Result<(), AppError> {
        self.router.navigate(&Route::Login.path()).await?;
        self.root.account.login(username, password).await?;
        self.root.bookings.clear().await;
        self.notifications.success("Вы вошли в систему");
        writeln!(out, "Вход выполнен: {}", username)?;
        Ok(())
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        self.router.navigate(&Route::Register.path()).await?;
        self.root.account.register(username, password, confirmation).await?;
        self.notifications.success("Регистрация прошла успешно");
        writeln!(out, "Аккаунт создан: {}", username)?;
        Ok(())
    }

    async fn logout(&self, out: &mut dyn Write) -> Result<(), AppError> {
        self.root.logout().await;
        self.router.navigate(&Route::Movies.path()).await?;
        self.notifications.info("Вы вышли из системы");
        writeln!(out, "Выход выполнен")?;
        Ok(())
    }

    async fn find_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        if self.router.navigate(&Route::MyBookings.path()).await? == Route::Login {
            return Err(AppError::AuthenticationRequired);
        }
        self.root.bookings.load_all_data().await?;
        self.root
            .bookings
            .bookings()
            .await
            .into_iter()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))
    }

    fn session_times(&self, sessions: &[MovieSession]) -> String {
        sessions
            .iter()
            .map(|s| format!("{} (#{})", format_time(&s.start_time.with_timezone(&self.tz)), s.id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_json<T: serde::Serialize + ?Sized>(&self, out: &mut dyn Write, value: &T) -> Result<(), AppError> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
        Ok(())
    }
}

fn new_table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn write_movie_header(out: &mut dyn Write, movie: &Movie) -> std::io::Result<()> {
    writeln!(out, "{} ({})", movie.title, movie.year)?;
    writeln!(out, "Рейтинг {:.1}, {}", movie.rating, format_duration(movie.length_minutes))?;
    if !movie.description.is_empty() {
        writeln!(out, "{}", movie.description)?;
    }
    writeln!(out)
}

/// `.` free, `X` booked, `*` selected; rows numbered on the left
fn write_seat_map(out: &mut dyn Write, grid: &SeatGrid) -> std::io::Result<()> {
    let layout = grid.layout();
    let width = layout.rows.to_string().len();
    for row in 1..=layout.rows {
        let cells: String = grid
            .row(row)
            .map(|(_, state)| match state {
                SeatState::Available => '.',
                SeatState::Booked => 'X',
                SeatState::Selected => '*',
            })
            .collect();
        writeln!(out, "{:>width$} {}", row, cells, width = width)?;
    }
    writeln!(out, "Экран")
}
