//! Repository pattern implementation for data access layer
//!
//! This module provides the Repository pattern for abstracting database operations.

use crate::core::error::{RailError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{Booking, PassengerRecord, Station, Train, TrainClass, User};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row};
use std::sync::Arc;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Find an entity by its ID
    async fn find_by_id(&self, id: &str) -> Result<Option<T>>;

    /// Find all entities
    async fn find_all(&self) -> Result<Vec<T>>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<()>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<()>;

    /// Delete an entity by its ID
    async fn delete(&self, id: &str) -> Result<()>;
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

/// Repository for User entities
pub struct UserRepository {
    db: Arc<DatabaseManager>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Find a user by email (login lookup)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                    [&email],
                    user_from_row,
                )
                .optional()
                .map_err(RailError::DatabaseError)
            })
            .await
    }

    /// Count all users
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
                    .map_err(RailError::DatabaseError)
            })
            .await
    }
}

#[async_trait]
impl Repository<User> for UserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                    [&id],
                    user_from_row,
                )
                .optional()
                .map_err(RailError::DatabaseError)
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM users ORDER BY created_at",
                        USER_COLUMNS
                    ))
                    .map_err(RailError::DatabaseError)?;

                let users = stmt
                    .query_map([], user_from_row)
                    .map_err(RailError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(RailError::DatabaseError)?;

                Ok(users)
            })
            .await
    }

    async fn create(&self, entity: &User) -> Result<()> {
        let user = entity.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, name, email, password_hash, role, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        user.id,
                        user.name,
                        user.email,
                        user.password_hash,
                        user.role,
                        user.created_at
                    ],
                )
                .map_err(RailError::DatabaseError)?;
                Ok(())
            })
            .await
    }

    async fn update(&self, entity: &User) -> Result<()> {
        let user = entity.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "UPDATE users SET name = ?2, email = ?3, password_hash = ?4, role = ?5 \
                     WHERE id = ?1",
                    rusqlite::params![
                        user.id,
                        user.name,
                        user.email,
                        user.password_hash,
                        user.role
                    ],
                )
                .map_err(RailError::DatabaseError)?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                conn.execute("DELETE FROM users WHERE id = ?", [&id])
                    .map_err(RailError::DatabaseError)?;
                Ok(())
            })
            .await
    }
}

/// Repository for Station entities
pub struct StationRepository {
    db: Arc<DatabaseManager>,
}

impl StationRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    pub async fn find_all(&self) -> Result<Vec<Station>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn
                    .prepare("SELECT code, name, city FROM stations ORDER BY code")
                    .map_err(RailError::DatabaseError)?;

                let stations = stmt
                    .query_map([], |row| {
                        Ok(Station {
                            code: row.get(0)?,
                            name: row.get(1)?,
                            city: row.get(2)?,
                        })
                    })
                    .map_err(RailError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(RailError::DatabaseError)?;

                Ok(stations)
            })
            .await
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Station>> {
        let code = code.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT code, name, city FROM stations WHERE code = ?",
                    [&code],
                    |row| {
                        Ok(Station {
                            code: row.get(0)?,
                            name: row.get(1)?,
                            city: row.get(2)?,
                        })
                    },
                )
                .optional()
                .map_err(RailError::DatabaseError)
            })
            .await
    }

    pub async fn create(&self, station: &Station) -> Result<()> {
        let station = station.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO stations (code, name, city) VALUES (?1, ?2, ?3)",
                    rusqlite::params![station.code, station.name, station.city],
                )
                .map_err(RailError::DatabaseError)?;
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, code: &str) -> Result<bool> {
        let code = code.to_string();
        self.db
            .execute(move |conn| {
                let affected = conn
                    .execute("DELETE FROM stations WHERE code = ?", [&code])
                    .map_err(RailError::DatabaseError)?;
                Ok(affected > 0)
            })
            .await
    }

    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM stations", [], |row| row.get(0))
                    .map_err(RailError::DatabaseError)
            })
            .await
    }
}

const TRAIN_COLUMNS: &str =
    "id, train_no, name, source, destination, departure_time, arrival_time, duration, days_of_operation";

fn train_from_row(row: &Row) -> rusqlite::Result<Train> {
    Ok(Train {
        id: row.get(0)?,
        train_no: row.get(1)?,
        name: row.get(2)?,
        source: row.get(3)?,
        destination: row.get(4)?,
        departure_time: row.get(5)?,
        arrival_time: row.get(6)?,
        duration: row.get(7)?,
        days_of_operation: row.get(8)?,
        classes: Vec::new(),
    })
}

fn load_train_classes(conn: &Connection, train_id: &str) -> Result<Vec<TrainClass>> {
    let mut stmt = conn
        .prepare(
            "SELECT code, name, fare, available_seats FROM train_classes \
             WHERE train_id = ? ORDER BY fare DESC",
        )
        .map_err(RailError::DatabaseError)?;

    let classes = stmt
        .query_map([train_id], |row| {
            Ok(TrainClass {
                code: row.get(0)?,
                name: row.get(1)?,
                fare: row.get(2)?,
                available_seats: row.get(3)?,
            })
        })
        .map_err(RailError::DatabaseError)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(RailError::DatabaseError)?;

    Ok(classes)
}

/// Repository for Train entities with their seat classes
pub struct TrainRepository {
    db: Arc<DatabaseManager>,
}

impl TrainRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Train>> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                let train = conn
                    .query_row(
                        &format!("SELECT {} FROM trains WHERE id = ?", TRAIN_COLUMNS),
                        [&id],
                        train_from_row,
                    )
                    .optional()
                    .map_err(RailError::DatabaseError)?;

                match train {
                    Some(mut t) => {
                        t.classes = load_train_classes(conn, &t.id)?;
                        Ok(Some(t))
                    }
                    None => Ok(None),
                }
            })
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<Train>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM trains ORDER BY train_no",
                        TRAIN_COLUMNS
                    ))
                    .map_err(RailError::DatabaseError)?;

                let mut trains = stmt
                    .query_map([], train_from_row)
                    .map_err(RailError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(RailError::DatabaseError)?;

                for train in &mut trains {
                    train.classes = load_train_classes(conn, &train.id)?;
                }

                Ok(trains)
            })
            .await
    }

    /// Find trains running between two stations
    pub async fn find_by_route(&self, source: &str, destination: &str) -> Result<Vec<Train>> {
        let source = source.to_string();
        let destination = destination.to_string();
        self.db
            .execute(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM trains WHERE source = ? AND destination = ? \
                         ORDER BY departure_time",
                        TRAIN_COLUMNS
                    ))
                    .map_err(RailError::DatabaseError)?;

                let mut trains = stmt
                    .query_map([&source, &destination], train_from_row)
                    .map_err(RailError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(RailError::DatabaseError)?;

                for train in &mut trains {
                    train.classes = load_train_classes(conn, &train.id)?;
                }

                Ok(trains)
            })
            .await
    }

    /// Create a train together with its seat classes
    pub async fn create(&self, train: &Train) -> Result<()> {
        let train = train.clone();
        self.db
            .transaction(move |tx| {
                tx.execute(
                    "INSERT INTO trains (id, train_no, name, source, destination, \
                     departure_time, arrival_time, duration, days_of_operation) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    rusqlite::params![
                        train.id,
                        train.train_no,
                        train.name,
                        train.source,
                        train.destination,
                        train.departure_time,
                        train.arrival_time,
                        train.duration,
                        train.days_of_operation
                    ],
                )
                .map_err(RailError::DatabaseError)?;

                for class in &train.classes {
                    tx.execute(
                        "INSERT INTO train_classes (train_id, code, name, fare, available_seats) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        rusqlite::params![
                            train.id,
                            class.code,
                            class.name,
                            class.fare,
                            class.available_seats
                        ],
                    )
                    .map_err(RailError::DatabaseError)?;
                }

                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                let affected = conn
                    .execute("DELETE FROM trains WHERE id = ?", [&id])
                    .map_err(RailError::DatabaseError)?;
                Ok(affected > 0)
            })
            .await
    }

    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM trains", [], |row| row.get(0))
                    .map_err(RailError::DatabaseError)
            })
            .await
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, pnr, train_id, train_no, train_name, source, \
     destination, date, departure_time, arrival_time, class_code, total_fare, status, booked_at";

fn booking_from_row(row: &Row) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pnr: row.get(2)?,
        train_id: row.get(3)?,
        train_no: row.get(4)?,
        train_name: row.get(5)?,
        source: row.get(6)?,
        destination: row.get(7)?,
        date: row.get(8)?,
        departure_time: row.get(9)?,
        arrival_time: row.get(10)?,
        class_code: row.get(11)?,
        total_fare: row.get(12)?,
        status: row.get(13)?,
        booked_at: row.get(14)?,
        passengers: Vec::new(),
    })
}

fn load_passengers(conn: &Connection, booking_id: &str) -> Result<Vec<PassengerRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, booking_id, name, age, gender, berth_preference \
             FROM passengers WHERE booking_id = ?",
        )
        .map_err(RailError::DatabaseError)?;

    let passengers = stmt
        .query_map([booking_id], |row| {
            Ok(PassengerRecord {
                id: row.get(0)?,
                booking_id: row.get(1)?,
                name: row.get(2)?,
                age: row.get(3)?,
                gender: row.get(4)?,
                berth_preference: row.get(5)?,
            })
        })
        .map_err(RailError::DatabaseError)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(RailError::DatabaseError)?;

    Ok(passengers)
}

/// Repository for Booking entities with their passengers
pub struct BookingRepository {
    db: Arc<DatabaseManager>,
}

impl BookingRepository {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Create a booking and its passengers atomically
    pub async fn create(&self, booking: &Booking) -> Result<()> {
        let booking = booking.clone();
        self.db
            .transaction(move |tx| {
                tx.execute(
                    "INSERT INTO bookings (id, user_id, pnr, train_id, train_no, train_name, \
                     source, destination, date, departure_time, arrival_time, class_code, \
                     total_fare, status, booked_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    rusqlite::params![
                        booking.id,
                        booking.user_id,
                        booking.pnr,
                        booking.train_id,
                        booking.train_no,
                        booking.train_name,
                        booking.source,
                        booking.destination,
                        booking.date,
                        booking.departure_time,
                        booking.arrival_time,
                        booking.class_code,
                        booking.total_fare,
                        booking.status,
                        booking.booked_at
                    ],
                )
                .map_err(RailError::DatabaseError)?;

                for passenger in &booking.passengers {
                    tx.execute(
                        "INSERT INTO passengers (id, booking_id, name, age, gender, berth_preference) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        rusqlite::params![
                            passenger.id,
                            booking.id,
                            passenger.name,
                            passenger.age,
                            passenger.gender,
                            passenger.berth_preference
                        ],
                    )
                    .map_err(RailError::DatabaseError)?;
                }

                Ok(())
            })
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Booking>> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                let booking = conn
                    .query_row(
                        &format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS),
                        [&id],
                        booking_from_row,
                    )
                    .optional()
                    .map_err(RailError::DatabaseError)?;

                match booking {
                    Some(mut b) => {
                        b.passengers = load_passengers(conn, &b.id)?;
                        Ok(Some(b))
                    }
                    None => Ok(None),
                }
            })
            .await
    }

    /// Find all bookings placed by one user, newest first
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let user_id = user_id.to_string();
        self.db
            .execute(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM bookings WHERE user_id = ? ORDER BY booked_at DESC",
                        BOOKING_COLUMNS
                    ))
                    .map_err(RailError::DatabaseError)?;

                let mut bookings = stmt
                    .query_map([&user_id], booking_from_row)
                    .map_err(RailError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(RailError::DatabaseError)?;

                for booking in &mut bookings {
                    booking.passengers = load_passengers(conn, &booking.id)?;
                }

                Ok(bookings)
            })
            .await
    }

    /// Check whether a PNR is already taken
    pub async fn pnr_exists(&self, pnr: &str) -> Result<bool> {
        let pnr = pnr.to_string();
        self.db
            .execute(move |conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM bookings WHERE pnr = ?", [&pnr], |row| {
                        row.get(0)
                    })
                    .map_err(RailError::DatabaseError)?;
                Ok(count > 0)
            })
            .await
    }

    /// Set a booking's status in place
    pub async fn update_status(&self, id: &str, status: &str) -> Result<()> {
        let id = id.to_string();
        let status = status.to_string();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "UPDATE bookings SET status = ?2 WHERE id = ?1",
                    rusqlite::params![id, status],
                )
                .map_err(RailError::DatabaseError)?;
                Ok(())
            })
            .await
    }
}
