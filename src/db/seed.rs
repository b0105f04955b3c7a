//! Demo catalog and account seeding
//!
//! Populates an empty database with the demo station/train catalog and the
//! two demo accounts. Demo credentials go through the same bcrypt hashing
//! and login path as every other account; there is no login short-circuit.

use crate::auth::password::hash_password;
use crate::core::error::Result;
use crate::db::models::{Station, Train, TrainClass, User};
use crate::db::repository::{Repository, StationRepository, TrainRepository, UserRepository};
use tracing::info;

const ALL_DAYS: &str = "Mon,Tue,Wed,Thu,Fri,Sat,Sun";

fn demo_stations() -> Vec<Station> {
    let rows = [
        ("NDLS", "New Delhi", "Delhi"),
        ("BCT", "Mumbai Central", "Mumbai"),
        ("HWH", "Howrah Junction", "Kolkata"),
        ("MAS", "Chennai Central", "Chennai"),
        ("SBC", "Bangalore City", "Bengaluru"),
        ("ADI", "Ahmedabad Junction", "Ahmedabad"),
        ("PUNE", "Pune Junction", "Pune"),
        ("JP", "Jaipur Junction", "Jaipur"),
        ("LKO", "Lucknow", "Lucknow"),
        ("HYB", "Hyderabad Deccan", "Hyderabad"),
    ];

    rows.iter()
        .map(|(code, name, city)| Station {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
        })
        .collect()
}

fn class(code: &str, name: &str, fare: i64, available_seats: i64) -> TrainClass {
    TrainClass {
        code: code.to_string(),
        name: name.to_string(),
        fare,
        available_seats,
    }
}

#[allow(clippy::too_many_arguments)]
fn train(
    id: &str,
    train_no: &str,
    name: &str,
    source: &str,
    destination: &str,
    departure_time: &str,
    arrival_time: &str,
    duration: &str,
    days: &str,
    classes: Vec<TrainClass>,
) -> Train {
    Train {
        id: id.to_string(),
        train_no: train_no.to_string(),
        name: name.to_string(),
        source: source.to_string(),
        destination: destination.to_string(),
        departure_time: departure_time.to_string(),
        arrival_time: arrival_time.to_string(),
        duration: duration.to_string(),
        days_of_operation: days.to_string(),
        classes,
    }
}

fn demo_trains() -> Vec<Train> {
    vec![
        train(
            "1", "12301", "Rajdhani Express", "NDLS", "HWH", "16:55", "10:00", "17h 05m", ALL_DAYS,
            vec![
                class("1A", "First AC", 4500, 12),
                class("2A", "Second AC", 2800, 45),
                class("3A", "Third AC", 1950, 120),
            ],
        ),
        train(
            "2", "12951", "Mumbai Rajdhani", "NDLS", "BCT", "16:35", "08:35", "16h 00m",
            "Mon,Wed,Fri,Sun",
            vec![
                class("1A", "First AC", 4200, 8),
                class("2A", "Second AC", 2500, 32),
                class("3A", "Third AC", 1750, 85),
            ],
        ),
        train(
            "3", "12259", "Duronto Express", "NDLS", "SBC", "20:10", "06:40", "34h 30m",
            "Tue,Thu,Sat",
            vec![
                class("1A", "First AC", 5200, 6),
                class("2A", "Second AC", 3200, 24),
                class("3A", "Third AC", 2200, 65),
                class("SL", "Sleeper", 850, 200),
            ],
        ),
        train(
            "4", "12627", "Karnataka Express", "NDLS", "SBC", "21:30", "06:20", "32h 50m", ALL_DAYS,
            vec![
                class("2A", "Second AC", 2900, 28),
                class("3A", "Third AC", 1980, 95),
                class("SL", "Sleeper", 750, 320),
            ],
        ),
        train(
            "5", "12431", "Trivandrum Rajdhani", "NDLS", "MAS", "10:55", "14:30", "27h 35m",
            "Mon,Thu,Sat",
            vec![
                class("1A", "First AC", 4800, 10),
                class("2A", "Second AC", 2950, 38),
                class("3A", "Third AC", 2050, 110),
            ],
        ),
        train(
            "6", "12002", "Shatabdi Express", "NDLS", "ADI", "06:00", "14:25", "8h 25m",
            "Mon,Tue,Wed,Thu,Fri,Sat",
            vec![
                class("CC", "Chair Car", 1450, 150),
                class("EC", "Exec. Chair Car", 2800, 45),
            ],
        ),
    ]
}

/// Seed the station/train catalog when the tables are empty
pub async fn seed_catalog(
    station_repo: &StationRepository,
    train_repo: &TrainRepository,
) -> Result<()> {
    if station_repo.count().await? == 0 {
        info!("No stations found, seeding demo stations...");
        for station in demo_stations() {
            station_repo.create(&station).await?;
        }
    }

    if train_repo.count().await? == 0 {
        info!("No trains found, seeding demo trains...");
        for train in demo_trains() {
            train_repo.create(&train).await?;
        }
    }

    Ok(())
}

/// Ensure the demo accounts exist as ordinary credential records
pub async fn seed_demo_accounts(user_repo: &UserRepository) -> Result<()> {
    let accounts = [
        ("Admin User", "admin@irctc.com", "admin123", "ADMIN"),
        ("Test User", "user@irctc.com", "user123", "USER"),
    ];

    for (name, email, password, role) in accounts {
        if user_repo.find_by_email(email).await?.is_none() {
            info!(email, role, "Seeding demo account");
            let user = User {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                role: role.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
            };
            user_repo.create(&user).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::manager::DatabaseManager;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_catalog_seed_is_idempotent() {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let stations = StationRepository::new(db.clone());
        let trains = TrainRepository::new(db);

        seed_catalog(&stations, &trains).await.unwrap();
        seed_catalog(&stations, &trains).await.unwrap();

        assert_eq!(stations.count().await.unwrap(), 10);
        assert_eq!(trains.count().await.unwrap(), 6);

        let rajdhani = trains.find_by_id("1").await.unwrap().unwrap();
        assert_eq!(rajdhani.classes.len(), 3);
    }

    #[tokio::test]
    async fn test_demo_accounts_seeded_with_hashed_passwords() {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let users = UserRepository::new(db);

        seed_demo_accounts(&users).await.unwrap();
        seed_demo_accounts(&users).await.unwrap();

        assert_eq!(users.count().await.unwrap(), 2);

        let admin = users.find_by_email("admin@irctc.com").await.unwrap().unwrap();
        assert_eq!(admin.role, "ADMIN");
        // Stored hash, never the plaintext
        assert_ne!(admin.password_hash, "admin123");
        assert!(crate::auth::password::verify_password("admin123", &admin.password_hash).unwrap());
    }
}
