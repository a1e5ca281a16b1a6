#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

#[cfg(test)]
#[macro_use]
extern crate db_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

/// Assemble the production server: configuration, database and request
/// logging are all attached as fairings and resolved on ignition.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
}

/// Assemble a server around an already-constructed store, skipping the
/// database fairing entirely.
#[cfg(test)]
pub(crate) fn rocket_for_store(store: model::store::Store) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(config::ConfigFairing)
        .manage(store)
}

/// Connect to the configured MongoDB server and set up a uniquely named,
/// empty database with all indexes and counters in place.
#[cfg(test)]
pub(crate) async fn database_for_test() -> mongodb::Database {
    use crate::model::{
        auth::SessionId,
        mongodb::{ensure_counters_exist, ensure_indexes_exist, Coll},
    };

    let db_uri: String = rocket::Config::figment().extract_inner("db_uri").unwrap();
    let client = mongodb::Client::with_uri_str(&db_uri).await.unwrap();
    let db = client.database(&format!("election_test_{}", SessionId::generate()));
    ensure_indexes_exist(&db).await.unwrap();
    ensure_counters_exist(&Coll::from_db(&db)).await.unwrap();
    db
}
