use chrono::Duration;
use log::{error, info, warn};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    db::account::NewAccount,
    mongodb::{ensure_counters_exist, ensure_indexes_exist, Coll},
    store::{AccountStore, MongoStore, Store},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    session_ttl: u32,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Lifetime of the anonymous session cookie in seconds.
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl.into())
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // non-secrets
    #[serde(default = "default_db_name")]
    db_name: String,
    admin_username: Option<String>,
    // secrets
    db_uri: String,
    admin_password: Option<String>,
}

fn default_db_name() -> String {
    "election".to_string()
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places a MongoDB-backed [`Store`] into
/// managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(&config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&config.db_name);

        // Ensure the required indexes and ID counters exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to create database indexes: {e}");
            return Err(rocket);
        }
        if let Err(e) = ensure_counters_exist(&Coll::from_db(&db)).await {
            error!("Failed to create ID counters: {e}");
            return Err(rocket);
        }

        // Ensure somebody can see the results.
        let store = Store::new(MongoStore::from_db(&db));
        if let Err(e) = ensure_admin_exists(&*store, &config).await {
            error!("Failed to bootstrap administrator: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(store);
        Ok(rocket)
    }
}

/// Create the configured administrator if there are no administrators yet.
///
/// This operation is idempotent.
async fn ensure_admin_exists<S>(accounts: &S, config: &DbConfig) -> Result<()>
where
    S: AccountStore + ?Sized,
{
    if accounts.any_admin_exists().await? {
        return Ok(());
    }
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        warn!("No administrator exists and none is configured; results will be unviewable");
        return Ok(());
    };
    match accounts
        .create_account(NewAccount::new(username.as_str(), password, true, true)?)
        .await
    {
        Ok(admin) => {
            info!("Created administrator '{}'", admin.username);
            Ok(())
        }
        Err(Error::Duplicate(_)) => {
            warn!("Configured administrator '{username}' exists without admin rights");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
