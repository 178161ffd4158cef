use crate::error::{env_error, CoreResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;

/// Default database name
pub const DEFAULT_DATABASE: &str = "aikataulu";

/// Main configuration structure for the scheduling core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Connection string for the document store
    pub store_url: String,
    /// Database name within the store
    pub database: String,
    /// Collection name for event documents
    pub events_collection: String,
    /// Collection name for participant documents
    pub participants_collection: String,
    /// Collection name for user documents
    pub users_collection: String,
}

impl Config {
    /// Load configuration from environment and optional override file
    pub fn load() -> CoreResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let store_url = env::var("STORE_URL").map_err(|_| env_error("STORE_URL"))?;
        let database = env::var("STORE_DATABASE").unwrap_or_else(|_| String::from(DEFAULT_DATABASE));

        // Default collection names
        let mut collections = HashMap::new();
        collections.insert("events".to_string(), "events".to_string());
        collections.insert("participants".to_string(), "event_participants".to_string());
        collections.insert("users".to_string(), "users".to_string());

        // Load collection overrides from file if it exists
        if let Ok(content) = fs::read_to_string("config/collections.toml") {
            if let Ok(overrides) = toml::from_str::<HashMap<String, String>>(&content) {
                // Merge with defaults
                for (key, value) in overrides {
                    collections.insert(key, value);
                }
            }
        }

        let collection = |key: &str, fallback: &str| {
            collections
                .get(key)
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        Ok(Config {
            store_url,
            database,
            events_collection: collection("events", "events"),
            participants_collection: collection("participants", "event_participants"),
            users_collection: collection("users", "users"),
        })
    }
}
