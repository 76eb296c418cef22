use std::env;
use std::time::Duration;

use crate::infrastructure::db::repositories::tag_repository_store::{
    ARTICLE_TAGS_COLLECTION, TAGS_COLLECTION,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub tags_collection: String,
    pub article_tags_collection: String,
    pub store_op_timeout: Duration,
    pub popular_tags_max_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tags_collection: TAGS_COLLECTION.into(),
            article_tags_collection: ARTICLE_TAGS_COLLECTION.into(),
            store_op_timeout: Duration::from_millis(5000),
            popular_tags_max_limit: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let tags_collection = env::var("TAGS_COLLECTION")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.tags_collection);
        let article_tags_collection = env::var("ARTICLE_TAGS_COLLECTION")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.article_tags_collection);
        let store_op_timeout = env::var("STORE_OP_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_op_timeout);
        let popular_tags_max_limit = env::var("POPULAR_TAGS_MAX_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.popular_tags_max_limit);

        if tags_collection == article_tags_collection {
            anyhow::bail!("TAGS_COLLECTION and ARTICLE_TAGS_COLLECTION must differ");
        }
        if store_op_timeout.is_zero() {
            anyhow::bail!("STORE_OP_TIMEOUT_MS must be greater than zero");
        }

        Ok(Self {
            tags_collection,
            article_tags_collection,
            store_op_timeout,
            popular_tags_max_limit,
        })
    }
}
