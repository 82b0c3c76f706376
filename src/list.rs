//! Record listing for the `farms` and `markets` CLI commands.
//!
//! Prints the same JSON the `GET /farmers` and `GET /markets` endpoints
//! return, including the placeholder message when a table is empty.

use anyhow::Result;

use crate::config::Config;
use crate::models::{NO_FARMS_MESSAGE, NO_MARKETS_MESSAGE};
use crate::store::{SqliteStore, Store};
use crate::{db, migrate};

pub async fn run_farms(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let farms = store.list_farms().await;
    store.pool().close().await;

    print_or_placeholder(&farms?, NO_FARMS_MESSAGE)
}

pub async fn run_markets(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let markets = store.list_markets().await;
    store.pool().close().await;

    print_or_placeholder(&markets?, NO_MARKETS_MESSAGE)
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
    let pool = db::connect(config).await?;
    migrate::create_tables(&pool).await?;
    Ok(SqliteStore::new(pool))
}

fn print_or_placeholder<T: serde::Serialize>(rows: &[T], placeholder: &str) -> Result<()> {
    if rows.is_empty() {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "message": placeholder }))?
        );
    } else {
        println!("{}", serde_json::to_string_pretty(rows)?);
    }
    Ok(())
}
