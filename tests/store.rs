//! SQLite store tests against a temporary database file.

use std::path::Path;

use farm_advisor::models::{FarmData, MarketData};
use farm_advisor::store::{SqliteStore, Store};
use farm_advisor::{db, migrate};
use tempfile::TempDir;

async fn open_store(path: &Path) -> SqliteStore {
    let pool = db::connect_path(path).await.unwrap();
    migrate::create_tables(&pool).await.unwrap();
    SqliteStore::new(pool)
}

fn farm(crop: &str, ph: f64) -> FarmData {
    FarmData {
        soil_ph: ph,
        soil_moisture: 31.7,
        temperature_c: 22.4,
        rainfall_mm: 143.09,
        crop_type: crop.to_string(),
        fertilizer_usage_kg: 125.5,
        pesticide_usage_kg: 8.3,
        crop_yield_ton: 4.123456789,
        sustainability_score: 61.0,
    }
}

fn market(product: &str, price: f64) -> MarketData {
    MarketData {
        product: product.to_string(),
        market_price_per_ton: price,
        demand_index: 0.8,
        supply_index: 0.55,
        competitor_price_per_ton: 199.99,
        economic_indicator: 1.05,
        weather_impact_score: 0.2,
        seasonal_factor: "Medium".to_string(),
        consumer_trend_index: 0.65,
    }
}

#[tokio::test]
async fn test_empty_tables_list_empty() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp.path().join("farm.sqlite")).await;

    assert!(store.list_farms().await.unwrap().is_empty());
    assert!(store.list_markets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_then_list_farm_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp.path().join("farm.sqlite")).await;

    let first = farm("Wheat", 6.5);
    let second = farm("Rice", 5.9);
    let id1 = store.insert_farm(&first).await.unwrap();
    let id2 = store.insert_farm(&second).await.unwrap();
    assert!(id2 > id1, "ids must increase: {} then {}", id1, id2);

    let farms = store.list_farms().await.unwrap();
    assert_eq!(farms.len(), 2);
    assert_eq!(farms[0].farm_id, id1);
    assert_eq!(farms[0].data, first);
    assert_eq!(farms[1].farm_id, id2);
    assert_eq!(farms[1].data, second);
}

#[tokio::test]
async fn test_insert_then_list_market_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp.path().join("farm.sqlite")).await;

    let corn = market("Corn", 210.5);
    let id = store.insert_market(&corn).await.unwrap();

    let markets = store.list_markets().await.unwrap();
    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0].market_id, id);
    assert_eq!(markets[0].data, corn);
}

#[tokio::test]
async fn test_get_farm() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp.path().join("farm.sqlite")).await;

    let id = store.insert_farm(&farm("Soybean", 7.1)).await.unwrap();

    let found = store.get_farm(id).await.unwrap().unwrap();
    assert_eq!(found.data.crop_type, "Soybean");
    assert!(store.get_farm(id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_market_lookup_is_exact_match() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp.path().join("farm.sqlite")).await;

    store.insert_market(&market("wheat", 180.0)).await.unwrap();
    assert!(store.get_market_by_product("Wheat").await.unwrap().is_none());
    assert!(store.get_market_by_product("wheat ").await.unwrap().is_none());

    store.insert_market(&market("Wheat", 190.0)).await.unwrap();
    let found = store.get_market_by_product("Wheat").await.unwrap().unwrap();
    assert_eq!(found.data.product, "Wheat");
    assert_eq!(found.data.market_price_per_ton, 190.0);
}

#[tokio::test]
async fn test_duplicate_products_resolve_to_lowest_id() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp.path().join("farm.sqlite")).await;

    let first = store.insert_market(&market("Corn", 200.0)).await.unwrap();
    store.insert_market(&market("Corn", 250.0)).await.unwrap();

    let found = store.get_market_by_product("Corn").await.unwrap().unwrap();
    assert_eq!(found.market_id, first);
    assert_eq!(found.data.market_price_per_ton, 200.0);
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("farm.sqlite");

    let store = open_store(&path).await;
    let id = store.insert_farm(&farm("Barley", 6.2)).await.unwrap();
    store.pool().close().await;

    let reopened = open_store(&path).await;
    let farms = reopened.list_farms().await.unwrap();
    assert_eq!(farms.len(), 1);
    assert_eq!(farms[0].farm_id, id);
    assert_eq!(farms[0].data.crop_type, "Barley");
}

#[tokio::test]
async fn test_create_tables_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp.path().join("farm.sqlite")).await;
    store.insert_market(&market("Corn", 210.5)).await.unwrap();

    migrate::create_tables(store.pool()).await.unwrap();
    assert_eq!(store.list_markets().await.unwrap().len(), 1);
}
