//! Record storage.
//!
//! The [`Store`] trait is the storage contract used by the HTTP handlers and
//! the advisory composer; [`SqliteStore`] implements it over the
//! `farmer_data` and `market_data` tables.
//!
//! Records are append-only. There is no update or delete operation, so a
//! record keeps its identifier and contents for the life of the database.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`insert_farm`](Store::insert_farm) | Append a farm row, returning its `Farm_ID` |
//! | [`insert_market`](Store::insert_market) | Append a market row, returning its `Market_ID` |
//! | [`list_farms`](Store::list_farms) | All farm rows in insertion order |
//! | [`list_markets`](Store::list_markets) | All market rows in insertion order |
//! | [`get_farm`](Store::get_farm) | Point lookup by `Farm_ID` |
//! | [`get_market_by_product`](Store::get_market_by_product) | Exact-match lookup by `Product` |

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::models::{FarmData, FarmRecord, MarketData, MarketRecord};

#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a farm row. The insert is committed before this returns.
    async fn insert_farm(&self, farm: &FarmData) -> Result<i64>;

    /// Persist a market row. The insert is committed before this returns.
    async fn insert_market(&self, market: &MarketData) -> Result<i64>;

    /// Every farm row, ordered by `Farm_ID`. Empty when nothing is stored.
    async fn list_farms(&self) -> Result<Vec<FarmRecord>>;

    /// Every market row, ordered by `Market_ID`. Empty when nothing is stored.
    async fn list_markets(&self) -> Result<Vec<MarketRecord>>;

    async fn get_farm(&self, farm_id: i64) -> Result<Option<FarmRecord>>;

    /// The market row whose `Product` equals `product` exactly (case and
    /// whitespace included). When several rows share the product, the one
    /// with the lowest `Market_ID` wins.
    async fn get_market_by_product(&self, product: &str) -> Result<Option<MarketRecord>>;
}

/// SQLite implementation of the [`Store`] trait.
///
/// Wraps a [`SqlitePool`]; see [`crate::db::connect`] for how the pool is
/// sized to a single connection.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const FARM_COLUMNS: &str = "Farm_ID, Soil_pH, Soil_Moisture, Temperature_C, Rainfall_mm, \
    Crop_Type, Fertilizer_Usage_kg, Pesticide_Usage_kg, Crop_Yield_ton, Sustainability_Score";

const MARKET_COLUMNS: &str = "Market_ID, Product, Market_Price_per_ton, Demand_Index, \
    Supply_Index, Competitor_Price_per_ton, Economic_Indicator, Weather_Impact_Score, \
    Seasonal_Factor, Consumer_Trend_Index";

fn farm_from_row(row: &SqliteRow) -> std::result::Result<FarmRecord, sqlx::Error> {
    Ok(FarmRecord {
        farm_id: row.try_get("Farm_ID")?,
        data: FarmData {
            soil_ph: row.try_get("Soil_pH")?,
            soil_moisture: row.try_get("Soil_Moisture")?,
            temperature_c: row.try_get("Temperature_C")?,
            rainfall_mm: row.try_get("Rainfall_mm")?,
            crop_type: row.try_get("Crop_Type")?,
            fertilizer_usage_kg: row.try_get("Fertilizer_Usage_kg")?,
            pesticide_usage_kg: row.try_get("Pesticide_Usage_kg")?,
            crop_yield_ton: row.try_get("Crop_Yield_ton")?,
            sustainability_score: row.try_get("Sustainability_Score")?,
        },
    })
}

fn market_from_row(row: &SqliteRow) -> std::result::Result<MarketRecord, sqlx::Error> {
    Ok(MarketRecord {
        market_id: row.try_get("Market_ID")?,
        data: MarketData {
            product: row.try_get("Product")?,
            market_price_per_ton: row.try_get("Market_Price_per_ton")?,
            demand_index: row.try_get("Demand_Index")?,
            supply_index: row.try_get("Supply_Index")?,
            competitor_price_per_ton: row.try_get("Competitor_Price_per_ton")?,
            economic_indicator: row.try_get("Economic_Indicator")?,
            weather_impact_score: row.try_get("Weather_Impact_Score")?,
            seasonal_factor: row.try_get("Seasonal_Factor")?,
            consumer_trend_index: row.try_get("Consumer_Trend_Index")?,
        },
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_farm(&self, farm: &FarmData) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO farmer_data (Soil_pH, Soil_Moisture, Temperature_C, Rainfall_mm,
                                     Crop_Type, Fertilizer_Usage_kg, Pesticide_Usage_kg,
                                     Crop_Yield_ton, Sustainability_Score)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(farm.soil_ph)
        .bind(farm.soil_moisture)
        .bind(farm.temperature_c)
        .bind(farm.rainfall_mm)
        .bind(&farm.crop_type)
        .bind(farm.fertilizer_usage_kg)
        .bind(farm.pesticide_usage_kg)
        .bind(farm.crop_yield_ton)
        .bind(farm.sustainability_score)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_market(&self, market: &MarketData) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO market_data (Product, Market_Price_per_ton, Demand_Index, Supply_Index,
                                     Competitor_Price_per_ton, Economic_Indicator,
                                     Weather_Impact_Score, Seasonal_Factor, Consumer_Trend_Index)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&market.product)
        .bind(market.market_price_per_ton)
        .bind(market.demand_index)
        .bind(market.supply_index)
        .bind(market.competitor_price_per_ton)
        .bind(market.economic_indicator)
        .bind(market.weather_impact_score)
        .bind(&market.seasonal_factor)
        .bind(market.consumer_trend_index)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_farms(&self) -> Result<Vec<FarmRecord>> {
        let sql = format!("SELECT {} FROM farmer_data ORDER BY Farm_ID ASC", FARM_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let farms = rows
            .iter()
            .map(farm_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(farms)
    }

    async fn list_markets(&self) -> Result<Vec<MarketRecord>> {
        let sql = format!("SELECT {} FROM market_data ORDER BY Market_ID ASC", MARKET_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let markets = rows
            .iter()
            .map(market_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(markets)
    }

    async fn get_farm(&self, farm_id: i64) -> Result<Option<FarmRecord>> {
        let sql = format!("SELECT {} FROM farmer_data WHERE Farm_ID = ?", FARM_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(farm_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(farm_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_market_by_product(&self, product: &str) -> Result<Option<MarketRecord>> {
        let sql = format!(
            "SELECT {} FROM market_data WHERE Product = ? ORDER BY Market_ID ASC LIMIT 1",
            MARKET_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(product)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(market_from_row(&row)?)),
            None => Ok(None),
        }
    }
}
