//! Core data models used throughout the service.
//!
//! Field names on the wire match the stored column names exactly
//! (`Soil_pH`, `Market_Price_per_ton`, ...), so every field carries an
//! explicit serde rename.

use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// One farm's agronomic, environmental, and yield readings, as uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmData {
    #[serde(rename = "Soil_pH")]
    pub soil_ph: f64,
    #[serde(rename = "Soil_Moisture")]
    pub soil_moisture: f64,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: f64,
    #[serde(rename = "Crop_Type")]
    pub crop_type: String,
    #[serde(rename = "Fertilizer_Usage_kg")]
    pub fertilizer_usage_kg: f64,
    #[serde(rename = "Pesticide_Usage_kg")]
    pub pesticide_usage_kg: f64,
    #[serde(rename = "Crop_Yield_ton")]
    pub crop_yield_ton: f64,
    #[serde(rename = "Sustainability_Score")]
    pub sustainability_score: f64,
}

/// A stored farm row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmRecord {
    #[serde(rename = "Farm_ID")]
    pub farm_id: i64,
    #[serde(flatten)]
    pub data: FarmData,
}

/// Pricing, demand, and supply figures for one product, as uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Joined against [`FarmData::crop_type`] by exact string equality.
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Market_Price_per_ton")]
    pub market_price_per_ton: f64,
    #[serde(rename = "Demand_Index")]
    pub demand_index: f64,
    #[serde(rename = "Supply_Index")]
    pub supply_index: f64,
    #[serde(rename = "Competitor_Price_per_ton")]
    pub competitor_price_per_ton: f64,
    #[serde(rename = "Economic_Indicator")]
    pub economic_indicator: f64,
    #[serde(rename = "Weather_Impact_Score")]
    pub weather_impact_score: f64,
    #[serde(rename = "Seasonal_Factor")]
    pub seasonal_factor: String,
    #[serde(rename = "Consumer_Trend_Index")]
    pub consumer_trend_index: f64,
}

/// A stored market row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    #[serde(rename = "Market_ID")]
    pub market_id: i64,
    #[serde(flatten)]
    pub data: MarketData,
}

/// The composed answer to an advisory request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    /// The model's reply message.
    pub recommendation: ChatMessage,
    /// Video search URL.
    pub videos: String,
    /// Web search URLs (never fetched by the service).
    pub useful_links: Vec<String>,
    /// Up to three image URLs; empty when the image provider is unavailable.
    pub images: Vec<String>,
}

pub const FARM_ADDED_MESSAGE: &str = "Farmer data added successfully";
pub const MARKET_ADDED_MESSAGE: &str = "Market data added successfully";
pub const NO_FARMS_MESSAGE: &str = "No farmer data found";
pub const NO_MARKETS_MESSAGE: &str = "No market data found";
pub const FARM_NOT_FOUND_MESSAGE: &str = "Farm not found";
