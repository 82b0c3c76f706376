//! Per-farm advisory composition.
//!
//! [`Advisor::advise`] joins a farm with the market row for its crop, asks
//! the chat model for strategy advice, and attaches learning resources:
//! a video search link, two web search links, and up to three images.
//!
//! # Failure behaviour
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | Unknown farm id | `Ok(None)` |
//! | No market row for the crop | market figures become `"N/A"` |
//! | Chat model error or timeout | `Err(Error::ModelUnavailable)` |
//! | Image provider error | advisory with `images = []` |

use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::chat::{ChatMessage, ChatModel, OllamaChat};
use crate::config::Config;
use crate::error::Result;
use crate::images::{create_image_search, ImageSearch};
use crate::models::{Advisory, FarmData, MarketData, FARM_NOT_FOUND_MESSAGE};
use crate::store::{SqliteStore, Store};
use crate::{db, migrate};

pub const SYSTEM_PROMPT: &str = "You are an advanced AI farm and market advisor.";

/// Placeholder for market figures when no market row matches the crop.
pub const NOT_AVAILABLE: &str = "N/A";

/// Appended to the crop type to form the enrichment search query.
pub const QUERY_SUFFIX: &str = "farming best practices";

/// A market-derived number, or the `"N/A"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarketFigure {
    Value(f64),
    NotAvailable,
}

impl Serialize for MarketFigure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MarketFigure::Value(v) => serializer.serialize_f64(*v),
            MarketFigure::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// The data embedded in the model prompt.
///
/// Serialized in declaration order, so the same farm and market rows always
/// produce the same prompt text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptContext {
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
    #[serde(rename = "Market_Price")]
    pub market_price: MarketFigure,
    #[serde(rename = "Demand_Index")]
    pub demand_index: MarketFigure,
}

impl PromptContext {
    pub fn new(farm: &FarmData, market: Option<&MarketData>) -> Self {
        let (market_price, demand_index) = match market {
            Some(m) => (
                MarketFigure::Value(m.market_price_per_ton),
                MarketFigure::Value(m.demand_index),
            ),
            None => (MarketFigure::NotAvailable, MarketFigure::NotAvailable),
        };

        Self {
            soil_ph: farm.soil_ph,
            soil_moisture: farm.soil_moisture,
            temperature_c: farm.temperature_c,
            rainfall_mm: farm.rainfall_mm,
            crop_type: farm.crop_type.clone(),
            market_price,
            demand_index,
        }
    }

    pub fn to_json(&self) -> String {
        // Only plain strings and floats; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The system + user message pair sent to the model.
pub fn build_messages(context: &PromptContext) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Based on this data: {}, provide best farming strategies, market advice, and sustainability tips.",
            context.to_json()
        )),
    ]
}

pub fn search_query(crop_type: &str) -> String {
    format!("{} {}", crop_type, QUERY_SUFFIX)
}

/// Video search URL and web search URLs for `query`.
///
/// Spaces become `+`; nothing else is escaped. The URLs are handed to the
/// client and never fetched here.
pub fn resource_links(query: &str) -> (String, Vec<String>) {
    let q = query.replace(' ', "+");
    let video = format!("https://www.youtube.com/results?search_query={}", q);
    let links = vec![
        format!("https://www.google.com/search?q={}+best+practices", q),
        format!("https://www.agriculture.com/search?q={}", q),
    ];
    (video, links)
}

/// Composes advisories from stored records and the external collaborators.
pub struct Advisor {
    store: Arc<dyn Store>,
    model: Arc<dyn ChatModel>,
    images: Arc<dyn ImageSearch>,
}

impl Advisor {
    pub fn new(
        store: Arc<dyn Store>,
        model: Arc<dyn ChatModel>,
        images: Arc<dyn ImageSearch>,
    ) -> Self {
        Self {
            store,
            model,
            images,
        }
    }

    /// Build the advisory for `farm_id`, or `None` if no such farm exists.
    pub async fn advise(&self, farm_id: i64) -> Result<Option<Advisory>> {
        let Some(farm) = self.store.get_farm(farm_id).await? else {
            return Ok(None);
        };

        let market = self
            .store
            .get_market_by_product(&farm.data.crop_type)
            .await?;
        if market.is_none() {
            info!(
                farm_id,
                crop = %farm.data.crop_type,
                "no market data for crop, using N/A"
            );
        }

        let context = PromptContext::new(&farm.data, market.as_ref().map(|m| &m.data));
        let messages = build_messages(&context);
        let recommendation = self.model.chat(&messages).await?;

        let query = search_query(&farm.data.crop_type);
        let (videos, useful_links) = resource_links(&query);
        let images = match self.images.search(&query).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!(
                    provider = self.images.provider_name(),
                    error = %e,
                    "image search failed, continuing without images"
                );
                Vec::new()
            }
        };

        Ok(Some(Advisory {
            recommendation,
            videos,
            useful_links,
            images,
        }))
    }
}

/// Build an [`Advisor`] over `store` with the configured model and image
/// provider.
pub fn advisor_from_config(config: &Config, store: Arc<dyn Store>) -> anyhow::Result<Advisor> {
    let model = OllamaChat::new(&config.model)?;
    let images = create_image_search(&config.images)?;
    info!(
        model = model.model_name(),
        images = images.provider_name(),
        images_enabled = config.images.is_enabled(),
        "advisor ready"
    );
    Ok(Advisor::new(store, Arc::new(model), Arc::from(images)))
}

/// CLI entry point: compose one advisory and print it as JSON.
pub async fn run_advise(config: &Config, farm_id: i64) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::create_tables(&pool).await?;
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool.clone()));
    let advisor = advisor_from_config(config, store)?;

    let advisory = advisor.advise(farm_id).await;
    pool.close().await;

    match advisory? {
        Some(advisory) => {
            println!("{}", serde_json::to_string_pretty(&advisory)?);
            Ok(())
        }
        None => {
            eprintln!("{}: {}", FARM_NOT_FOUND_MESSAGE, farm_id);
            std::process::exit(1);
        }
    }
}
