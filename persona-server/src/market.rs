//! Stock quotes: live from KIS when configured, mock otherwise.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use persona_core::market::{StockData, StockQuote};

/// A live price source. One entry per requested symbol, `None` where that
/// symbol's fetch failed. An `Err` means nothing could be fetched at all.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn prices(&self, symbols: &[String]) -> Result<Vec<Option<StockData>>>;
}

#[derive(Clone, Default)]
pub struct MarketService {
    feed: Option<Arc<dyn PriceFeed>>,
}

impl MarketService {
    /// Mock quotes only.
    pub fn mock() -> Self {
        Self::default()
    }

    pub fn with_feed(feed: Arc<dyn PriceFeed>) -> Self {
        MarketService { feed: Some(feed) }
    }

    pub fn is_live(&self) -> bool {
        self.feed.is_some()
    }

    pub async fn quote(&self, symbols: &[String]) -> StockQuote {
        let Some(feed) = &self.feed else {
            return StockQuote::mock(symbols);
        };

        let prices = match feed.prices(symbols).await {
            Ok(prices) if prices.iter().any(Option::is_some) => prices,
            Ok(_) => {
                tracing::warn!(?symbols, "every price fetch failed, serving mock data");
                return StockQuote::mock_fallback(symbols);
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "KIS API Error, serving mock data");
                return StockQuote::mock_fallback(symbols);
            }
        };

        let stocks = symbols
            .iter()
            .zip(prices)
            .map(|(symbol, price)| price.unwrap_or_else(|| StockData::zeroed(symbol)))
            .collect();

        StockQuote::live(stocks)
    }
}
