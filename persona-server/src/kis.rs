//! Korea Investment & Securities (KIS) open API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use persona_core::market::{StockData, stock_name};
use persona_core::time::expiry_after;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::market::PriceFeed;

const PRICE_PATH: &str = "/uapi/domestic-stock/v1/quotations/inquire-price";
const PRICE_TR_ID: &str = "FHKST01010100";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct PriceResponse {
    pub output: PriceOutput,
}

/// The handful of fields we read out of `inquire-price`. KIS sends every
/// number as a string.
#[derive(Debug, Deserialize)]
pub struct PriceOutput {
    /// current price
    pub stck_prpr: String,
    /// reference (previous close) price
    pub stck_sdpr: String,
    #[serde(default)]
    pub w52_hgpr: Option<String>,
    #[serde(default)]
    pub w52_lwpr: Option<String>,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct KisClient {
    http: reqwest::Client,
    base_url: String,
    app_key: String,
    secret_key: String,
    token: Mutex<Option<CachedToken>>,
}

impl KisClient {
    pub fn new(base_url: &str, app_key: &str, secret_key: &str) -> Self {
        KisClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app_key: app_key.to_string(),
            secret_key: secret_key.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Cached until it expires.
    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if let Some(cached) = token.as_ref() {
            if Utc::now() < cached.expires_at {
                return Ok(cached.value.clone());
            }
        }

        let response = self
            .http
            .post(format!("{}/oauth2/tokenP", self.base_url))
            .json(&serde_json::json!({
                "grant_type": "client_credentials",
                "appkey": self.app_key,
                "appsecret": self.secret_key,
            }))
            .send()
            .await
            .context("Failed to request KIS access token")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("KIS token request failed: {} {}", status, error_text);
        }

        let data: TokenResponse = response
            .json()
            .await
            .context("Failed to parse KIS token response")?;

        tracing::debug!(expires_in = data.expires_in, "issued KIS access token");

        // a token without a usable lifetime is used once and not cached
        *token = expiry_after(Utc::now(), data.expires_in).map(|expires_at| CachedToken {
            value: data.access_token.clone(),
            expires_at,
        });

        Ok(data.access_token)
    }

    async fn stock_price(&self, token: &str, code: &str) -> Result<PriceResponse> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, PRICE_PATH))
            .query(&[("fid_cond_mrkt_div_code", "J"), ("fid_input_iscd", code)])
            .bearer_auth(token)
            .header("appkey", &self.app_key)
            .header("appsecret", &self.secret_key)
            .header("tr_id", PRICE_TR_ID)
            .send()
            .await
            .with_context(|| format!("Failed to fetch price for {}", code))?;

        if !response.status().is_success() {
            anyhow::bail!("KIS API Error: {}", response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse price for {}", code))
    }
}

#[async_trait]
impl PriceFeed for KisClient {
    async fn prices(&self, symbols: &[String]) -> Result<Vec<Option<StockData>>> {
        let token = self.access_token().await?;

        let fetches = symbols.iter().map(|symbol| {
            let token = token.as_str();
            async move {
                match self.stock_price(token, symbol).await {
                    Ok(price) => Some(to_stock_data(symbol, &price.output)),
                    Err(e) => {
                        tracing::warn!(symbol = %symbol, error = %format!("{:#}", e), "price fetch failed");
                        None
                    }
                }
            }
        });

        Ok(futures::future::join_all(fetches).await)
    }
}

fn parse_price(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

pub fn to_stock_data(symbol: &str, output: &PriceOutput) -> StockData {
    let current_price = parse_price(&output.stck_prpr);
    let previous = parse_price(&output.stck_sdpr);
    let change = current_price - previous;
    let change_percent = if previous == 0 {
        0.0
    } else {
        change as f64 / previous as f64 * 100.0
    };

    StockData {
        symbol: symbol.to_string(),
        name: stock_name(symbol).to_string(),
        current_price,
        change,
        change_percent,
        // real-time volume needs a separate call
        volume: 0,
        market_cap: None,
        high52w: output.w52_hgpr.as_deref().map(parse_price),
        low52w: output.w52_lwpr.as_deref().map(parse_price),
        last_update: Utc::now(),
    }
}
