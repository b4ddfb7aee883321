//! Market-data types and the mock quote generator.
//!
//! The live source (KIS) lives in the server; everything here is shared
//! by the server and the CLI.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub struct Listing {
    pub symbol: &'static str,
    pub name: &'static str,
}

const fn listing(symbol: &'static str, name: &'static str) -> Listing {
    Listing { symbol, name }
}

pub const MAJOR_KOREAN_STOCKS: [Listing; 10] = [
    listing("005930", "삼성전자"),
    listing("000660", "SK하이닉스"),
    listing("035420", "NAVER"),
    listing("005380", "현대차"),
    listing("006400", "삼성SDI"),
    listing("051910", "LG화학"),
    listing("035720", "카카오"),
    listing("207940", "삼성바이오로직스"),
    listing("068270", "셀트리온"),
    listing("096770", "SK이노베이션"),
];

pub const KOREAN_MARKET_INDICES: [Listing; 3] = [
    listing("KOSPI", "코스피"),
    listing("KOSDAQ", "코스닥"),
    listing("KRX100", "KRX 100"),
];

/// How many of [`MAJOR_KOREAN_STOCKS`] are quoted when no symbols are given.
pub const DEFAULT_SYMBOL_COUNT: usize = 4;

// (symbol, name, base price) for mock quotes
const MOCK_BASE_PRICES: [(&str, &str, i64); 6] = [
    ("005930", "삼성전자", 71_500),
    ("000660", "SK하이닉스", 128_000),
    ("035420", "NAVER", 185_500),
    ("035720", "카카오", 45_200),
    ("005380", "현대차", 195_000),
    ("006400", "삼성SDI", 420_000),
];
const MOCK_DEFAULT_PRICE: i64 = 50_000;
const MOCK_MIN_PRICE: f64 = 1_000.0;
const MOCK_PRICE_JITTER: f64 = 2_500.0;

// (name, base value) for mock indices
const MOCK_INDICES: [(&str, f64); 2] = [("코스피", 2485.67), ("코스닥", 731.25)];
const MOCK_INDEX_JITTER: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockData {
    pub symbol: String,
    pub name: String,
    pub current_price: i64,
    pub change: i64,
    pub change_percent: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high52w: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low52w: Option<i64>,
    pub last_update: DateTime<Utc>,
}

impl StockData {
    /// Placeholder for a symbol whose live fetch failed.
    pub fn zeroed(symbol: &str) -> Self {
        StockData {
            symbol: symbol.to_string(),
            name: stock_name(symbol).to_string(),
            current_price: 0,
            change: 0,
            change_percent: 0.0,
            volume: 0,
            market_cap: None,
            high52w: None,
            low52w: None,
            last_update: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub name: String,
    pub value: f64,
    pub change: f64,
    pub change_percent: f64,
    pub last_update: DateTime<Utc>,
}

/// Where a quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    KisApi,
    /// No credentials configured.
    Mock,
    /// Credentials configured but the live call failed.
    MockFallback,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSource::KisApi => "kis_api",
            QuoteSource::Mock => "mock",
            QuoteSource::MockFallback => "mock_fallback",
        }
    }
}

/// Body of `GET /api/stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub stocks: Vec<StockData>,
    pub indices: Vec<MarketIndex>,
    pub source: QuoteSource,
    pub last_update: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StockQuote {
    pub fn live(stocks: Vec<StockData>) -> Self {
        StockQuote {
            stocks,
            indices: mock_indices(),
            source: QuoteSource::KisApi,
            last_update: Utc::now(),
            message: None,
            error: None,
        }
    }

    pub fn mock(symbols: &[String]) -> Self {
        StockQuote {
            stocks: mock_stocks(symbols),
            indices: mock_indices(),
            source: QuoteSource::Mock,
            last_update: Utc::now(),
            message: Some("KIS API 키가 설정되지 않았습니다. 모의 데이터를 사용합니다.".to_string()),
            error: None,
        }
    }

    pub fn mock_fallback(symbols: &[String]) -> Self {
        StockQuote {
            stocks: mock_stocks(symbols),
            indices: mock_indices(),
            source: QuoteSource::MockFallback,
            last_update: Utc::now(),
            message: Some("API 호출에 실패하여 모의 데이터를 사용합니다.".to_string()),
            error: Some("KIS API 호출 실패".to_string()),
        }
    }
}

/// Display name of a listed symbol, or the symbol itself.
pub fn stock_name(symbol: &str) -> &str {
    MAJOR_KOREAN_STOCKS
        .iter()
        .find(|s| s.symbol == symbol)
        .map(|s| s.name)
        .unwrap_or(symbol)
}

pub fn default_symbols() -> Vec<String> {
    MAJOR_KOREAN_STOCKS
        .iter()
        .take(DEFAULT_SYMBOL_COUNT)
        .map(|s| s.symbol.to_string())
        .collect()
}

/// Split a comma-separated symbol list, falling back to the defaults
/// when nothing usable is given.
pub fn parse_symbols(raw: Option<&str>) -> Vec<String> {
    let symbols: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if symbols.is_empty() {
        default_symbols()
    } else {
        symbols
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn mock_stocks(symbols: &[String]) -> Vec<StockData> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    symbols
        .iter()
        .map(|symbol| {
            let (name, base) = MOCK_BASE_PRICES
                .iter()
                .find(|(s, _, _)| s == symbol)
                .map(|(_, name, base)| (name.to_string(), *base))
                .unwrap_or_else(|| (symbol.clone(), MOCK_DEFAULT_PRICE));

            let change = rng.gen_range(-MOCK_PRICE_JITTER..MOCK_PRICE_JITTER);
            let price = (base as f64 + change).max(MOCK_MIN_PRICE);

            StockData {
                symbol: symbol.clone(),
                name,
                current_price: price.round() as i64,
                change: change.round() as i64,
                change_percent: round2(change / base as f64 * 100.0),
                volume: rng.gen_range(100_000..10_100_000),
                market_cap: None,
                high52w: None,
                low52w: None,
                last_update: now,
            }
        })
        .collect()
}

pub fn mock_indices() -> Vec<MarketIndex> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    MOCK_INDICES
        .iter()
        .map(|(name, base)| {
            let change = rng.gen_range(-MOCK_INDEX_JITTER..MOCK_INDEX_JITTER);
            MarketIndex {
                name: name.to_string(),
                value: round2(base + change),
                change: round2(change),
                change_percent: round2(change / base * 100.0),
                last_update: now,
            }
        })
        .collect()
}
