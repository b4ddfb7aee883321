//! Periodic stock-quote refresh.

use std::sync::Arc;
use std::time::Duration;

use persona_core::market::StockQuote;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::Api;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Fetches quotes in a background task and publishes the latest one.
/// A failed refresh keeps the previous quote. The task stops when the
/// watcher is dropped.
pub struct MarketWatcher {
    rx: watch::Receiver<Option<Arc<StockQuote>>>,
    task: JoinHandle<()>,
}

impl MarketWatcher {
    pub fn spawn(api: Arc<dyn Api>, symbols: Vec<String>, every: Duration) -> Self {
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                // first tick completes immediately
                ticker.tick().await;
                match api.stock(&symbols).await {
                    Ok(quote) => {
                        tracing::debug!(source = quote.source.as_str(), "stock quote refreshed");
                        if tx.send(Some(Arc::new(quote))).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "stock refresh failed"),
                }
            }
        });

        MarketWatcher { rx, task }
    }

    pub fn latest(&self) -> Option<Arc<StockQuote>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next successful refresh.
    pub async fn changed(&mut self) -> Option<Arc<StockQuote>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }
}

impl Drop for MarketWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
