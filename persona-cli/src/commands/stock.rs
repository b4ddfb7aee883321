use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;
use persona_cli::api::Api;
use persona_cli::market::{MarketWatcher, REFRESH_INTERVAL};
use persona_cli::render;
use persona_core::CivilZone;
use persona_core::market::{StockQuote, parse_symbols};

fn print_quote(quote: &StockQuote, zone: &CivilZone) {
    for line in render::quote(quote, zone) {
        println!("{}", line);
    }
    if let Some(error) = &quote.error {
        eprintln!("  {}", error.yellow());
    }
}

pub async fn run(api: Arc<dyn Api>, symbols: Option<&str>, watch: bool) -> Result<()> {
    let zone = CivilZone::kst();
    let symbols = parse_symbols(symbols);

    if !watch {
        let quote = api.stock(&symbols).await?;
        print_quote(&quote, &zone);
        return Ok(());
    }

    let mut watcher = MarketWatcher::spawn(api, symbols, REFRESH_INTERVAL);
    loop {
        tokio::select! {
            quote = watcher.changed() => match quote {
                Some(quote) => {
                    print_quote(&quote, &zone);
                    println!();
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
