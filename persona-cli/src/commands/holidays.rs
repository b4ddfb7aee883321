use anyhow::{Context, Result};
use chrono::Datelike;
use owo_colors::OwoColorize;
use persona_cli::render;
use persona_core::CivilZone;
use persona_core::holidays::holidays_by_month;

pub fn run(month: Option<&str>) -> Result<()> {
    let (year, month) = match month {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = CivilZone::kst().now_local().date_naive();
            (today.year(), today.month())
        }
    };

    let holidays = holidays_by_month(year, month);
    println!("{}", format!("{}. {:02}.", year, month).bold());
    if holidays.is_empty() {
        println!("{}", "  No holidays".dimmed());
    }
    for holiday in holidays {
        println!("{}", render::holiday_line(holiday));
    }
    Ok(())
}

/// Parse `YYYY-MM`.
fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let (year, month) = raw
        .split_once('-')
        .with_context(|| format!("Expected YYYY-MM, got '{}'", raw))?;
    let year: i32 = year
        .parse()
        .with_context(|| format!("Invalid year '{}'", year))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("Invalid month '{}'", month))?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month must be between 1 and 12, got {}", month);
    }
    Ok((year, month))
}
