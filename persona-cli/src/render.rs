//! Colored terminal rendering for persona calendar types.

use owo_colors::OwoColorize;
use persona_core::holidays::{Holiday, HolidayKind};
use persona_core::market::{MarketIndex, StockData, StockQuote};
use persona_core::{CivilZone, Event, Persona, Repeat};

/// Parse `#RRGGBB` into its components.
fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// A colored dot in the persona's color.
pub fn swatch(color: &str) -> String {
    match rgb(color) {
        Some((r, g, b)) => "●".truecolor(r, g, b).to_string(),
        None => "●".to_string(),
    }
}

pub fn persona_line(persona: &Persona) -> String {
    let mut line = format!("{} {}", swatch(&persona.color), persona.name.bold());
    if let Some(description) = &persona.description {
        line.push_str(&format!(" {}", description.dimmed()));
    }
    format!("{}  {}", line, persona.id.dimmed())
}

/// `HH:MM-HH:MM title [persona] #tags`
pub fn event_line(event: &Event, persona: Option<&Persona>, zone: &CivilZone) -> String {
    let start = zone.time_of_day(event.start);
    let time = match event.end {
        Some(end) => format!("{}-{}", start, zone.time_of_day(end)),
        None => start,
    };

    let mut line = format!("  {:>11} {}", time, event.title);

    if let Some(persona) = persona {
        line.push_str(&format!(" {} {}", swatch(&persona.color), persona.name.dimmed()));
    }
    if event.repeat != Repeat::None {
        line.push_str(&format!(" ↻ {}", event.repeat.label().cyan()));
    }
    if !event.tags.is_empty() {
        let tags: Vec<String> = event.tags.iter().map(|t| format!("#{}", t)).collect();
        line.push_str(&format!(" {}", tags.join(" ").dimmed()));
    }

    format!("{}  {}", line, event.id.dimmed())
}

/// Events grouped under a `YYYY. MM. DD.` heading per civil date.
pub fn event_list(
    events: &[Event],
    persona_of: impl Fn(&str) -> Option<Persona>,
    zone: &CivilZone,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = zone.format_date(event.start);
        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            let heading = if zone.is_today(event.start) {
                format!("{} (today)", date_label)
            } else {
                date_label.clone()
            };
            lines.push(heading.bold().to_string());
            current_date = Some(date_label);
        }

        let persona = persona_of(&event.persona_id);
        lines.push(event_line(event, persona.as_ref(), zone));
    }

    lines
}

pub fn holiday_line(holiday: &Holiday) -> String {
    let name = match holiday.kind {
        HolidayKind::National => holiday.name.red().to_string(),
        HolidayKind::Traditional => holiday.name.yellow().to_string(),
        HolidayKind::Memorial => holiday.name.blue().to_string(),
        HolidayKind::Season => holiday.name.green().to_string(),
    };
    let marker = if holiday.is_national_holiday {
        "휴일".red().to_string()
    } else {
        String::new()
    };
    format!("  {} {} {}", holiday.date, name, marker)
}

fn signed(change: f64, text: String) -> String {
    if change > 0.0 {
        text.red().to_string()
    } else if change < 0.0 {
        text.blue().to_string()
    } else {
        text
    }
}

pub fn stock_line(stock: &StockData) -> String {
    let change = format!("{:+} ({:+.2}%)", stock.change, stock.change_percent);
    format!(
        "  {:<16} {:>10} {}",
        stock.name,
        stock.current_price,
        signed(stock.change as f64, change)
    )
}

pub fn index_line(index: &MarketIndex) -> String {
    let change = format!("{:+.2} ({:+.2}%)", index.change, index.change_percent);
    format!(
        "  {:<16} {:>10.2} {}",
        index.name,
        index.value,
        signed(index.change, change)
    )
}

pub fn quote(quote: &StockQuote, zone: &CivilZone) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        zone.format_date_time(quote.last_update).bold(),
        format!("[{}]", quote.source.as_str()).dimmed()
    )];
    lines.extend(quote.indices.iter().map(index_line));
    lines.extend(quote.stocks.iter().map(stock_line));
    if let Some(message) = &quote.message {
        lines.push(message.dimmed().to_string());
    }
    lines
}
