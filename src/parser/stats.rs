use anyhow::{bail, Context};
use scraper::{ElementRef, Html};
use steam_scraping_utils::{regex, selector, text::element_text};

use crate::schema::PlayerStats;

/// Parses a per-title statistics page into (current, 24h peak, all-time peak).
///
/// Only the first three stat blocks are read; any further ones are ignored.
pub fn parse(html: &Html) -> anyhow::Result<PlayerStats> {
    let values = html
        .select(selector!("div.app-stat"))
        .map(parse_stat)
        .collect::<anyhow::Result<Vec<_>>>()?;
    match values[..] {
        [current, peak_24h, all_time_peak, ..] => {
            Ok(PlayerStats::new(current, peak_24h, all_time_peak))
        }
        _ => bail!(
            "No stats found: expected 3 `div.app-stat` blocks, found {}",
            values.len()
        ),
    }
}

fn parse_stat(div: ElementRef) -> anyhow::Result<u32> {
    let span = div
        .select(selector!("span"))
        .next()
        .with_context(|| format!("Stat block without <span>: {}", div.html()))?;
    let text = element_text(span);
    if !regex!(r"^(\d+|\d{1,3}(,\d{3})+)$").is_match(&text) {
        bail!("Stat is not a number: {text:?}");
    }
    Ok(text.replace(',', "").parse()?)
}
