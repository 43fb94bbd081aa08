use anyhow::Context;
use scraper::{ElementRef, Html};
use steam_scraping_utils::{selector, text::element_text};

use crate::schema::{Price, Release, TitleListing};

/// Parses a storefront search-results page.
///
/// A page without the results container is an error (the markup changed);
/// a container without rows is an empty page.
pub fn parse(html: &Html) -> anyhow::Result<Vec<TitleListing>> {
    html.select(selector!("#search_resultsRows"))
        .next()
        .context("Search result container `#search_resultsRows` not found")?;
    html.select(selector!("#search_resultsRows > a"))
        .map(parse_row)
        .collect()
}

fn parse_row(a: ElementRef) -> anyhow::Result<TitleListing> {
    let url = a
        .attr("href")
        .with_context(|| format!("Result row without `href`: {}", a.html()))?
        .to_owned();
    let id = a
        .attr("data-ds-appid")
        .with_context(|| format!("Result row without `data-ds-appid`: {url}"))?
        .to_owned()
        .into();
    let title = a
        .select(selector!("div.search_name"))
        .next()
        .with_context(|| format!("Title div not found in result row {url}"))?;
    let title = element_text(title).replace('\n', " ").into();
    let price = parse_price(a).with_context(|| format!("While parsing the price of {url}"))?;
    let release = match a.select(selector!("div.search_released")).next() {
        Some(div) => non_empty(element_text(div)).map_or_else(Release::none, Release::from),
        None => Release::none(),
    };
    Ok(TitleListing::builder()
        .id(id)
        .title(title)
        .price(price)
        .release(release)
        .url(url)
        .build())
}

fn parse_price(row: ElementRef) -> anyhow::Result<Price> {
    let text = if let Some(div) = row
        .select(selector!("div.search_price:not(.discounted)"))
        .next()
    {
        element_text(div)
    } else if let Some(div) = row.select(selector!("div.search_price.discounted")).next() {
        parse_discounted_price(row, div)?
    } else {
        String::new()
    };
    Ok(non_empty(text).map_or_else(Price::none, Price::from))
}

/// `discount from <original> to <sale> (<percentage>)`
fn parse_discounted_price(row: ElementRef, price_div: ElementRef) -> anyhow::Result<String> {
    let original = price_div
        .select(selector!(r#"span[style="color: #888888;"]"#))
        .next()
        .context("Original price not found in a discounted price block")?;
    let original = element_text(original).replace(' ', ".");
    let sale = price_div
        .children()
        .skip_while(|node| !node.value().as_element().is_some_and(|e| e.name() == "br"))
        .nth(1)
        .and_then(|node| node.value().as_text().map(|text| text.trim().to_owned()))
        .context("Sale price not found after <br> in a discounted price block")?;
    let percentage = row
        .select(selector!("div.search_discount"))
        .next()
        .context("Discount percentage not found for a discounted title")?;
    let percentage = element_text(percentage).replace('-', "").trim().to_owned();
    Ok(format!("discount from {original} to {sale} ({percentage})"))
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}
