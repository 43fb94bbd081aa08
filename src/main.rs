use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;
use steam_higher_lower::{
    api::{StatsSource, StorefrontClient, LISTING_PAGES},
    listing_cache::ListingCache,
    render,
    schema::{AppId, TitleEntity, TitleName},
    search_filter::SearchFilter,
};
use steam_scraping_utils::fs_json_util::write_json;

/// Scrapes the storefront the same way the bot does, for checking the
/// parsers against the live site.
#[derive(Parser)]
struct Opts {
    #[command(subcommand)]
    sub: Sub,
}

#[derive(Subcommand)]
enum Sub {
    /// Scrape the search results of one filter.
    Listing(Listing),
    /// Scrape the player counts of one title.
    Stats(Stats),
    /// Build a title as a round would.
    Title(Title),
    /// Scrape every filter and save the result for the bot to start from.
    Snapshot(Snapshot),
}

#[derive(Args)]
struct Listing {
    #[arg(value_parser = parse_filter, default_value = "base")]
    filter: SearchFilter,
    #[arg(long, default_value_t = LISTING_PAGES)]
    pages: u32,
    /// Write the rows as JSON instead of printing them.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct Stats {
    id: AppId,
}

#[derive(Args)]
struct Title {
    id: AppId,
    name: String,
}

#[derive(Args)]
struct Snapshot {
    path: PathBuf,
    #[arg(long, default_value_t = LISTING_PAGES)]
    pages: u32,
}

fn parse_filter(s: &str) -> Result<SearchFilter, String> {
    SearchFilter::parse_choice(s)
        .ok_or_else(|| format!("Unknown filter {s:?} (base, popular, best, popular-new or 0-3)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    let client = StorefrontClient::new()?;

    match opts.sub {
        Sub::Listing(args) => {
            let listings = client.fetch_listing(args.filter, args.pages).await?;
            match args.output {
                Some(path) => {
                    write_json(&path, &listings)?;
                    info!("Saved {} titles to {path:?}.", listings.len());
                }
                None => {
                    for (i, listing) in listings.iter().enumerate() {
                        println!(
                            "{}. {}\nID: {}\nReleased Date: {}\nPrice: {}\nURL: {}\n----",
                            i + 1,
                            listing.title(),
                            listing.id(),
                            listing.release(),
                            listing.price(),
                            listing.url()
                        );
                    }
                }
            }
        }
        Sub::Stats(args) => {
            let stats = client.fetch_stats(&args.id).await?;
            println!(
                "Current players >>> {}\n24h peak >>> {}\nAll-time peak >>> {}",
                render::players(stats.current()),
                render::players(stats.peak_24h()),
                render::players(stats.all_time_peak()),
            );
        }
        Sub::Title(args) => {
            let entity = TitleEntity::build(&client, args.id, TitleName::from(args.name)).await?;
            println!("{entity:#?}");
        }
        Sub::Snapshot(args) => {
            let cache = ListingCache::fetch(&client, args.pages).await?;
            cache.save(&args.path)?;
            info!("Saved the listing snapshot to {:?}.", args.path);
        }
    }
    Ok(())
}
