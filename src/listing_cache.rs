use std::{fmt::Debug, path::PathBuf};

use enum_map::EnumMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use steam_scraping_utils::fs_json_util::{read_json, write_json};
use strum::IntoEnumIterator;

use crate::{api::StorefrontClient, schema::TitleListing, search_filter::SearchFilter, Error};

/// The titles every round is drawn from, one bucket per filter.
/// Filled once at startup and only read afterwards.
#[derive(Default, Debug, Serialize, Deserialize)]
pub struct ListingCache {
    buckets: EnumMap<SearchFilter, Vec<TitleListing>>,
}

impl ListingCache {
    pub fn with(mut self, filter: SearchFilter, listings: Vec<TitleListing>) -> Self {
        self.buckets[filter] = listings;
        self
    }

    /// Scrapes every filter.  Only the base filter is mandatory; the others
    /// are left empty when they fail, and rounds on them use the base bucket.
    pub async fn fetch(client: &StorefrontClient, pages: u32) -> Result<Self, Error> {
        info!("Fetching Steam game charts!");
        let mut cache = Self::default();
        for filter in SearchFilter::iter() {
            match client.fetch_listing(filter, pages).await {
                Ok(listings) => cache.buckets[filter] = listings,
                Err(e) if filter != SearchFilter::Base => {
                    warn!("Failed to fetch the {filter} listing, leaving it empty: {e:#}")
                }
                Err(e) => return Err(e),
            }
        }
        Ok(cache)
    }

    pub fn load<P: Into<PathBuf> + Debug>(path: P) -> anyhow::Result<Self> {
        let cache: Self = read_json(path)?;
        cache.log_counts();
        Ok(cache)
    }

    pub fn save<P: Into<PathBuf>>(&self, path: P) -> anyhow::Result<()> {
        write_json(path, self)
    }

    pub fn get(&self, filter: SearchFilter) -> &[TitleListing] {
        &self.buckets[filter]
    }

    pub fn count(&self, filter: SearchFilter) -> usize {
        self.buckets[filter].len()
    }

    /// The bucket to draw from: the requested one, or the base one if the
    /// requested one is empty.  `None` if both are empty.
    pub fn pool(&self, filter: SearchFilter) -> Option<(SearchFilter, &[TitleListing])> {
        [filter, SearchFilter::Base]
            .into_iter()
            .find(|&filter| !self.buckets[filter].is_empty())
            .map(|used| {
                if used != filter {
                    warn!("No {filter} titles are cached; drawing from {used} instead.");
                }
                (used, &self.buckets[used][..])
            })
    }

    pub fn log_counts(&self) {
        for (filter, listings) in &self.buckets {
            info!(">>> {} {filter} titles available.", listings.len());
        }
    }
}
