use derive_more::{AsRef, Display, From, FromStr};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{api::StatsSource, Error};

const STORE_URL: &str = "https://store.steampowered.com/app";
const HEADER_URL: &str = "https://steamcdn-a.akamaihd.net/steam/apps";

/// Written in place of a price or release date the storefront left blank.
pub const NONE: &str = "none";

/// Steam application id, kept as the storefront spells it.
#[derive(
    Clone, PartialEq, Eq, Hash, Debug, From, FromStr, AsRef, Display, Serialize, Deserialize,
)]
#[as_ref(forward)]
pub struct AppId(String);

#[derive(Clone, PartialEq, Eq, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct TitleName(String);

#[derive(Clone, PartialEq, Eq, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct Price(String);

#[derive(Clone, PartialEq, Eq, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct Release(String);

impl Price {
    pub fn none() -> Self {
        Self(NONE.to_owned())
    }
}
impl Release {
    pub fn none() -> Self {
        Self(NONE.to_owned())
    }
}

/// One row of a storefront search result.
#[derive(Clone, PartialEq, Eq, Debug, Getters, TypedBuilder, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct TitleListing {
    id: AppId,
    title: TitleName,
    #[builder(default = Price::none())]
    price: Price,
    #[builder(default = Release::none())]
    release: Release,
    #[builder(default)]
    url: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct PlayerStats {
    current: u32,
    peak_24h: u32,
    all_time_peak: u32,
}
impl PlayerStats {
    pub fn new(current: u32, peak_24h: u32, all_time_peak: u32) -> Self {
        Self {
            current,
            peak_24h,
            all_time_peak,
        }
    }
}
impl From<[u32; 3]> for PlayerStats {
    fn from([current, peak_24h, all_time_peak]: [u32; 3]) -> Self {
        Self::new(current, peak_24h, all_time_peak)
    }
}

/// A title together with its live player counts.
///
/// Never cached: every round builds fresh ones, so the counts reflect the
/// moment the round was started.
#[derive(Clone, PartialEq, Eq, Debug, Getters, CopyGetters)]
pub struct TitleEntity {
    #[getset(get = "pub")]
    id: AppId,
    #[getset(get = "pub")]
    name: TitleName,
    #[getset(get = "pub")]
    thumbnail_url: String,
    #[getset(get = "pub")]
    store_url: String,
    #[getset(get_copy = "pub")]
    stats: PlayerStats,
}

impl TitleEntity {
    pub async fn build(
        source: &impl StatsSource,
        id: AppId,
        name: TitleName,
    ) -> Result<Self, Error> {
        let stats = source.fetch_stats(&id).await?;
        Ok(Self::with_stats(id, name, stats))
    }

    pub fn with_stats(id: AppId, name: TitleName, stats: PlayerStats) -> Self {
        Self {
            thumbnail_url: format!("{HEADER_URL}/{id}/header.jpg"),
            store_url: format!("{STORE_URL}/{id}"),
            id,
            name,
            stats,
        }
    }

    pub fn current_players(&self) -> u32 {
        self.stats.current
    }
}

#[cfg(test)]
mod tests {
    use super::{AppId, PlayerStats, Price, Release, TitleEntity, TitleListing};

    #[test]
    fn entity_urls() {
        let entity = TitleEntity::with_stats(
            "440".to_owned().into(),
            "Team Fortress 2".to_owned().into(),
            [50, 80, 200].into(),
        );
        assert_eq!(entity.store_url(), "https://store.steampowered.com/app/440");
        assert_eq!(
            entity.thumbnail_url(),
            "https://steamcdn-a.akamaihd.net/steam/apps/440/header.jpg"
        );
        assert_eq!(entity.current_players(), 50);
        assert_eq!(entity.stats(), PlayerStats::new(50, 80, 200));
    }

    #[test]
    fn listing_builder_defaults_to_none() {
        let listing = TitleListing::builder()
            .id(AppId::from("10".to_owned()))
            .title("Game X".to_owned().into())
            .build();
        assert_eq!(listing.price(), &Price::none());
        assert_eq!(listing.release(), &Release::none());
    }

    #[test]
    fn listing_serializes_as_flat_strings() {
        let listing = TitleListing::builder()
            .id("10".to_owned().into())
            .title("Game X".to_owned().into())
            .price("$9.99".to_owned().into())
            .url("https://store.steampowered.com/app/10/".to_owned())
            .build();
        assert_eq!(
            serde_json::to_string(&listing).unwrap(),
            r#"{"id":"10","title":"Game X","price":"$9.99","release":"none","url":"https://store.steampowered.com/app/10/"}"#
        );
    }
}
