use enum_map::Enum;
use log::warn;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Which storefront search the titles of a round are drawn from.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Enum,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
    FromRepr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SearchFilter {
    Base,
    Popular,
    Best,
    PopularNew,
}

impl SearchFilter {
    pub fn url(self) -> &'static str {
        use SearchFilter::*;
        match self {
            Base => "https://store.steampowered.com/search/results",
            Popular => "https://store.steampowered.com/search/?as-reviews-score=70-&as-reviews-count=10000-&category1=998&ndl=1",
            Best => "https://store.steampowered.com/search/?sort_by=Reviews_DESC&as-reviews-count=1000-&category1=998&as-reviews-score=80-",
            PopularNew => "https://store.steampowered.com/search/?sort_by=Released_DESC&filter=popularnew&ndl=1",
        }
    }

    pub fn description(self) -> &'static str {
        use SearchFilter::*;
        match self {
            Base => "Default / Hot Games",
            Popular => "Popular Games",
            Best => "Highest Rated Games",
            PopularNew => "Popular New Releases",
        }
    }

    /// Accepts either the kebab-case name (`popular-new`) or the menu index (`3`).
    pub fn parse_choice(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.parse::<usize>() {
            Ok(index) => Self::from_repr(index),
            Err(_) => s.to_ascii_lowercase().parse().ok(),
        }
    }

    /// Like [`Self::parse_choice`], but an unknown key selects the base filter.
    pub fn parse_or_base(s: &str) -> Self {
        Self::parse_choice(s).unwrap_or_else(|| {
            warn!("Unknown filter {s:?}, using base instead.");
            Self::Base
        })
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::SearchFilter;

    #[test]
    fn parse_choice_by_name_and_index() {
        assert_eq!(SearchFilter::parse_choice("best"), Some(SearchFilter::Best));
        assert_eq!(
            SearchFilter::parse_choice(" Popular-New "),
            Some(SearchFilter::PopularNew)
        );
        assert_eq!(SearchFilter::parse_choice("1"), Some(SearchFilter::Popular));
        assert_eq!(SearchFilter::parse_choice("4"), None);
        assert_eq!(SearchFilter::parse_choice("hot"), None);
    }

    #[test]
    fn unknown_filter_is_base() {
        assert_eq!(SearchFilter::parse_or_base("hot"), SearchFilter::Base);
        assert_eq!(SearchFilter::parse_or_base("7"), SearchFilter::Base);
        assert_eq!(SearchFilter::parse_or_base(""), SearchFilter::Base);
        assert_eq!(SearchFilter::parse_or_base("2"), SearchFilter::Best);
    }

    #[test]
    fn names_round_trip_through_choice() {
        for filter in SearchFilter::iter() {
            assert_eq!(SearchFilter::parse_choice(&filter.to_string()), Some(filter));
        }
    }

    #[test]
    fn every_url_is_a_storefront_search() {
        for filter in SearchFilter::iter() {
            assert!(filter
                .url()
                .starts_with("https://store.steampowered.com/search/"));
        }
    }
}
