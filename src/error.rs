use crate::{engine::RoundId, search_filter::SearchFilter};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected markup at {url}: {cause:#}")]
    Extraction { url: String, cause: anyhow::Error },
    #[error("No titles are cached for the {filter} filter nor for the base filter")]
    EmptyPool { filter: SearchFilter },
    #[error("Round {0} does not exist or has already been answered")]
    UnknownRound(RoundId),
    #[error("Round {0} has expired")]
    RoundExpired(RoundId),
    #[error("Round {0} belongs to another player")]
    NotYourRound(RoundId),
}

impl Error {
    /// Whether the storefront (or the stats site) could not be read,
    /// as opposed to a problem with the game state itself.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Extraction { .. })
    }

    /// The URL involved in a fetch failure.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Transport { url, .. } | Self::Extraction { url, .. } => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::Error;
    use crate::search_filter::SearchFilter;

    #[test]
    fn extraction_is_fetch_failure() {
        let e = Error::Extraction {
            url: "https://steamcharts.com/app/440".to_owned(),
            cause: anyhow!("No stats found"),
        };
        assert!(e.is_fetch_failure());
        assert_eq!(e.url(), Some("https://steamcharts.com/app/440"));
        assert_eq!(
            e.to_string(),
            "Unexpected markup at https://steamcharts.com/app/440: No stats found"
        );
    }

    #[test]
    fn empty_pool_is_not_fetch_failure() {
        let e = Error::EmptyPool {
            filter: SearchFilter::PopularNew,
        };
        assert!(!e.is_fetch_failure());
        assert_eq!(e.url(), None);
        assert_eq!(
            e.to_string(),
            "No titles are cached for the popular-new filter nor for the base filter"
        );
    }
}
