#[macro_use]
pub mod macros;

pub mod fs_json_util;
pub mod text;

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
    pub use regex::Regex;
    pub use scraper::Selector;
}
