/// Compiles a CSS selector once and hands out a `&'static Selector`.
///
/// Panics on first use if the selector literal is malformed, so keep the
/// argument a literal (or a `const`).
#[macro_export]
macro_rules! selector {
    ($e: expr) => {{
        use $crate::__private::{Lazy, Selector};
        static SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse($e).unwrap());
        &*SELECTOR
    }};
}

/// Same as [`selector!`] but for regular expressions.
#[macro_export]
macro_rules! regex {
    ($e: expr) => {{
        use $crate::__private::{Lazy, Regex};
        static PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new($e).unwrap());
        &*PATTERN
    }};
}
