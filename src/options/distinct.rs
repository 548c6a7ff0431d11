//! Shorthand constructors for `DistinctOptions`

use std::time::Duration;

use mongodb::options::{Collation, DistinctOptions};

/// Use a specific collation for string comparisons
pub fn collation(collation: Collation) -> DistinctOptions {
    DistinctOptions::builder().collation(collation).build()
}

/// Collate with the given locale
pub fn locale(locale: &str) -> DistinctOptions {
    collation(Collation::builder().locale(locale).build())
}

/// Cap server-side execution time
pub fn max_time(duration: Duration) -> DistinctOptions {
    DistinctOptions::builder().max_time(duration).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale() {
        let options = locale("simple");
        assert_eq!(options.collation.unwrap().locale, "simple");
    }

    #[test]
    fn test_max_time() {
        let options = max_time(Duration::from_secs(2));
        assert_eq!(options.max_time, Some(Duration::from_secs(2)));
    }
}
