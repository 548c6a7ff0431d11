//! Shorthand constructors for `FindOptions`

use std::time::Duration;

use mongodb::bson::Document;
use mongodb::options::{Collation, CursorType, FindOptions, Hint};

/// Skip the first `n` matching documents
pub fn skip(n: u64) -> FindOptions {
    FindOptions::builder().skip(n).build()
}

/// Return at most `n` documents
pub fn limit(n: i64) -> FindOptions {
    FindOptions::builder().limit(n).build()
}

/// Sort by an arbitrary sort document
pub fn sort(sort: Document) -> FindOptions {
    FindOptions::builder().sort(sort).build()
}

/// Sort ascending by one field
pub fn asc(field: &str) -> FindOptions {
    sort(sort_doc(field, 1))
}

/// Sort descending by one field
pub fn desc(field: &str) -> FindOptions {
    sort(sort_doc(field, -1))
}

/// Skip/limit pagination with an optional sort list
///
/// Each entry in `sorts` is a field name, prefixed with `-` for descending
/// or (optionally) `+` for ascending.
///
/// ```ignore
/// let opts = find::page(20, 10, &["-created_at", "name"]);
/// ```
pub fn page(skip: u64, limit: i64, sorts: &[&str]) -> FindOptions {
    let mut options = FindOptions::builder().skip(skip).limit(limit).build();
    if !sorts.is_empty() {
        let mut sort = Document::new();
        for entry in sorts {
            match entry.strip_prefix('-') {
                Some(field) => sort.insert(field, -1),
                None => sort.insert(entry.strip_prefix('+').unwrap_or(entry), 1),
            };
        }
        options.sort = Some(sort);
    }
    options
}

/// Use an arbitrary projection document
pub fn projection(projection: Document) -> FindOptions {
    FindOptions::builder().projection(projection).build()
}

/// Project only the named fields
pub fn project(fields: &[&str]) -> FindOptions {
    let mut doc = Document::new();
    for field in fields {
        doc.insert(*field, 1);
    }
    projection(doc)
}

/// Set the per-batch document count
pub fn batch_size(n: u32) -> FindOptions {
    FindOptions::builder().batch_size(n).build()
}

/// Allow partial results from a sharded cluster with downed shards
pub fn allow_partial_results(allow: bool) -> FindOptions {
    FindOptions::builder().allow_partial_results(allow).build()
}

/// Keep the server-side cursor alive through idle periods
pub fn no_cursor_timeout(no_timeout: bool) -> FindOptions {
    FindOptions::builder().no_cursor_timeout(no_timeout).build()
}

/// Select the cursor type (tailable etc.)
pub fn cursor_type(cursor_type: CursorType) -> FindOptions {
    FindOptions::builder().cursor_type(cursor_type).build()
}

/// Force a specific index
pub fn hint(hint: Hint) -> FindOptions {
    FindOptions::builder().hint(hint).build()
}

/// Exclusive upper index bound
pub fn max(max: Document) -> FindOptions {
    FindOptions::builder().max(max).build()
}

/// Inclusive lower index bound
pub fn min(min: Document) -> FindOptions {
    FindOptions::builder().min(min).build()
}

/// Cap server-side execution time
pub fn max_time(duration: Duration) -> FindOptions {
    FindOptions::builder().max_time(duration).build()
}

/// Cap the wait for new data on a tailable await cursor
pub fn max_await_time(duration: Duration) -> FindOptions {
    FindOptions::builder().max_await_time(duration).build()
}

/// Use a specific collation for string comparisons
pub fn collation(collation: Collation) -> FindOptions {
    FindOptions::builder().collation(collation).build()
}

/// Collate with the given locale
///
/// Locale names: <https://www.mongodb.com/docs/manual/reference/collation-locales-defaults/>
pub fn locale(locale: &str) -> FindOptions {
    collation(Collation::builder().locale(locale).build())
}

fn sort_doc(field: &str, direction: i32) -> Document {
    let mut doc = Document::new();
    doc.insert(field, direction);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{Bson, doc};

    #[test]
    fn test_skip_limit() {
        assert_eq!(skip(5).skip, Some(5));
        assert_eq!(limit(10).limit, Some(10));
    }

    #[test]
    fn test_asc_desc() {
        assert_eq!(asc("name").sort, Some(doc! { "name": 1 }));
        assert_eq!(desc("created_at").sort, Some(doc! { "created_at": -1 }));
    }

    #[test]
    fn test_project() {
        let options = project(&["name", "email"]);
        assert_eq!(options.projection, Some(doc! { "name": 1, "email": 1 }));
    }

    #[test]
    fn test_page_with_sorts() {
        let options = page(20, 10, &["-created_at", "+name", "code"]);
        assert_eq!(options.skip, Some(20));
        assert_eq!(options.limit, Some(10));
        let sort = options.sort.unwrap();
        assert_eq!(sort.get("created_at"), Some(&Bson::Int32(-1)));
        assert_eq!(sort.get("name"), Some(&Bson::Int32(1)));
        assert_eq!(sort.get("code"), Some(&Bson::Int32(1)));
    }

    #[test]
    fn test_page_without_sorts() {
        let options = page(0, 25, &[]);
        assert!(options.sort.is_none());
    }

    #[test]
    fn test_locale() {
        let options = locale("zh");
        assert_eq!(options.collation.unwrap().locale, "zh");
    }
}
