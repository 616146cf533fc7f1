pub mod pool;
pub mod schema;

/// Point a connection string at the `<name>_test` database.
///
/// Query parameters are kept; a name already ending in `_test` is unchanged.
pub fn test_database_url(database_url: &str) -> String {
    let (base, query) = match database_url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (database_url, None),
    };

    let Some((prefix, db_name)) = base.rsplit_once('/') else {
        return database_url.to_string();
    };
    if db_name.is_empty() || db_name.ends_with("_test") {
        return database_url.to_string();
    }

    match query {
        Some(query) => format!("{prefix}/{db_name}_test?{query}"),
        None => format!("{prefix}/{db_name}_test"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_test_suffix() {
        assert_eq!(
            test_database_url("postgres://u:p@localhost:5432/tavola"),
            "postgres://u:p@localhost:5432/tavola_test"
        );
    }

    #[test]
    fn keeps_query_string() {
        assert_eq!(
            test_database_url("postgres://localhost/tavola?sslmode=disable"),
            "postgres://localhost/tavola_test?sslmode=disable"
        );
    }

    #[test]
    fn already_test_database_is_unchanged() {
        let url = "postgres://localhost/tavola_test";
        assert_eq!(test_database_url(url), url);
    }
}
