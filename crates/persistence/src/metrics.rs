//! Portal store metrics.
//!
//! Every repository query is timed into `portal_query_duration_seconds`,
//! labelled by query name. Errors crossing the store boundary are counted in
//! `portal_store_errors_total` by kind.

use metrics::{counter, histogram};
use std::time::Instant;

const QUERY_DURATION: &str = "portal_query_duration_seconds";
const STORE_ERRORS: &str = "portal_store_errors_total";

pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!(QUERY_DURATION, "query" => query_name).record(duration_secs);
}

/// Counts a failed store call. `kind` is `not_found`, `conflict` or `backend`.
pub fn record_store_error(kind: &'static str) {
    counter!(STORE_ERRORS, "kind" => kind).increment(1);
}

/// Times one query from construction to `record`.
///
/// ```ignore
/// let timer = QueryTimer::new("find_portal_client_by_id");
/// let result = sqlx::query_as::<_, ClientEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
