/// All remote primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Cache key used when no user identity is supplied.
pub const ANONYMOUS_CACHE_KEY: &str = "anonymous";

/// Prefix of every signed-in cache key; keeps user ids out of the
/// anonymous key's namespace.
pub const USER_CACHE_PREFIX: &str = "user:";

/// Normalize a caller-supplied user identity.
///
/// An absent or blank identity means "unauthenticated" and routes every
/// operation to local storage.
pub fn user_key(user_id: Option<&str>) -> Option<&str> {
    user_id.map(str::trim).filter(|id| !id.is_empty())
}

/// Cache key for a (possibly absent) user identity.
pub fn cache_key(user_id: Option<&str>) -> String {
    match user_key(user_id) {
        Some(id) => format!("{USER_CACHE_PREFIX}{id}"),
        None => ANONYMOUS_CACHE_KEY.to_string(),
    }
}
