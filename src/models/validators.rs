use std::sync::LazyLock;

use regex::Regex;

/// Regex for validating trigger names (job keys).
/// Examples: "daily", "prod.db_weekly", "app-2"
pub static TRIGGER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());
