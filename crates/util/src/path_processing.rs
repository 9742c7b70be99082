use std::path::PathBuf;

use dirs_next::home_dir;

/// Expands a leading `~`, `~/` or `~\` to the user's home directory.
///
/// Paths without a leading tilde are returned trimmed but otherwise unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    let rest = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\"));
    match rest {
        Some(rest) => home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest),
        None => PathBuf::from(trimmed),
    }
}
