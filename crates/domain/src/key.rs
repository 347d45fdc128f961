//! Blob keys are `<user_id>/<file_identifier>`, identical in both containers.

pub fn user_prefix(user_id: &str) -> String {
    format!("{user_id}/")
}

/// Prefixes `blob_name` with the user's namespace unless it already carries it.
pub fn normalize_blob_name(user_id: &str, blob_name: &str) -> String {
    let prefix = user_prefix(user_id);
    if blob_name.starts_with(&prefix) {
        blob_name.to_owned()
    } else {
        format!("{prefix}{blob_name}")
    }
}
