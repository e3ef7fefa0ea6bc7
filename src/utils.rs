//! Label normalization helpers shared by ingestion and aggregation.

use indexmap::IndexSet;

/// Collapse runs of whitespace in a survey label into single spaces and trim.
pub fn normalize_label<T: AsRef<str>>(label: T) -> String {
    let mut normalized = String::with_capacity(label.as_ref().len());
    let mut pending_space = false;
    for ch in label.as_ref().trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            normalized.push(' ');
            pending_space = false;
        }
        normalized.push(ch);
    }
    normalized
}

/// Distinct labels in first-occurrence order.
pub fn distinct_labels<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    labels
        .into_iter()
        .map(String::as_str)
        .collect::<IndexSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
