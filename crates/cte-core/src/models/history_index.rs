//! Derived groupings over the persisted history collection.
//!
//! These are full recomputes on every call: the collections are small (one
//! entry per archived turn) and a fresh recompute keeps the sidebar views
//! trivially consistent with the underlying data.

use std::collections::BTreeMap;

use super::context::CteContext;
use super::history::HistoryEntry;

/// Group all entries by regulatory context. Each group is sorted by
/// timestamp descending (most recent first). Contexts with no entries are
/// absent from the map.
pub fn group_by_context(entries: &[HistoryEntry]) -> BTreeMap<CteContext, Vec<&HistoryEntry>> {
    let mut grouped: BTreeMap<CteContext, Vec<&HistoryEntry>> = BTreeMap::new();
    for entry in entries {
        grouped.entry(entry.context).or_default().push(entry);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|e| std::cmp::Reverse(e.timestamp));
    }
    grouped
}

/// Same grouping, restricted to entries tagged with the given project.
pub fn group_by_context_for_project<'a>(
    entries: &'a [HistoryEntry],
    project_id: &str,
) -> BTreeMap<CteContext, Vec<&'a HistoryEntry>> {
    let mut grouped: BTreeMap<CteContext, Vec<&HistoryEntry>> = BTreeMap::new();
    for entry in entries {
        if entry.project_id.as_deref() == Some(project_id) {
            grouped.entry(entry.context).or_default().push(entry);
        }
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|e| std::cmp::Reverse(e.timestamp));
    }
    grouped
}
