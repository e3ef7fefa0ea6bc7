//! Post-aggregation minimum-response pass.
//!
//! Unlike [`crate::filter::filter_records`], which shrinks the record set
//! before grouping, suppression runs on finished summaries and never drops a
//! label: every label of the universe keeps its slot so chart layouts and
//! legends stay put while the threshold moves.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::{GroupLabel, GroupSummary};

/// One position in a view's label universe.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSlot {
    /// Label from the universe.
    pub label: GroupLabel,
    /// The group's statistics, `None` when no filtered respondent contributed.
    pub summary: Option<GroupSummary>,
    /// False when the group is hidden by the threshold or has no respondents.
    pub visible: bool,
}

impl GroupSlot {
    /// Respondent count, zero for empty placeholders.
    pub fn respondent_count(&self) -> usize {
        self.summary
            .as_ref()
            .map(|summary| summary.respondent_count)
            .unwrap_or(0)
    }

    /// The summary, but only while the slot is visible.
    pub fn visible_summary(&self) -> Option<&GroupSummary> {
        self.summary.as_ref().filter(|_| self.visible)
    }
}

/// True when a group with `respondent_count` respondents clears `threshold`.
pub fn meets_threshold(respondent_count: usize, threshold: u64) -> bool {
    respondent_count > 0 && respondent_count as u64 >= threshold
}

/// Lay `summaries` out over `universe`, hiding groups below `threshold`.
///
/// The output has exactly one slot per universe label, in universe order.
/// Summaries whose label is not in the universe are ignored.
pub fn suppress_by_threshold<S>(
    summaries: Vec<GroupSummary>,
    universe: &[S],
    threshold: u64,
) -> Vec<GroupSlot>
where
    S: AsRef<str>,
{
    let mut by_label: HashMap<GroupLabel, GroupSummary> = summaries
        .into_iter()
        .map(|summary| (summary.label.clone(), summary))
        .collect();
    universe
        .iter()
        .map(|label| {
            let label = label.as_ref();
            let summary = by_label.remove(label);
            let visible = summary
                .as_ref()
                .is_some_and(|summary| meets_threshold(summary.respondent_count, threshold));
            GroupSlot {
                label: label.to_string(),
                summary,
                visible,
            }
        })
        .collect()
}

/// Summaries of the visible slots, in slot order.
pub fn visible_summaries(slots: &[GroupSlot]) -> Vec<GroupSummary> {
    slots
        .iter()
        .filter_map(|slot| slot.visible_summary().cloned())
        .collect()
}
