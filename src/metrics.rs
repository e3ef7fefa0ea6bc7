use serde::Serialize;

use crate::suppression::GroupSlot;
use crate::types::GroupLabel;

/// One group's share of the filtered respondents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupShare {
    /// Group label.
    pub label: GroupLabel,
    /// Respondents in the group.
    pub count: usize,
    /// `count / total * scale`; zero when there are no respondents.
    pub share: f64,
    /// Whether the group passed suppression.
    pub visible: bool,
}

/// Shares for every slot, keeping slot order.
///
/// `total` is the number of filtered respondents, not the sum of group counts:
/// multi-valued groups overlap, so shares need not add up to `scale`.
pub fn group_shares(slots: &[GroupSlot], total: usize, scale: f64) -> Vec<GroupShare> {
    slots
        .iter()
        .map(|slot| {
            let count = slot.respondent_count();
            GroupShare {
                label: slot.label.clone(),
                count,
                share: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * scale
                },
                visible: slot.visible,
            }
        })
        .collect()
}

/// Signed share difference of every group against `reference`.
///
/// Returns `None` when `reference` is not one of the shares. The reference
/// group itself maps to `None` in the output.
pub fn share_divergence(shares: &[GroupShare], reference: &str) -> Option<Vec<(GroupLabel, Option<f64>)>> {
    let anchor = shares.iter().find(|share| share.label == reference)?;
    Some(
        shares
            .iter()
            .map(|share| {
                let divergence = if share.label == anchor.label {
                    None
                } else {
                    Some(share.share - anchor.share)
                };
                (share.label.clone(), divergence)
            })
            .collect(),
    )
}
