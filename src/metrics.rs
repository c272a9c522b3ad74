use crate::totals::GroupTotals;
use crate::types::GroupKey;

/// Aggregate share metrics for a final group mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSkew {
    pub grand_total: f64,
    pub groups: usize,
    pub max_share: f64,
    pub min_share: f64,
    pub per_group: Vec<GroupShare>,
}

/// Per-group share of the grand total for skew inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupShare {
    pub group: GroupKey,
    pub total: f64,
    pub share: f64,
}

/// Compute share metrics from a final aggregate.
///
/// Returns `None` for empty totals. Shares are fractions of the grand total;
/// when the grand total is zero every share is reported as zero.
pub fn group_skew(totals: &GroupTotals) -> Option<GroupSkew> {
    if totals.is_empty() {
        return None;
    }
    let grand_total = totals.grand_total();
    let share_of = |value: f64| {
        if grand_total == 0.0 {
            0.0
        } else {
            value / grand_total
        }
    };
    let mut per_group: Vec<GroupShare> = totals
        .iter()
        .map(|(group, total)| GroupShare {
            group: group.clone(),
            total,
            share: share_of(total),
        })
        .collect();
    per_group.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.group.cmp(&b.group))
    });
    let max_share = per_group.first().map(|entry| entry.share).unwrap_or(0.0);
    let min_share = per_group.last().map(|entry| entry.share).unwrap_or(0.0);
    Some(GroupSkew {
        grand_total,
        groups: per_group.len(),
        max_share,
        min_share,
        per_group,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(entries: &[(&str, f64)]) -> GroupTotals {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn group_skew_reports_shares_sorted_by_total() {
        let skew = group_skew(&totals(&[("A", 60.0), ("B", 30.0), ("C", 10.0)])).expect("skew");
        assert_eq!(skew.groups, 3);
        assert_eq!(skew.grand_total, 100.0);
        assert_eq!(skew.per_group[0].group, "A");
        assert!((skew.max_share - 0.6).abs() < 1e-9);
        assert!((skew.min_share - 0.1).abs() < 1e-9);
    }

    #[test]
    fn group_skew_is_none_for_empty_totals() {
        assert_eq!(group_skew(&GroupTotals::new()), None);
    }

    #[test]
    fn group_skew_handles_zero_grand_total() {
        let skew = group_skew(&totals(&[("A", 0.0), ("B", 0.0)])).expect("skew");
        assert_eq!(skew.grand_total, 0.0);
        assert_eq!(skew.max_share, 0.0);
    }
}
