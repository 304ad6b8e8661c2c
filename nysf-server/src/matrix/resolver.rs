//! Latest-submission resolver
//!
//! Ids are assigned monotonically at creation, so the highest id within a
//! division is its most recent submission.

use nysf_common::db::SubmissionStatus;
use std::collections::HashMap;

/// The columns of a submission the resolver needs
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SubmissionHead {
    pub id: i64,
    pub division: String,
    pub status: SubmissionStatus,
}

/// Select one submission per division: the maximum id among non-draft ones
///
/// Drafts never survive, even when they are a division's only record.
/// Result is ordered by id.
pub fn resolve_latest<I>(heads: I) -> Vec<SubmissionHead>
where
    I: IntoIterator<Item = SubmissionHead>,
{
    let mut latest: HashMap<String, SubmissionHead> = HashMap::new();

    for head in heads {
        if head.status == SubmissionStatus::Draft || head.division.is_empty() {
            continue;
        }
        match latest.get(&head.division) {
            Some(current) if current.id >= head.id => {}
            _ => {
                latest.insert(head.division.clone(), head);
            }
        }
    }

    let mut resolved: Vec<SubmissionHead> = latest.into_values().collect();
    resolved.sort_by_key(|h| h.id);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(id: i64, division: &str, status: SubmissionStatus) -> SubmissionHead {
        SubmissionHead {
            id,
            division: division.to_string(),
            status,
        }
    }

    #[test]
    fn test_max_id_non_draft_wins() {
        let resolved = resolve_latest(vec![
            head(1, "Maharagama", SubmissionStatus::Submitted),
            head(4, "Maharagama", SubmissionStatus::Submitted),
            head(7, "Maharagama", SubmissionStatus::Draft),
            head(2, "Kaduwela", SubmissionStatus::Submitted),
        ]);

        let ids: Vec<i64> = resolved.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_draft_only_division_contributes_nothing() {
        let resolved = resolve_latest(vec![
            head(1, "Kesbewa", SubmissionStatus::Draft),
            head(2, "Kesbewa", SubmissionStatus::Draft),
        ]);

        assert!(resolved.is_empty());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let forward = resolve_latest(vec![
            head(3, "A", SubmissionStatus::Submitted),
            head(9, "A", SubmissionStatus::Submitted),
        ]);
        let backward = resolve_latest(vec![
            head(9, "A", SubmissionStatus::Submitted),
            head(3, "A", SubmissionStatus::Submitted),
        ]);

        assert_eq!(forward, backward);
        assert_eq!(forward[0].id, 9);
    }

    #[test]
    fn test_empty_division_is_ignored() {
        let resolved = resolve_latest(vec![head(1, "", SubmissionStatus::Submitted)]);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_whitespace_division_is_its_own_key() {
        let resolved = resolve_latest(vec![
            head(1, " ", SubmissionStatus::Submitted),
            head(2, "", SubmissionStatus::Submitted),
            head(3, " ", SubmissionStatus::Submitted),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, 3);
        assert_eq!(resolved[0].division, " ");
    }
}
