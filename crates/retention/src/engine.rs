//! The keep/delete decision engine
//!
//! `decide` is a pure function: given timestamped entities, a policy and
//! an explicit "now", it partitions the input into the identifiers to
//! keep and the identifiers to delete. The newest `retain_count` entities
//! survive unconditionally; the rest survive only while younger than the
//! age threshold. The floor guarantees survivors even when every entity
//! is past the threshold.

use chrono::{DateTime, Duration, Local};

/// An identifiable thing subject to retention (a snapshot, or an
/// artifact-file group keyed by its run timestamp)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedEntity {
    /// Opaque name; embeds `created_at` per the naming convention
    pub identifier: String,
    /// Creation instant decoded from the identifier
    pub created_at: DateTime<Local>,
}

impl TimestampedEntity {
    pub fn new(identifier: impl Into<String>, created_at: DateTime<Local>) -> Self {
        Self {
            identifier: identifier.into(),
            created_at,
        }
    }
}

/// Retention policy for one pass, immutable per invocation
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Entities older than this become eligible for deletion
    pub older_than: Duration,
    /// Newest entities always kept, regardless of age
    pub retain_count: usize,
}

/// Exact partition of the input set: every input identifier lands in
/// `keep` or `delete`, never both
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionDecision {
    pub keep: Vec<String>,
    pub delete: Vec<String>,
}

/// Partition `entities` into keep/delete under `policy`
///
/// 1. Sort newest-first; equal timestamps break by identifier, ascending,
///    so repeated calls with the same input are identical.
/// 2. The newest `retain_count` are kept unconditionally (the floor).
/// 3. Beyond the floor, anything with `now - created_at > older_than`
///    is deleted; everything younger stays.
pub fn decide(
    mut entities: Vec<TimestampedEntity>,
    policy: &RetentionPolicy,
    now: DateTime<Local>,
) -> RetentionDecision {
    entities.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });

    let mut decision = RetentionDecision::default();

    for (idx, entity) in entities.into_iter().enumerate() {
        if idx < policy.retain_count {
            decision.keep.push(entity.identifier);
        } else if now - entity.created_at > policy.older_than {
            decision.delete.push(entity.identifier);
        } else {
            decision.keep.push(entity.identifier);
        }
    }

    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days_ago(now: DateTime<Local>, days: i64) -> DateTime<Local> {
        now - Duration::days(days)
    }

    /// Five snapshots aged 10, 8, 6, 4 and 2 days
    fn sample_entities(now: DateTime<Local>) -> Vec<TimestampedEntity> {
        [10, 8, 6, 4, 2]
            .iter()
            .map(|&d| TimestampedEntity::new(format!("snap-{}d", d), days_ago(now, d)))
            .collect()
    }

    fn policy(days: i64, retain: usize) -> RetentionPolicy {
        RetentionPolicy {
            older_than: Duration::days(days),
            retain_count: retain,
        }
    }

    #[test]
    fn test_floor_protects_newest_then_age_prunes_rest() {
        let now = Local::now();
        let decision = decide(sample_entities(now), &policy(5, 3), now);

        assert_eq!(decision.keep, vec!["snap-2d", "snap-4d", "snap-6d"]);
        assert_eq!(decision.delete, vec!["snap-8d", "snap-10d"]);
    }

    #[test]
    fn test_zero_floor_prunes_by_age_alone() {
        let now = Local::now();
        let decision = decide(sample_entities(now), &policy(5, 0), now);

        assert_eq!(decision.keep, vec!["snap-2d", "snap-4d"]);
        assert_eq!(decision.delete, vec!["snap-6d", "snap-8d", "snap-10d"]);
    }

    #[test]
    fn test_empty_input_yields_empty_partition() {
        let now = Local::now();
        let decision = decide(Vec::new(), &policy(5, 3), now);
        assert!(decision.keep.is_empty());
        assert!(decision.delete.is_empty());
    }

    #[test]
    fn test_all_younger_than_threshold_all_kept() {
        let now = Local::now();
        let decision = decide(sample_entities(now), &policy(30, 0), now);
        assert_eq!(decision.keep.len(), 5);
        assert!(decision.delete.is_empty());
    }

    #[test]
    fn test_floor_larger_than_input_keeps_everything() {
        let now = Local::now();
        let decision = decide(sample_entities(now), &policy(1, 10), now);
        assert_eq!(decision.keep.len(), 5);
        assert!(decision.delete.is_empty());
    }

    #[test]
    fn test_zero_age_threshold_deletes_all_beyond_floor() {
        let now = Local::now();
        let decision = decide(sample_entities(now), &policy(0, 2), now);
        assert_eq!(decision.keep, vec!["snap-2d", "snap-4d"]);
        assert_eq!(decision.delete.len(), 3);
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let now = Local::now();
        let entities = sample_entities(now);
        let idents: Vec<_> = entities.iter().map(|e| e.identifier.clone()).collect();

        let decision = decide(entities, &policy(5, 3), now);

        let mut all: Vec<_> = decision
            .keep
            .iter()
            .chain(decision.delete.iter())
            .cloned()
            .collect();
        all.sort();
        let mut expected = idents;
        expected.sort();
        assert_eq!(all, expected);

        for id in &decision.keep {
            assert!(!decision.delete.contains(id));
        }
    }

    #[test]
    fn test_floor_guarantee_holds_when_everything_is_old() {
        let now = Local::now();
        let decision = decide(sample_entities(now), &policy(1, 3), now);
        assert_eq!(decision.keep.len(), 3);
        assert_eq!(decision.delete.len(), 2);
    }

    #[test]
    fn test_identical_timestamps_break_ties_by_identifier() {
        let now = Local::now();
        let at = days_ago(now, 9);
        let entities = vec![
            TimestampedEntity::new("snap-b", at),
            TimestampedEntity::new("snap-a", at),
            TimestampedEntity::new("snap-c", at),
        ];

        let first = decide(entities.clone(), &policy(5, 1), now);
        let second = decide(entities, &policy(5, 1), now);

        assert_eq!(first, second);
        assert_eq!(first.keep, vec!["snap-a"]);
        assert_eq!(first.delete, vec!["snap-b", "snap-c"]);
    }
}
