use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::ApiError;
use crate::mutate::Outcome;
use crate::object::ObjectKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Counters for one object kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub update_skipped: usize,
    pub deleted: usize,
    /// Extra objects left in place because a dependent kind was unreadable.
    pub delete_skipped: usize,
    pub failed: usize,
    /// The kind could not be fetched and was not touched.
    pub unavailable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub kind: ObjectKind,
    pub id: Option<String>,
    pub action: Action,
    pub category: &'static str,
    pub error: String,
}

/// Summary of one sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub kinds: BTreeMap<ObjectKind, KindStats>,
    pub failures: Vec<Failure>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn stats(&self, kind: ObjectKind) -> KindStats {
        self.kinds.get(&kind).cloned().unwrap_or_default()
    }

    pub fn record(&mut self, kind: ObjectKind, action: Action, outcome: Outcome) {
        let stats = self.kinds.entry(kind).or_default();
        match (action, outcome) {
            (_, Outcome::Unchanged) => stats.unchanged += 1,
            (_, Outcome::Skipped) => stats.update_skipped += 1,
            (Action::Create, _) => stats.created += 1,
            (Action::Update, _) => stats.updated += 1,
            (Action::Delete, _) => stats.deleted += 1,
            (Action::Fetch, _) => {}
        }
    }

    pub fn record_failure(
        &mut self,
        kind: ObjectKind,
        id: Option<&str>,
        action: Action,
        error: &ApiError,
    ) {
        let stats = self.kinds.entry(kind).or_default();
        if action == Action::Fetch {
            stats.unavailable = true;
        } else {
            stats.failed += 1;
        }
        self.failures.push(Failure {
            kind,
            id: id.map(str::to_string),
            action,
            category: error.category(),
            error: error.to_string(),
        });
    }

    pub fn record_delete_skipped(&mut self, kind: ObjectKind, count: usize) {
        self.kinds.entry(kind).or_default().delete_skipped += count;
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn total_created(&self) -> usize {
        self.kinds.values().map(|s| s.created).sum()
    }

    pub fn total_updated(&self) -> usize {
        self.kinds.values().map(|s| s.updated).sum()
    }

    pub fn total_deleted(&self) -> usize {
        self.kinds.values().map(|s| s.deleted).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_outcomes_per_kind() {
        let mut report = SyncReport::new(false);
        report.record(ObjectKind::Groups, Action::Create, Outcome::Applied);
        report.record(ObjectKind::Groups, Action::Update, Outcome::Unchanged);
        report.record(ObjectKind::Groups, Action::Update, Outcome::Skipped);
        report.record(ObjectKind::Rules, Action::Delete, Outcome::Planned);

        let groups = report.stats(ObjectKind::Groups);
        assert_eq!(groups.created, 1);
        assert_eq!(groups.unchanged, 1);
        assert_eq!(groups.update_skipped, 1);
        assert_eq!(report.stats(ObjectKind::Rules).deleted, 1);
        assert_eq!(report.stats(ObjectKind::Directives), KindStats::default());
        assert!(!report.has_failures());
    }

    #[test]
    fn fetch_failure_marks_kind_unavailable() {
        let mut report = SyncReport::new(false);
        let err = ApiError::decode("https://h/rules", "missing data.rules list");
        report.record_failure(ObjectKind::Rules, None, Action::Fetch, &err);

        let rules = report.stats(ObjectKind::Rules);
        assert!(rules.unavailable);
        assert_eq!(rules.failed, 0);
        assert!(report.has_failures());
        assert_eq!(report.failures[0].category, "decode");
    }

    #[test]
    fn withheld_deletes_are_counted_separately() {
        let mut report = SyncReport::new(false);
        report.record_delete_skipped(ObjectKind::Groups, 2);

        let groups = report.stats(ObjectKind::Groups);
        assert_eq!(groups.delete_skipped, 2);
        assert_eq!(groups.deleted, 0);
        assert_eq!(report.total_deleted(), 0);
        assert!(!report.has_failures());
    }
}
