//! Fetch, diff and apply.
//!
//! A run fetches every kind from both profiles, then walks the kinds in
//! [`ObjectKind::SYNC_ORDER`] creating or updating destination objects, then
//! walks them backwards deleting destination objects the source no longer
//! has. Calls are awaited one at a time; a failed call is recorded in the
//! [`SyncReport`] and the run moves on. Nothing is rolled back.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::client::ApiClient;
use crate::config::{SyncConfig, SyncSettings};
use crate::error::{ApiError, ApiResult};
use crate::mutate::Mutator;
use crate::object::{ConfigObject, ObjectKind};
use crate::report::{Action, SyncReport};

/// Objects of `a` whose id does not appear in `b`, in `a`'s order.
pub fn find_missing<'a>(a: &'a [ConfigObject], b: &[ConfigObject]) -> Vec<&'a ConfigObject> {
    let ids: HashSet<&str> = b.iter().map(ConfigObject::id).collect();
    a.iter().filter(|obj| !ids.contains(obj.id())).collect()
}

/// What to do with one source object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Upsert<'a> {
    Create(&'a ConfigObject),
    Update {
        source: &'a ConfigObject,
        dest: &'a ConfigObject,
    },
}

impl<'a> Upsert<'a> {
    pub fn source(&self) -> &'a ConfigObject {
        match *self {
            Self::Create(obj) => obj,
            Self::Update { source, .. } => source,
        }
    }
}

/// Diff of one kind between source and destination.
#[derive(Debug, Clone)]
pub struct KindPlan<'a> {
    pub kind: ObjectKind,
    /// One entry per source object, in source order.
    pub upserts: Vec<Upsert<'a>>,
    pub delete: Vec<&'a ConfigObject>,
}

impl<'a> KindPlan<'a> {
    pub fn creates(&self) -> impl Iterator<Item = &'a ConfigObject> + '_ {
        self.upserts.iter().filter_map(|u| match u {
            Upsert::Create(obj) => Some(*obj),
            Upsert::Update { .. } => None,
        })
    }

    pub fn updates(&self) -> impl Iterator<Item = &'a ConfigObject> + '_ {
        self.upserts.iter().filter_map(|u| match u {
            Upsert::Update { source, .. } => Some(*source),
            Upsert::Create(_) => None,
        })
    }
}

pub fn plan<'a>(
    kind: ObjectKind,
    source: &'a [ConfigObject],
    dest: &'a [ConfigObject],
) -> KindPlan<'a> {
    let existing: HashMap<&str, &ConfigObject> = dest.iter().map(|obj| (obj.id(), obj)).collect();
    let upserts = source
        .iter()
        .map(|obj| match existing.get(obj.id()) {
            Some(dest) => Upsert::Update { source: obj, dest },
            None => Upsert::Create(obj),
        })
        .collect();
    KindPlan {
        kind,
        upserts,
        delete: find_missing(dest, source),
    }
}

/// Both collections of one kind.
#[derive(Debug, Clone)]
pub struct KindSnapshot {
    pub kind: ObjectKind,
    pub source: Vec<ConfigObject>,
    pub dest: Vec<ConfigObject>,
}

/// Everything fetched at the start of a run.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Kinds fetched from both sides, in sync order.
    pub kinds: Vec<KindSnapshot>,
    /// Kinds left alone because one side could not be read.
    pub unavailable: Vec<(ObjectKind, ApiError)>,
}

impl Snapshot {
    pub fn plans(&self) -> Vec<KindPlan<'_>> {
        self.kinds
            .iter()
            .map(|s| plan(s.kind, &s.source, &s.dest))
            .collect()
    }
}

pub struct Reconciler {
    source: ApiClient,
    dest: ApiClient,
    settings: SyncSettings,
}

impl Reconciler {
    pub fn new(config: SyncConfig) -> reqwest::Result<Self> {
        let source = ApiClient::new(config.source, &config.settings)?;
        let dest = ApiClient::new(config.dest, &config.settings)?;
        Ok(Self::from_clients(source, dest, config.settings))
    }

    pub fn from_clients(source: ApiClient, dest: ApiClient, settings: SyncSettings) -> Self {
        Self {
            source,
            dest,
            settings,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Fetch every kind from both profiles. A kind whose source or
    /// destination list cannot be read is reported as unavailable, never
    /// treated as empty.
    pub async fn fetch(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for kind in ObjectKind::SYNC_ORDER {
            match self.fetch_kind(kind).await {
                Ok(kind_snapshot) => snapshot.kinds.push(kind_snapshot),
                Err(e) => {
                    warn!(%kind, error = %e, "Cannot read collection, leaving kind untouched");
                    snapshot.unavailable.push((kind, e));
                }
            }
        }
        snapshot
    }

    async fn fetch_kind(&self, kind: ObjectKind) -> ApiResult<KindSnapshot> {
        let mut source = self.source.list(kind).await?;
        let mut dest = self.dest.list(kind).await?;
        if self.settings.exclude_system {
            source.retain(|obj| !obj.is_system());
            dest.retain(|obj| !obj.is_system());
        }
        info!(%kind, source = source.len(), dest = dest.len(), "Fetched collections");
        Ok(KindSnapshot { kind, source, dest })
    }

    /// One full pass. Always completes; failures end up in the report.
    pub async fn run(&self) -> SyncReport {
        let snapshot = self.fetch().await;
        let mut report = SyncReport::new(self.settings.dry_run);
        for (kind, e) in &snapshot.unavailable {
            report.record_failure(*kind, None, Action::Fetch, e);
        }

        let plans = snapshot.plans();
        let mutator = Mutator::new(&self.dest, &self.settings);

        for plan in &plans {
            self.apply_upserts(&mutator, plan, &mut report).await;
        }
        // A kind can still be referenced by a later kind we failed to read,
        // so nothing at or before the last unreadable kind is deleted.
        let blocked_below = snapshot.unavailable.iter().map(|(kind, _)| *kind).max();
        for kind in ObjectKind::deletion_order() {
            let Some(plan) = plans.iter().find(|p| p.kind == kind) else {
                continue;
            };
            if blocked_below.is_some_and(|unread| kind < unread) {
                if !plan.delete.is_empty() {
                    warn!(
                        %kind,
                        extra = plan.delete.len(),
                        "Not deleting: a dependent collection could not be read"
                    );
                    report.record_delete_skipped(kind, plan.delete.len());
                }
                continue;
            }
            self.apply_deletes(&mutator, plan, &mut report).await;
        }

        report
    }

    async fn apply_upserts(&self, mutator: &Mutator<'_>, plan: &KindPlan<'_>, report: &mut SyncReport) {
        let kind = plan.kind;
        info!(%kind, missing = plan.creates().count(), "Objects missing from dest");

        for upsert in &plan.upserts {
            let id = upsert.source().id();
            let (action, result) = match *upsert {
                Upsert::Create(obj) => {
                    info!(%kind, id, "Does not exist in destination, creating");
                    (Action::Create, mutator.create(kind, obj).await)
                }
                Upsert::Update { source, dest } => {
                    info!(%kind, id, "Already exists in destination, updating");
                    (Action::Update, mutator.update(kind, source, Some(dest)).await)
                }
            };
            match result {
                Ok(outcome) => report.record(kind, action, outcome),
                Err(e) => report.record_failure(kind, Some(id), action, &e),
            }
        }
    }

    async fn apply_deletes(&self, mutator: &Mutator<'_>, plan: &KindPlan<'_>, report: &mut SyncReport) {
        let kind = plan.kind;
        info!(%kind, extra = plan.delete.len(), "Extra objects in dest");

        for obj in &plan.delete {
            info!(%kind, id = obj.id(), "Should not exist in destination, deleting");
            match mutator.delete(kind, obj.id()).await {
                Ok(outcome) => report.record(kind, Action::Delete, outcome),
                Err(e) => report.record_failure(kind, Some(obj.id()), Action::Delete, &e),
            }
        }
    }
}
