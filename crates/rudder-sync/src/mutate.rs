use serde_json::Map;
use tracing::info;

use crate::client::ApiClient;
use crate::config::{SyncSettings, UpdatePolicy};
use crate::error::ApiResult;
use crate::object::{ConfigObject, ObjectKind};
use crate::payload::{self, ApiCall};

/// What a mutator did with one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Calls were issued and all succeeded.
    Applied,
    /// Dry run: calls were only logged.
    Planned,
    /// Update found nothing to change.
    Unchanged,
    /// Update policy is `skip`.
    Skipped,
}

/// Create, update and delete against one destination client.
pub struct Mutator<'a> {
    client: &'a ApiClient,
    settings: &'a SyncSettings,
}

impl<'a> Mutator<'a> {
    pub fn new(client: &'a ApiClient, settings: &'a SyncSettings) -> Self {
        Self { client, settings }
    }

    pub async fn create(&self, kind: ObjectKind, obj: &ConfigObject) -> ApiResult<Outcome> {
        let calls = payload::create_calls(kind, obj, self.settings);
        self.execute(&calls).await
    }

    /// `existing` is the destination's copy, used by the `changed` policy.
    pub async fn update(
        &self,
        kind: ObjectKind,
        obj: &ConfigObject,
        existing: Option<&ConfigObject>,
    ) -> ApiResult<Outcome> {
        match self.settings.update_policy {
            UpdatePolicy::Skip => {
                info!(%kind, id = obj.id(), "Update not applied (policy: skip)");
                Ok(Outcome::Skipped)
            }
            UpdatePolicy::Changed
                if existing.is_some_and(|dest| {
                    payload::update_payload(kind, obj, self.settings)
                        == payload::update_payload(kind, dest, self.settings)
                }) =>
            {
                Ok(Outcome::Unchanged)
            }
            UpdatePolicy::Changed | UpdatePolicy::Always => {
                let call = payload::update_call(kind, obj, self.settings);
                self.execute(std::slice::from_ref(&call)).await
            }
        }
    }

    pub async fn delete(&self, kind: ObjectKind, id: &str) -> ApiResult<Outcome> {
        let call = payload::delete_call(kind, id);
        self.execute(std::slice::from_ref(&call)).await
    }

    /// Run calls in order, stopping at the first failure.
    async fn execute(&self, calls: &[ApiCall]) -> ApiResult<Outcome> {
        if self.settings.dry_run {
            for call in calls {
                info!(method = %call.method, path = %call.path, "[dry-run] would call");
            }
            return Ok(Outcome::Planned);
        }
        for call in calls {
            self.client
                .request(call.method.clone(), &call.path, &Map::new(), &call.body)
                .await?;
        }
        Ok(Outcome::Applied)
    }
}
