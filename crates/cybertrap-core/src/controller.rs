// ── Controller ──
//
// Single entry point for the CLI and TUI. Owns the API client, the
// entity stores and the notifier. Reads go through `refresh`, writes
// through `execute`, and every write is followed by a re-fetch of the
// resource it touched.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cybertrap_api::{ApiClient, Session, TransportConfig};

use crate::command::{Command, CommandResult, ScanSubmission};
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{
    Domain, EntityId, MultiScan, Scan, ScheduledScan, Template, normalize_domain_name,
};
use crate::notify::{Notification, Notifier};
use crate::scope::ViewScope;
use crate::store::{DataStore, LoadState, Resource};

/// One fetched collection, not yet applied to the store.
enum Fetched {
    Domains(Vec<Domain>),
    Templates(Vec<Template>),
    Scans(Vec<Scan>),
    MultiScans(Vec<MultiScan>),
    ScheduledScans(Vec<ScheduledScan>),
}

/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ClientConfig,
    api: ApiClient,
    store: Arc<DataStore>,
    notifier: Notifier,
    cancel: CancellationToken,
}

impl Controller {
    /// Build the API client from `config`. Nothing is fetched until a
    /// refresh is requested.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let session = config
            .token
            .clone()
            .map_or_else(Session::anonymous, Session::bearer);
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let api = ApiClient::new(config.url.as_str(), &session, &transport)?;
        debug!(url = %api.base_url(), authenticated = session.is_authenticated(), "controller ready");

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                api,
                store: Arc::new(DataStore::new()),
                notifier: Notifier::new(),
                cancel: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Subscribe to mutation outcomes.
    pub fn notifications(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.inner.notifier.subscribe()
    }

    /// A fresh scope for a screen that is about to mount. Cancelled by
    /// [`shutdown`](Self::shutdown) along with every other scope.
    pub fn scope(&self) -> ViewScope {
        ViewScope::child_of(&self.inner.cancel)
    }

    /// Cancel every outstanding scope.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        debug!("controller shut down");
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Replace one collection with the latest fetch result.
    ///
    /// On failure the previous snapshot is kept and the load state
    /// becomes [`LoadState::Failed`].
    pub async fn refresh(&self, resource: Resource) -> Result<(), CoreError> {
        let store = &self.inner.store;
        store.set_load_state(resource, LoadState::Loading);

        match self.fetch(resource).await {
            Ok(fetched) => {
                self.apply(fetched);
                info!(%resource, version = store.version(resource), "refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(%resource, error = %e, "refresh failed");
                store.set_load_state(resource, LoadState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Like [`refresh`](Self::refresh), but a result that arrives after
    /// `scope` ends is discarded and the store is left untouched.
    ///
    /// Returns `None` when the result was discarded.
    pub async fn refresh_in(
        &self,
        scope: &ViewScope,
        resource: Resource,
    ) -> Option<Result<(), CoreError>> {
        let store = &self.inner.store;
        let previous = store.load_state(resource);
        let version = store.version(resource);
        store.set_load_state(resource, LoadState::Loading);

        let Some(result) = scope.run(self.fetch(resource)).await else {
            debug!(%resource, "scope ended, discarding fetch");
            // Another refresh may have landed meanwhile; leave its state alone.
            if store.version(resource) == version && store.load_state(resource).is_loading() {
                store.set_load_state(resource, previous);
            }
            return None;
        };

        Some(match result {
            Ok(fetched) => {
                self.apply(fetched);
                info!(%resource, "refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(%resource, error = %e, "refresh failed");
                store.set_load_state(resource, LoadState::Failed(e.to_string()));
                Err(e)
            }
        })
    }

    /// Refresh several resources concurrently. They may finish in any
    /// order; the first error is returned after all have settled.
    pub async fn refresh_many(&self, resources: &[Resource]) -> Result<(), CoreError> {
        let results =
            futures::future::join_all(resources.iter().map(|r| self.refresh(*r))).await;
        results.into_iter().collect()
    }

    /// Refresh every collection concurrently.
    pub async fn refresh_all(&self) -> Result<(), CoreError> {
        let (domains, templates, scans, multi, scheduled) = tokio::join!(
            self.refresh(Resource::Domains),
            self.refresh(Resource::Templates),
            self.refresh(Resource::Scans),
            self.refresh(Resource::MultiScans),
            self.refresh(Resource::ScheduledScans),
        );
        domains.and(templates).and(scans).and(multi).and(scheduled)
    }

    /// The only post-mutation action: drop the cached view of `resource`
    /// by fetching it again.
    pub async fn invalidate_and_refresh(&self, resource: Resource) -> Result<(), CoreError> {
        debug!(%resource, "invalidated");
        self.refresh(resource).await
    }

    /// Fetch one scan with its result URLs. Not cached.
    pub async fn scan_detail(&self, id: &EntityId) -> Result<Scan, CoreError> {
        let scan = self.inner.api.get_scan(id.as_str()).await?;
        Ok(Scan::from(scan))
    }

    async fn fetch(&self, resource: Resource) -> Result<Fetched, CoreError> {
        let api = &self.inner.api;
        Ok(match resource {
            Resource::Domains => {
                Fetched::Domains(api.list_domains().await?.into_iter().map(Domain::from).collect())
            }
            Resource::Templates => Fetched::Templates(
                api.list_templates()
                    .await?
                    .into_iter()
                    .map(Template::from)
                    .collect(),
            ),
            Resource::Scans => {
                Fetched::Scans(api.list_scans().await?.into_iter().map(Scan::from).collect())
            }
            Resource::MultiScans => Fetched::MultiScans(
                api.list_multi_scans()
                    .await?
                    .into_iter()
                    .map(MultiScan::from)
                    .collect(),
            ),
            Resource::ScheduledScans => Fetched::ScheduledScans(
                api.list_scheduled_scans()
                    .await?
                    .into_iter()
                    .map(ScheduledScan::from)
                    .collect(),
            ),
        })
    }

    fn apply(&self, fetched: Fetched) {
        let store = &self.inner.store;
        match fetched {
            Fetched::Domains(v) => store.replace_domains(v),
            Fetched::Templates(v) => store.replace_templates(v),
            Fetched::Scans(v) => store.replace_scans(v),
            Fetched::MultiScans(v) => store.replace_multi_scans(v),
            Fetched::ScheduledScans(v) => store.replace_scheduled_scans(v),
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Run a mutation, emit exactly one notification for it, then
    /// re-fetch the resource it touched.
    ///
    /// A failed re-fetch after a successful mutation is logged and shows
    /// up as the store's load state; it does not fail the command.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let notifier = &self.inner.notifier;

        match self.route(&cmd).await {
            Ok(result) => {
                let message = cmd.success_message(&result);
                info!(action = cmd.action(), "{message}");
                notifier.notify_success(message);

                if let Err(e) = self.invalidate_and_refresh(cmd.affects()).await {
                    debug!(error = %e, "post-mutation refresh failed");
                }
                Ok(result)
            }
            Err(e) => {
                warn!(action = cmd.action(), error = %e, "command failed");
                notifier.notify_failure(format!("Failed to {}: {e}", cmd.action()));
                Err(e)
            }
        }
    }

    async fn route(&self, cmd: &Command) -> Result<CommandResult, CoreError> {
        let api = &self.inner.api;

        match cmd {
            Command::CreateDomain { name } => {
                let name = normalize_domain_name(name).ok_or_else(|| CoreError::Validation {
                    message: format!("{name:?} is not a valid domain name"),
                })?;
                Ok(match api.create_domain(&name).await? {
                    Some(created) => CommandResult::Domain(Domain::from(created)),
                    None => CommandResult::Ok,
                })
            }

            Command::DeleteDomain { id } => {
                api.delete_domain(id.as_str()).await?;
                Ok(CommandResult::Ok)
            }

            Command::UploadDomains(req) => {
                if req.line_count() == 0 {
                    return Err(CoreError::Validation {
                        message: format!("{} contains no domains", req.file_name),
                    });
                }
                api.bulk_upload_domains(&req.file_name, req.content.clone())
                    .await?;
                Ok(CommandResult::Ok)
            }

            Command::StartScan(ScanSubmission::Domains {
                domain_ids,
                template_ids,
                all_templates,
            }) => {
                api.scan_domains(&strings(domain_ids), &strings(template_ids), *all_templates)
                    .await?;
                Ok(CommandResult::Ok)
            }

            Command::StartScan(ScanSubmission::AllDomains { domains }) => {
                if domains.is_empty() {
                    return Err(CoreError::Validation {
                        message: "there are no domains to scan".into(),
                    });
                }
                api.scan_all_domains(domains).await?;
                Ok(CommandResult::Ok)
            }

            Command::ScheduleScan(req) => {
                Ok(match api.schedule_scan(&req.to_wire()).await? {
                    Some(created) => CommandResult::Scheduled(ScheduledScan::from(created)),
                    None => CommandResult::Ok,
                })
            }

            Command::DeleteScheduledScan { id } => {
                api.delete_scheduled_scan(id.as_str()).await?;
                Ok(CommandResult::Ok)
            }
        }
    }
}

fn strings(ids: &[EntityId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_owned()).collect()
}
