//! Data bridge: forwards store changes, load states and mutation
//! notifications from the [`Controller`] as [`Action`]s.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use cybertrap_core::view::ScheduleRow;
use cybertrap_core::{Controller, DataStore, LoadState, Resource};

use crate::action::{Action, Toast};

const RESOURCES: [Resource; 5] = [
    Resource::Domains,
    Resource::Templates,
    Resource::Scans,
    Resource::MultiScans,
    Resource::ScheduledScans,
];

fn schedule_rows(store: &DataStore) -> Action {
    Action::ScheduleRowsUpdated(Arc::new(ScheduleRow::build(store)))
}

fn load_state(resource: Resource, rx: &mut watch::Receiver<LoadState>) -> Action {
    Action::LoadStateChanged(resource, rx.borrow_and_update().clone())
}

/// Runs until `cancel` fires. Sends a snapshot of every collection first
/// so screens render whatever the store already holds.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let store = Arc::clone(controller.store());

    let mut domains = store.domains();
    let mut templates = store.templates();
    let mut scans = store.scans();
    let mut multi_scans = store.multi_scans();
    let mut scheduled = store.scheduled_scans();
    let mut notifications = controller.notifications();

    let [mut domains_load, mut templates_load, mut scans_load, mut multi_load, mut scheduled_load] =
        RESOURCES.map(|r| store.subscribe_load_state(r));

    let _ = action_tx.send(Action::DomainsUpdated(domains.current().clone()));
    let _ = action_tx.send(Action::TemplatesUpdated(templates.current().clone()));
    let _ = action_tx.send(Action::ScansUpdated(scans.current().clone()));
    let _ = action_tx.send(Action::MultiScansUpdated(multi_scans.current().clone()));
    let _ = action_tx.send(schedule_rows(&store));
    for (resource, rx) in RESOURCES.into_iter().zip([
        &mut domains_load,
        &mut templates_load,
        &mut scans_load,
        &mut multi_load,
        &mut scheduled_load,
    ]) {
        let _ = action_tx.send(load_state(resource, rx));
    }

    loop {
        let action = tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(d) = domains.changed() => {
                // Schedule rows show domain names.
                let _ = action_tx.send(schedule_rows(&store));
                Action::DomainsUpdated(d)
            }
            Some(t) = templates.changed() => Action::TemplatesUpdated(t),
            Some(s) = scans.changed() => Action::ScansUpdated(s),
            Some(m) = multi_scans.changed() => Action::MultiScansUpdated(m),
            Some(_) = scheduled.changed() => schedule_rows(&store),

            Ok(()) = domains_load.changed() => load_state(Resource::Domains, &mut domains_load),
            Ok(()) = templates_load.changed() => load_state(Resource::Templates, &mut templates_load),
            Ok(()) = scans_load.changed() => load_state(Resource::Scans, &mut scans_load),
            Ok(()) = multi_load.changed() => load_state(Resource::MultiScans, &mut multi_load),
            Ok(()) = scheduled_load.changed() => {
                load_state(Resource::ScheduledScans, &mut scheduled_load)
            }

            Ok(n) = notifications.recv() => Action::Notify(Toast::from(&*n)),
        };

        if action_tx.send(action).is_err() {
            break;
        }
    }

    debug!("data bridge shut down");
}
