use super::LayerManager;
use crate::state::SnapshotStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Drive the layer manager from store changes and the paint frame.
///
/// Each branch runs its pass to completion before the next event is taken,
/// so passes never interleave. Pushes of different kinds carry no relative
/// ordering.
pub async fn run_reconciler(
    store: Arc<SnapshotStore>,
    mut manager: LayerManager,
    frame_interval: Duration,
) {
    let mut stations_rx = store.subscribe_stations();
    let mut emergencies_rx = store.subscribe_emergencies();
    let mut deployed_rx = store.subscribe_deployed();

    let mut frame = interval(frame_interval);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Reconciler started");
    manager.sync_all(&store).await;

    loop {
        tokio::select! {
            changed = stations_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = stations_rx.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    manager.render_stations(&snapshot.items).await;
                }
            }

            changed = emergencies_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = emergencies_rx.borrow_and_update().clone();
                match snapshot {
                    Some(snapshot) => manager.render_emergencies(&snapshot.items).await,
                    None => manager.render_emergencies(&[]).await,
                };
            }

            changed = deployed_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = deployed_rx.borrow_and_update().clone();
                let updates = snapshot.map(|s| s.items).unwrap_or_default();
                let stations = store.stations();
                manager
                    .reconcile_drones(&updates, stations.as_deref().map(|s| s.as_slice()))
                    .await;
            }

            _ = frame.tick() => {
                manager.flush_frame().await;
            }
        }
    }

    warn!("Snapshot store closed, reconciler stopping");
}
