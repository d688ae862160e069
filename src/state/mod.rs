// Entity snapshot store and derived fleet summaries

mod fleet;
mod store;

pub use fleet::{deployed_rows, DeployedRow, FleetCounts};
pub use store::{Slot, Snapshot, SnapshotStore};
