// Path animation: per-unit tasks cycling a dash pattern along path layers

use crate::map::SharedSurface;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Dash patterns applied in order, wrapping after the last entry.
///
/// The offset segment grows each step, which reads as motion along the line.
pub const DASH_SEQUENCE: [&[f64]; 14] = [
    &[0.0, 1.0, 5.0, 9.0],
    &[0.0, 2.0, 5.0, 8.0],
    &[0.0, 3.0, 5.0, 7.0],
    &[0.0, 4.0, 5.0, 6.0],
    &[0.0, 5.0, 5.0, 5.0],
    &[0.0, 6.0, 5.0, 4.0],
    &[0.0, 7.0, 5.0, 3.0],
    &[0.0, 8.0, 5.0, 2.0],
    &[0.0, 9.0, 5.0, 1.0],
    &[1.0, 10.0, 4.0],
    &[2.0, 10.0, 3.0],
    &[3.0, 10.0, 2.0],
    &[4.0, 10.0, 1.0],
    &[5.0, 10.0, 0.0],
];

/// Running animation for one unit. Dropping it aborts the task.
struct AnimationHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Owns one animation task per deployed unit, keyed by drone id
pub struct PathAnimator {
    surface: SharedSurface,
    tick: Duration,
    tasks: Arc<DashMap<String, AnimationHandle>>,
    next_generation: AtomicU64,
}

impl PathAnimator {
    pub fn new(surface: SharedSurface, tick: Duration) -> Self {
        Self {
            surface,
            tick,
            tasks: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Start animating `layer_id` for `drone_id`, replacing any running cycle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, drone_id: &str, layer_id: String) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let surface = Arc::clone(&self.surface);
        let tasks = Arc::clone(&self.tasks);
        let id = drone_id.to_string();
        let tick = self.tick;

        let task = tokio::spawn(async move {
            animate(surface, &layer_id, tick).await;
            // Layer vanished without an explicit stop; drop our own entry only
            tasks.remove_if(&id, |_, handle| handle.generation == generation);
        });

        debug!(drone_id = %drone_id, generation, "Path animation started");
        self.tasks
            .insert(drone_id.to_string(), AnimationHandle { generation, task });
    }

    /// Abort the unit's animation. Returns true if one was registered.
    pub fn stop(&self, drone_id: &str) -> bool {
        let stopped = self.tasks.remove(drone_id).is_some();
        if stopped {
            debug!(drone_id = %drone_id, "Path animation stopped");
        }
        stopped
    }

    pub fn is_running(&self, drone_id: &str) -> bool {
        self.tasks
            .get(drone_id)
            .map(|handle| !handle.task.is_finished())
            .unwrap_or(false)
    }

    pub fn running(&self) -> usize {
        self.tasks
            .iter()
            .filter(|entry| !entry.value().task.is_finished())
            .count()
    }

    pub fn stop_all(&self) {
        self.tasks.clear();
    }
}

impl Drop for PathAnimator {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Advance the dash pattern every `tick` until the layer disappears
async fn animate(surface: SharedSurface, layer_id: &str, tick: Duration) {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The layer is created with the first pattern; the immediate tick is skipped
    ticker.tick().await;

    let mut step = 0;
    loop {
        ticker.tick().await;
        step = (step + 1) % DASH_SEQUENCE.len();

        let mut map = surface.lock().await;
        if !map.has_layer(layer_id) {
            debug!(layer_id = %layer_id, "Path layer gone, ending animation");
            break;
        }
        map.set_dash_pattern(layer_id, DASH_SEQUENCE[step]);
    }
}
