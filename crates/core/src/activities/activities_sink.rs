//! Activity sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::Activity;

/// Trait for receiving activities produced by the tracking service.
///
/// Implementations hand activities to whatever stores or displays the
/// timeline. `emit()` must be fast and must not fail the tracking operation
/// that produced the activity.
pub trait ActivitySink: Send + Sync {
    /// Emit a single activity.
    fn emit(&self, activity: Activity);

    /// Emit multiple activities, preserving their order.
    fn emit_batch(&self, activities: Vec<Activity>) {
        for activity in activities {
            self.emit(activity);
        }
    }
}

/// No-op implementation for contexts that don't keep a timeline.
#[derive(Clone, Default)]
pub struct NoOpActivitySink;

impl ActivitySink for NoOpActivitySink {
    fn emit(&self, _activity: Activity) {}
}

/// Mock sink for testing - collects emitted activities.
#[derive(Clone, Default)]
pub struct MockActivitySink {
    activities: Arc<Mutex<Vec<Activity>>>,
}

impl MockActivitySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected activities.
    pub fn activities(&self) -> Vec<Activity> {
        self.activities.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Clears collected activities.
    pub fn clear(&self) {
        if let Ok(mut activities) = self.activities.lock() {
            activities.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.activities.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActivitySink for MockActivitySink {
    fn emit(&self, activity: Activity) {
        if let Ok(mut activities) = self.activities.lock() {
            activities.push(activity);
        }
    }
}
