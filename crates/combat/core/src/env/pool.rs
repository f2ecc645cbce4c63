//! Pool manager boundary.

use crate::events::NotificationSink;
use crate::types::InstanceId;

/// Accepts "return this instance" requests.
///
/// Reactivation happens outside the combat core; whoever reactivates an
/// instance must call its `activate` entry point before reuse.
pub trait PoolManager {
    fn relinquish(&mut self, instance: InstanceId);
}

/// Records returned instances in order. Useful for tests and tools.
impl PoolManager for Vec<InstanceId> {
    fn relinquish(&mut self, instance: InstanceId) {
        self.push(instance);
    }
}

/// Handles a pooled instance needs to report and retire itself.
pub struct InstanceContext<'a> {
    pub sink: &'a mut dyn NotificationSink,
    pub pool: &'a mut dyn PoolManager,
}

impl<'a> InstanceContext<'a> {
    pub fn new(sink: &'a mut dyn NotificationSink, pool: &'a mut dyn PoolManager) -> Self {
        Self { sink, pool }
    }
}
