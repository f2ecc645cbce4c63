use combat_core::{InstanceId, PoolManager};

/// Id allocator and return queue for pooled projectiles and beams.
///
/// Instances relinquished during a tick are parked in a return queue and
/// only become reusable after [`settle`](Self::settle), so an id is never
/// handed out again while the instance that owned it is still unwinding.
#[derive(Debug, Default)]
pub struct ObjectPool {
    next_id: u32,
    free: Vec<InstanceId>,
    returned: Vec<InstanceId>,
    spawned: usize,
    reused: usize,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the oldest free id accepted by `reusable`, or allocates a new one.
    pub fn acquire(&mut self, reusable: impl Fn(InstanceId) -> bool) -> InstanceId {
        if let Some(index) = self.free.iter().position(|&id| reusable(id)) {
            self.reused += 1;
            return self.free.remove(index);
        }
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        self.spawned += 1;
        id
    }

    /// Moves this tick's returns to the free list and reports them.
    pub fn settle(&mut self) -> Vec<InstanceId> {
        let returned = std::mem::take(&mut self.returned);
        self.free.extend(returned.iter().copied());
        returned
    }

    pub fn is_free(&self, id: InstanceId) -> bool {
        self.free.contains(&id) || self.returned.contains(&id)
    }

    /// Instances allocated so far.
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Acquisitions served from the free list.
    pub fn reused(&self) -> usize {
        self.reused
    }
}

impl PoolManager for ObjectPool {
    fn relinquish(&mut self, instance: InstanceId) {
        if self.is_free(instance) {
            tracing::warn!(target: "runtime::world", %instance, "instance returned twice");
            return;
        }
        tracing::trace!(target: "runtime::world", %instance, "returned to pool");
        self.returned.push(instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_ids_are_reused_after_settle() {
        let mut pool = ObjectPool::new();
        let first = pool.acquire(|_| true);
        pool.relinquish(first);

        assert_ne!(pool.acquire(|_| true), first);
        assert_eq!(pool.settle(), vec![first]);
        assert_eq!(pool.acquire(|_| true), first);
        assert_eq!(pool.reused(), 1);
        assert_eq!(pool.spawned(), 2);
    }

    #[test]
    fn double_return_is_ignored() {
        let mut pool = ObjectPool::new();
        let id = pool.acquire(|_| true);
        pool.relinquish(id);
        pool.relinquish(id);
        assert_eq!(pool.settle().len(), 1);
    }
}
