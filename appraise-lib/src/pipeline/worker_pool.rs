use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many metric evaluations are in flight at once.
///
/// Acquire a permit before starting a unit of work and hold it until the work is done;
/// dropping the permit frees the slot for the next unit.
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool with `size` workers. A size of zero is treated as one.
    #[must_use]
    pub fn new(size: usize) -> Arc<Self> {
        let size = size.max(1);
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        })
    }

    /// Wait for a free worker.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("semaphore is never closed")
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Workers not currently holding a permit.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
