use std::future::Future;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Holds at most one live spawned task.
///
/// Scheduling a new task always aborts the previous one first, so a slot can
/// never leak a forgotten periodic callback. The slot aborts its task on drop.
#[derive(Debug)]
pub struct TaskSlot {
    name: &'static str,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Cancel the current task (if any) and spawn `task` in its place.
    ///
    /// Must be called from within a tokio runtime.
    pub fn reschedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.handle.lock();
        if let Some(prev) = slot.take() {
            prev.abort();
        }
        *slot = Some(tokio::spawn(task));
        debug!("{}: rescheduled", self.name);
    }

    /// Abort the current task. Returns `true` if a live task was cancelled.
    pub fn cancel(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) => {
                let was_live = !handle.is_finished();
                handle.abort();
                if was_live {
                    debug!("{}: cancelled", self.name);
                }
                was_live
            }
            None => false,
        }
    }

    /// True while a scheduled task has not yet finished.
    pub fn is_active(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}
