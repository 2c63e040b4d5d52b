//! Fire-and-forget task submission.

/// Thin handle over rayon's global work-stealing pool.
///
/// Submission is fire-and-forget: no join handle, no cancellation. The
/// server uses this to push IO + decode work off the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskPool;

impl TaskPool {
    /// Create a pool handle
    pub fn new() -> Self {
        Self
    }

    /// Run `task` on some worker thread at some point in the future
    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        rayon::spawn(task);
    }
}
