//! Cancellable delayed tasks driven by the game tick.
//!
//! Every delay in the combat state machine ("wait 800ms, then apply damage")
//! is a task in a [`Scheduler`]. Tasks are plain values; the owner decides
//! what to do when one fires. Each task records the scheduler epoch at the
//! time it was scheduled. [`Scheduler::cancel_all`] bumps the epoch, so a
//! task that was already handed out in the same batch can be recognised as
//! stale with [`Scheduler::is_current`] and dropped.

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    id: u64,
    epoch: u64,
}

impl TaskHandle {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// A task whose delay has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub handle: TaskHandle,
    pub action: T,
}

#[derive(Debug, Clone)]
struct Task<T> {
    handle: TaskHandle,
    remaining_ms: u64,
    action: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    next_id: u64,
    epoch: u64,
    tasks: Vec<Task<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            epoch: 0,
            tasks: Vec::new(),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Queues `action` to fire once `delay_ms` of ticks have elapsed.
    pub fn schedule(&mut self, delay_ms: u64, action: T) -> TaskHandle {
        let handle = TaskHandle {
            id: self.next_id,
            epoch: self.epoch,
        };
        self.next_id += 1;
        self.tasks.push(Task {
            handle,
            remaining_ms: delay_ms,
            action,
        });
        handle
    }

    /// Removes a single pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    /// Drops every pending task and starts a new epoch.
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
        self.epoch += 1;
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    /// True if a fired task was scheduled in the current epoch.
    pub fn is_current(&self, handle: TaskHandle) -> bool {
        handle.epoch == self.epoch
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advances time and returns every task that came due, earliest first.
    /// Tasks due at the same instant fire in scheduling order.
    pub fn advance(&mut self, delta_ms: u64) -> Vec<Fired<T>> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.tasks.len());

        for task in self.tasks.drain(..) {
            if task.remaining_ms <= delta_ms {
                due.push(task);
            } else {
                pending.push(Task {
                    remaining_ms: task.remaining_ms - delta_ms,
                    ..task
                });
            }
        }
        self.tasks = pending;

        due.sort_by_key(|t| (t.remaining_ms, t.handle.id));
        due.into_iter()
            .map(|t| Fired {
                handle: t.handle,
                action: t.action,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_fires_after_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, "hit");

        assert!(scheduler.advance(99).is_empty());
        let fired = scheduler.advance(1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].action, "hit");
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0, 1);
        assert_eq!(scheduler.advance(0).len(), 1);
    }

    #[test]
    fn test_earliest_fires_first() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(300, "late");
        scheduler.schedule(100, "early");
        scheduler.schedule(100, "early-second");

        let order: Vec<_> = scheduler
            .advance(500)
            .into_iter()
            .map(|f| f.action)
            .collect();
        assert_eq!(order, vec!["early", "early-second", "late"]);
    }

    #[test]
    fn test_cancel_removes_single_task() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(10, "keep");
        let drop = scheduler.schedule(10, "drop");

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert!(scheduler.is_pending(keep));

        let fired = scheduler.advance(10);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].action, "keep");
    }

    #[test]
    fn test_cancel_all_bumps_epoch_and_marks_stale() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10, "a");
        scheduler.schedule(10, "b");

        let fired = scheduler.advance(10);
        assert!(fired.iter().all(|f| scheduler.is_current(f.handle)));

        // Handling "a" cancels everything; "b" was already handed out and is now stale.
        scheduler.cancel_all();
        assert!(!scheduler.is_current(fired[1].handle));
        assert_eq!(scheduler.epoch(), 1);
    }

    #[test]
    fn test_new_tasks_after_cancel_use_new_epoch() {
        let mut scheduler = Scheduler::new();
        scheduler.cancel_all();
        let handle = scheduler.schedule(5, ());
        assert_eq!(handle.epoch(), 1);
        assert!(scheduler.is_current(handle));
    }
}
