//! Bounded worker pool and recursive fork/join execution.

use crate::error::{RenderError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

/// A fixed-size pool of worker threads shared by renderers.
///
/// Work submitted through [`WorkerPool::run`] executes on the pool's threads;
/// any `rayon::join` inside it stays on this pool rather than the global one.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `threads` workers (0 = one per core).
    pub fn new(threads: usize) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("ar-worker-{}", i));
        if threads > 0 {
            builder = builder.num_threads(threads);
        }

        let pool = builder
            .build()
            .map_err(|e| RenderError::PoolBuild(e.to_string()))?;

        debug!(threads = pool.current_num_threads(), "Worker pool started");
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f` on the pool and wait for it.
    ///
    /// A panic anywhere inside `f`, including in forked subtasks, is returned
    /// as [`RenderError::WorkerPanicked`].
    pub fn run<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> Result<R> + Send,
        R: Send,
    {
        catch_panic(|| self.pool.install(f))
    }
}

/// Work that can either be computed directly or halved.
pub trait SplitTask: Sized + Send {
    type Output: Send;

    /// Whether this task is above the granularity threshold.
    fn should_split(&self, task_size: u64) -> bool;

    /// Divide the task in two. Only called when `should_split` holds.
    fn split(self) -> (Self, Self);

    /// Compute the task directly.
    fn compute(self) -> Result<Self::Output>;
}

/// Recursively split `task` until every piece is at or below `task_size`,
/// computing both halves of each split with `rayon::join` and combining
/// them with `merge`.
///
/// The first half runs inline on the calling worker. When no other worker
/// is idle the second half runs there too, so waiting never deadlocks.
pub fn fork_join<T, M>(task: T, task_size: u64, merge: &M) -> Result<T::Output>
where
    T: SplitTask,
    M: Fn(T::Output, T::Output) -> Result<T::Output> + Sync,
{
    if !task.should_split(task_size) {
        return task.compute();
    }

    let (left, right) = task.split();
    let (left, right) = rayon::join(
        || fork_join(left, task_size, merge),
        || fork_join(right, task_size, merge),
    );
    merge(left?, right?)
}

/// Run `f`, turning a panic into an error.
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> Result<R>) -> Result<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(error = %message, "Render task panicked");
            Err(RenderError::WorkerPanicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sums a range and records how deep it was split.
    struct RangeSum {
        start: u64,
        end: u64,
        depth: u32,
    }

    impl SplitTask for RangeSum {
        type Output = (u64, u32);

        fn should_split(&self, task_size: u64) -> bool {
            self.end - self.start >= 2 * task_size
        }

        fn split(self) -> (Self, Self) {
            let mid = self.start + (self.end - self.start) / 2;
            (
                RangeSum {
                    start: self.start,
                    end: mid,
                    depth: self.depth + 1,
                },
                RangeSum {
                    start: mid,
                    end: self.end,
                    depth: self.depth + 1,
                },
            )
        }

        fn compute(self) -> Result<Self::Output> {
            Ok(((self.start..self.end).sum(), self.depth))
        }
    }

    fn merge(a: (u64, u32), b: (u64, u32)) -> Result<(u64, u32)> {
        Ok((a.0 + b.0, a.1.max(b.1)))
    }

    #[test]
    fn test_fork_join_sums_and_bounds_depth() {
        let pool = WorkerPool::new(4).unwrap();
        let len = 10_000u64;
        let task_size = 7u64;

        let (sum, depth) = pool
            .run(|| {
                fork_join(
                    RangeSum {
                        start: 0,
                        end: len,
                        depth: 0,
                    },
                    task_size,
                    &merge,
                )
            })
            .unwrap();

        assert_eq!(sum, len * (len - 1) / 2);
        let bound = (len as f64 / task_size as f64).log2().ceil() as u32;
        assert!(depth <= bound, "depth {} exceeds {}", depth, bound);
        assert!(depth > 0);
    }

    #[test]
    fn test_small_task_is_not_split() {
        let pool = WorkerPool::new(1).unwrap();
        let (_, depth) = pool
            .run(|| {
                fork_join(
                    RangeSum {
                        start: 0,
                        end: 5,
                        depth: 0,
                    },
                    3,
                    &merge,
                )
            })
            .unwrap();
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_single_thread_pool_completes_deep_splits() {
        let pool = WorkerPool::new(1).unwrap();
        let (sum, _) = pool
            .run(|| {
                fork_join(
                    RangeSum {
                        start: 0,
                        end: 4096,
                        depth: 0,
                    },
                    1,
                    &merge,
                )
            })
            .unwrap();
        assert_eq!(sum, 4096 * 4095 / 2);
    }

    #[test]
    fn test_panic_becomes_error() {
        let pool = WorkerPool::new(2).unwrap();
        let result: Result<()> = pool.run(|| panic!("boom"));
        match result {
            Err(RenderError::WorkerPanicked(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected WorkerPanicked, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_in_forked_half_becomes_error() {
        struct Exploding(u64);

        impl SplitTask for Exploding {
            type Output = ();

            fn should_split(&self, _: u64) -> bool {
                self.0 > 1
            }

            fn split(self) -> (Self, Self) {
                (Exploding(self.0 / 2), Exploding(self.0 - self.0 / 2))
            }

            fn compute(self) -> Result<()> {
                if self.0 == 1 {
                    panic!("leaf {}", self.0);
                }
                Ok(())
            }
        }

        let pool = WorkerPool::new(2).unwrap();
        let result = pool.run(|| fork_join(Exploding(16), 1, &|_, _| Ok(())));
        assert!(matches!(result, Err(RenderError::WorkerPanicked(_))));
    }

    #[test]
    fn test_error_short_circuits() {
        let pool = WorkerPool::new(2).unwrap();
        let result: Result<()> = pool.run(|| Err(RenderError::transfer("nope")));
        assert!(matches!(result, Err(RenderError::Transfer(_))));
    }
}
