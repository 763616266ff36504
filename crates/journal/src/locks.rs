//! Per-gallery write locks
//!
//! Read-modify-write cycles on one gallery are serialized inside a process so
//! concurrent mutations cannot lose each other's updates. Different galleries
//! never contend.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct GalleryLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GalleryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `gallery`
    ///
    /// Not reentrant: `f` must not take the same gallery lock again.
    pub fn with_lock<T>(&self, gallery: &str, f: impl FnOnce() -> T) -> T {
        // Clone the handle so the map shard is released before blocking
        let lock = Arc::clone(&self.locks.entry(gallery.to_string()).or_default());
        let _guard = lock.lock();
        f()
    }

    /// Number of galleries that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_same_gallery_is_serialized() {
        let locks = GalleryLocks::new();
        let inside = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        locks.with_lock("g", || {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(now, Ordering::SeqCst);
                            std::thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                });
            }
        });

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_different_galleries_do_not_block() {
        let locks = GalleryLocks::new();
        let value = locks.with_lock("a", || locks.with_lock("b", || 42));
        assert_eq!(value, 42);
        assert_eq!(locks.len(), 2);
    }
}
