//! Load-once handle for the model artifact.
//!
//! [`LazyModel`] defers loading until the first [`LazyModel::get`], then hands
//! out the same instance for the rest of its life. Concurrent first calls
//! block on the cell so the loader runs at most once per success.

use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;

use crate::error::ClassifyError;

/// Produces the artifact (or anything else expensive to build once).
pub trait ModelLoader {
    type Model;

    fn load(&self) -> Result<Self::Model, ClassifyError>;

    /// Human-readable source, used in log lines.
    fn describe(&self) -> String {
        String::from("model")
    }
}

impl<F, M> ModelLoader for F
where
    F: Fn() -> Result<M, ClassifyError>,
{
    type Model = M;

    fn load(&self) -> Result<M, ClassifyError> {
        self()
    }
}

pub struct LazyModel<L: ModelLoader> {
    loader: L,
    model: OnceCell<L::Model>,
    loads: AtomicUsize,
}

impl<L: ModelLoader> LazyModel<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the loaded artifact, loading it on first use.
    ///
    /// A failed load is returned to the caller and attempted again on the
    /// next call; a successful load is never repeated.
    pub fn get(&self) -> Result<&L::Model, ClassifyError> {
        self.model.get_or_try_init(|| {
            log::info!("loading {}", self.loader.describe());
            let model = self.loader.load().inspect_err(|e| {
                log::error!("failed to load {}: {}", self.loader.describe(), e);
            })?;
            self.loads.fetch_add(1, Ordering::Relaxed);
            Ok(model)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Number of successful loads so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Drop the cached artifact so the next `get` reloads it.
    pub fn invalidate(&mut self) -> Option<L::Model> {
        let previous = self.model.take();
        if previous.is_some() {
            log::info!("invalidated cached {}", self.loader.describe());
        }
        previous
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Arc;

    struct CountingLoader {
        calls: Cell<usize>,
        fail_first: bool,
    }

    impl ModelLoader for CountingLoader {
        type Model = String;

        fn load(&self) -> Result<String, ClassifyError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if self.fail_first && n == 1 {
                return Err(ClassifyError::Model("artifact missing".into()));
            }
            Ok(format!("model#{}", n))
        }

        fn describe(&self) -> String {
            "counting loader".into()
        }
    }

    #[test]
    fn test_loads_lazily_and_once() {
        let lazy = LazyModel::new(CountingLoader {
            calls: Cell::new(0),
            fail_first: false,
        });
        assert!(!lazy.is_loaded());
        assert_eq!(lazy.loader().calls.get(), 0);

        assert_eq!(lazy.get().unwrap(), "model#1");
        assert_eq!(lazy.get().unwrap(), "model#1");
        assert_eq!(lazy.loader().calls.get(), 1);
        assert_eq!(lazy.load_count(), 1);
        assert!(lazy.is_loaded());
    }

    #[test]
    fn test_failed_load_is_retried() {
        let lazy = LazyModel::new(CountingLoader {
            calls: Cell::new(0),
            fail_first: true,
        });

        assert_eq!(
            lazy.get(),
            Err(ClassifyError::Model("artifact missing".into()))
        );
        assert!(!lazy.is_loaded());
        assert_eq!(lazy.get().unwrap(), "model#2");
        assert_eq!(lazy.load_count(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut lazy = LazyModel::new(CountingLoader {
            calls: Cell::new(0),
            fail_first: false,
        });
        lazy.get().unwrap();

        assert_eq!(lazy.invalidate(), Some("model#1".to_string()));
        assert!(!lazy.is_loaded());
        assert_eq!(lazy.get().unwrap(), "model#2");
        assert_eq!(lazy.invalidate(), Some("model#2".to_string()));
        assert_eq!(lazy.invalidate(), None);
    }

    #[test]
    fn test_closure_loader() {
        let lazy = LazyModel::new(|| Ok::<_, ClassifyError>(vec![1u8, 2, 3]));
        assert_eq!(lazy.get().unwrap(), &vec![1u8, 2, 3]);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = Arc::new(LazyModel::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok::<_, ClassifyError>(42u32)
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                std::thread::spawn(move || *lazy.get().unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
