use std::sync::{Arc, OnceLock};

use crate::providers::error::{ProviderError, ProviderResult};

type Factory<T> = Box<dyn Fn() -> ProviderResult<Arc<T>> + Send + Sync>;

/// A provider handle built on first use and cached afterwards.
///
/// Two tasks racing on first use may both run the factory; only the first
/// result is kept and every caller gets that one.
pub(crate) struct LazyHandle<T: ?Sized> {
    label: &'static str,
    cell: OnceLock<Arc<T>>,
    factory: Option<Factory<T>>,
}

impl<T: ?Sized> LazyHandle<T> {
    pub(crate) fn ready(label: &'static str, handle: Arc<T>) -> Self {
        Self {
            label,
            cell: OnceLock::from(handle),
            factory: None,
        }
    }

    pub(crate) fn deferred<F>(label: &'static str, factory: F) -> Self
    where
        F: Fn() -> ProviderResult<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            label,
            cell: OnceLock::new(),
            factory: Some(Box::new(factory)),
        }
    }

    pub(crate) const fn label(&self) -> &'static str {
        self.label
    }

    pub(crate) fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }

    pub(crate) fn get(&self) -> ProviderResult<Arc<T>> {
        if let Some(handle) = self.cell.get() {
            return Ok(Arc::clone(handle));
        }
        let factory = self.factory.as_ref().ok_or_else(|| {
            ProviderError::Configuration(format!("{} handle has no factory", self.label))
        })?;
        let built = factory()?;
        Ok(Arc::clone(self.cell.get_or_init(|| built)))
    }
}

impl<T: ?Sized> std::fmt::Debug for LazyHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyHandle")
            .field("label", &self.label)
            .field("built", &self.is_built())
            .finish_non_exhaustive()
    }
}
