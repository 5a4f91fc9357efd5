//! Lazily recomputed values with explicit invalidation.

/// A value that is computed on first access and reused until invalidated.
///
/// Mutators call [`invalidate`](Self::invalidate); readers call
/// [`get_or_try_compute`](Self::get_or_try_compute). Nothing is recomputed
/// eagerly.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Option<T>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Cached<T> {
    /// An empty (dirty) cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached value so the next access recomputes it.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    /// Whether a computed value is currently held.
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// The cached value, if one is held.
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Return the cached value, computing it first if the cache is dirty.
    pub fn get_or_compute(&mut self, compute: impl FnOnce() -> T) -> &T {
        self.value.get_or_insert_with(compute)
    }

    /// Fallible variant of [`get_or_compute`](Self::get_or_compute).
    ///
    /// A failed computation leaves the cache dirty.
    pub fn get_or_try_compute<E>(
        &mut self,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        let value = match self.value.take() {
            Some(value) => value,
            None => compute()?,
        };
        Ok(self.value.insert(value))
    }
}
