//! Row iteration that is parallel with the `parallel` feature and
//! sequential without it.
//!
//! Code iterates rows with `(0..rows).into_par_iter()`; without rayon the
//! call resolves to `into_iter()`, and `map`/`collect` are the std iterator
//! adapters.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
pub trait IntoParallelIterator: IntoIterator + Sized {
    fn into_par_iter(self) -> Self::IntoIter {
        self.into_iter()
    }
}

#[cfg(not(feature = "parallel"))]
impl<I: IntoIterator> IntoParallelIterator for I {}
