//! Cooperative progress reporting and cancellation

use gridlevels_core::{Error, Result};
use tracing::warn;

use crate::maybe_rayon::*;

/// Consulted once per processed row (or point).
///
/// Returning `false` cancels the run; it then fails with
/// [`Error::Cancelled`] and produces no partial output. Rows may be
/// processed in any order and from several threads.
pub trait RowMonitor: Sync {
    fn proceed(&self, row: usize, rows: usize) -> bool;
}

/// Monitor that never cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMonitor;

impl RowMonitor for NoMonitor {
    fn proceed(&self, _row: usize, _rows: usize) -> bool {
        true
    }
}

impl<F> RowMonitor for F
where
    F: Fn(usize, usize) -> bool + Sync,
{
    fn proceed(&self, row: usize, rows: usize) -> bool {
        self(row, rows)
    }
}

/// Evaluate `row_fn` for every row in parallel and concatenate the results
/// in row order.
pub(crate) fn collect_rows<T, F>(rows: usize, monitor: &dyn RowMonitor, row_fn: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Vec<T> + Sync + Send,
{
    let per_row: Vec<Vec<T>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            if monitor.proceed(row, rows) {
                Ok(row_fn(row))
            } else {
                Err(Error::Cancelled { row, rows })
            }
        })
        .collect::<Result<_>>()
        .map_err(|e| {
            warn!("{}", e);
            e
        })?;

    Ok(per_row.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_rows_in_order() {
        let values = collect_rows(4, &NoMonitor, |row| vec![row * 10, row * 10 + 1]).unwrap();
        assert_eq!(values, vec![0, 1, 10, 11, 20, 21, 30, 31]);
    }

    #[test]
    fn test_every_row_is_reported() {
        let seen = AtomicUsize::new(0);
        let monitor = |_row: usize, rows: usize| {
            assert_eq!(rows, 7);
            seen.fetch_add(1, Ordering::Relaxed);
            true
        };
        collect_rows(7, &monitor, |_| vec![()]).unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_cancel() {
        let monitor = |row: usize, _rows: usize| row != 3;
        let err = collect_rows(5, &monitor, |row| vec![row]).unwrap_err();
        assert!(matches!(err, Error::Cancelled { row: 3, rows: 5 }), "{}", err);
    }
}
