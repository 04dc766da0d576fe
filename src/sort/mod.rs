mod bitonicsort;

use std::cmp::Ordering;

use anyhow::Result;
use thiserror::Error;

use crate::comm::Comm;
use crate::reduction::all_of;
use crate::shift::right_shift;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bitonic Sort requires the same number of elements on each process.")]
    BitonicNotEqualError,
    #[error("Bitonic Sort requires a power of two process count, found {0}.")]
    BitonicCommSizeError(usize),
    #[error("Bitonic Exchange Length:: Expected {0}, Found {1}")]
    BitonicExchangeError(usize, usize),
    #[error("Missing last value in the slice")]
    MissingLastError,
    #[error("Missing first value in the slice")]
    MissingFirstError,
}

pub use bitonicsort::{bitonic_sort, bitonic_sort_by};

///
/// True everywhere iff every block is locally ordered under `compare`
/// and no boundary between consecutive ranks is inverted. Each rank
/// passes its last element one rank to the right and checks it against
/// its own first.
pub fn is_sorted_by<T, F>(
    s_slice: &[T],
    compare: F,
    comm: &dyn Comm<T>,
) -> Result<bool>
where
    F: Fn(&T, &T) -> bool,
{
    let bsorted = s_slice.is_sorted_by(&compare);
    if comm.size() == 1 {
        return Ok(bsorted);
    }
    let lval = s_slice.last().ok_or(Error::MissingLastError)?;
    let fval = s_slice.first().ok_or(Error::MissingFirstError)?;
    let prev = right_shift(lval, comm)?;
    Ok(all_of(
        if comm.rank() > 0 {
            bsorted && prev.is_some_and(|prev| compare(&prev, fval))
        } else {
            bsorted
        },
        comm,
    )?)
}

pub fn is_sorted<T>(s_slice: &[T], comm: &dyn Comm<T>) -> Result<bool>
where
    T: Ord,
{
    is_sorted_by(s_slice, T::le, comm)
}

pub fn sort_by<T, F>(
    tsl: &mut [T],
    compare: F,
    comm: &dyn Comm<T>,
) -> Result<()>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    bitonic_sort_by(tsl, compare, comm)
}

pub fn sort<T>(tsl: &mut [T], comm: &dyn Comm<T>) -> Result<()>
where
    T: Clone + Ord,
{
    bitonic_sort(tsl, comm)
}
