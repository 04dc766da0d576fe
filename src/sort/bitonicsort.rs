use anyhow::{Ok, Result, bail};
use std::{cmp::Ordering, ops::Not};

use super::Error;
use crate::comm::{self, Comm};
use crate::reduction::all_same;

///
/// Which half a rank keeps after the compare-exchange with its partner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    RetainMin,
    RetainMax,
}

impl Role {
    pub fn reverse(&self) -> Self {
        match self {
            Role::RetainMin => Role::RetainMax,
            Role::RetainMax => Role::RetainMin,
        }
    }
}

impl Not for Role {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.reverse()
    }
}

///
/// A rank's pairing for one network round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pairing {
    partner: usize,
    role: Role,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Round {
    step: u32,
    substep: u32,
}

/// The full schedule for `p` ranks: stages `1..=log2(p)`, each running
/// its substeps in descending order.
fn rounds(p: usize) -> impl Iterator<Item = Round> {
    let stages = if p <= 1 { 0 } else { p.ilog2() };
    (1..=stages).flat_map(|step| {
        (1..=step).rev().map(move |substep| Round { step, substep })
    })
}

///
/// Partner and role of `rank` in one round. Partitions of width
/// `2^substep` pair their lower and upper halves element-wise; the
/// rank's group in the current stage (`rank >> step`) decides which end
/// keeps the small keys, so even groups build ascending runs and odd
/// groups descending ones.
fn resolve(rank: usize, p: usize, step: u32, substep: u32) -> Pairing {
    debug_assert!(p.is_power_of_two());
    debug_assert!(rank < p);
    debug_assert!(substep >= 1 && substep <= step);
    debug_assert!((1usize << step) <= p);

    let width = 1usize << substep;
    let half = width >> 1;
    let position = rank & (width - 1);
    let partner = if position < half { rank + half } else { rank - half };
    let ascending = (rank >> step) & 1 == 0;
    let role = if (rank < partner) == ascending {
        Role::RetainMin
    } else {
        Role::RetainMax
    };
    Pairing { partner, role }
}

///
/// Merges two sorted blocks of equal length and keeps one half: the
/// smallest `len` elements for [`Role::RetainMin`], the largest for
/// [`Role::RetainMax`].
fn merge_keep<T, F>(ours: &[T], theirs: &[T], role: Role, compare: &F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let np = ours.len();
    let mut merged: Vec<T> = Vec::with_capacity(np);
    match role {
        Role::RetainMin => {
            let mut l_itr = ours.iter().peekable();
            let mut r_itr = theirs.iter().peekable();
            while merged.len() < np {
                if let (Some(lv), Some(rv)) = (l_itr.peek(), r_itr.peek()) {
                    if compare(lv, rv) != Ordering::Greater {
                        merged.push((*lv).clone());
                        l_itr.next();
                    } else {
                        merged.push((*rv).clone());
                        r_itr.next();
                    }
                } else if let Some(v) = l_itr.next().or_else(|| r_itr.next()) {
                    merged.push(v.clone());
                } else {
                    break;
                }
            }
        }
        Role::RetainMax => {
            let mut l_itr = ours.iter().rev().peekable();
            let mut r_itr = theirs.iter().rev().peekable();
            while merged.len() < np {
                if let (Some(lv), Some(rv)) = (l_itr.peek(), r_itr.peek()) {
                    if compare(lv, rv) == Ordering::Greater {
                        merged.push((*lv).clone());
                        l_itr.next();
                    } else {
                        merged.push((*rv).clone());
                        r_itr.next();
                    }
                } else if let Some(v) = l_itr.next().or_else(|| r_itr.next()) {
                    merged.push(v.clone());
                } else {
                    break;
                }
            }
            merged.reverse();
        }
    }
    merged
}

///
/// One compare-exchange with the partner: both sides swap their blocks,
/// then each merges locally and keeps its half. Both blocks must be
/// sorted and of equal length.
fn compare_exchange_merge<T, F>(
    s_slice: &mut [T],
    pairing: Pairing,
    compare: &F,
    comm: &dyn Comm<T>,
) -> Result<()>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let np = s_slice.len();
    let rcv_buf = comm::exchange(comm, pairing.partner, s_slice)?;
    if rcv_buf.len() != np {
        bail!(Error::BitonicExchangeError(np, rcv_buf.len()));
    }
    let merged = merge_keep(s_slice, &rcv_buf, pairing.role, compare);
    s_slice.clone_from_slice(&merged);
    Ok(())
}

///
/// Sorts the distributed array whose rank-order concatenation of blocks
/// is the data. Every block is sorted locally once, then `log2(p)`
/// stages of compare-exchange rounds run the network; a barrier fences
/// every round on both sides so no exchange can overlap a neighbouring
/// round.
pub fn bitonic_sort_by<T, F>(
    s_slice: &mut [T],
    compare: F,
    comm: &dyn Comm<T>,
) -> Result<()>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let p = comm.size();
    let rank = comm.rank();
    if !p.is_power_of_two() {
        bail!(Error::BitonicCommSizeError(p));
    }
    if !all_same(s_slice.len() as u64, comm)? {
        bail!(Error::BitonicNotEqualError);
    }

    if !s_slice.is_sorted_by(|a, b| compare(a, b) != Ordering::Greater) {
        s_slice.sort_by(&compare);
    }

    for Round { step, substep } in rounds(p) {
        comm.barrier()?;
        let pairing = resolve(rank, p, step, substep);
        compare_exchange_merge(s_slice, pairing, &compare, comm)?;
        comm.barrier()?;
    }
    Ok(())
}

pub fn bitonic_sort<T>(s_slice: &mut [T], comm: &dyn Comm<T>) -> Result<()>
where
    T: Clone + Ord,
{
    bitonic_sort_by(s_slice, T::cmp, comm)
}
