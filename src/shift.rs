use std::slice;

use crate::comm::{self, Comm};

/// Sends `x` to the next higher rank and returns the value arriving from
/// the next lower one; rank 0 receives nothing.
pub fn right_shift<T>(
    x: &T,
    comm: &dyn Comm<T>,
) -> Result<Option<T>, comm::Error> {
    let rank = comm.rank();
    if rank + 1 < comm.size() {
        comm.send(rank + 1, slice::from_ref(x))?;
    }
    if rank == 0 {
        return Ok(None);
    }
    Ok(comm.recv(rank - 1)?.into_iter().next())
}

/// Mirror of [`right_shift`]: values travel towards rank 0.
pub fn left_shift<T>(
    x: &T,
    comm: &dyn Comm<T>,
) -> Result<Option<T>, comm::Error> {
    let rank = comm.rank();
    if rank > 0 {
        comm.send(rank - 1, slice::from_ref(x))?;
    }
    if rank + 1 == comm.size() {
        return Ok(None);
    }
    Ok(comm.recv(rank + 1)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric;

    #[test]
    fn right_shift_moves_values_up() {
        let got = fabric::spawn(4, |node| {
            Ok(right_shift(&(node.rank() as u32), &node)?)
        })
        .unwrap();
        assert_eq!(got, vec![None, Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn left_shift_moves_values_down() {
        let got = fabric::spawn(4, |node| {
            Ok(left_shift(&(node.rank() as u32), &node)?)
        })
        .unwrap();
        assert_eq!(got, vec![Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn lone_rank_shifts_nothing() {
        let got = fabric::spawn(1, |node| Ok(right_shift(&1u8, &node)?)).unwrap();
        assert_eq!(got, vec![None]);
    }
}
