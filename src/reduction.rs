use crate::comm::{self, Comm};

///
/// Folds one word from every rank with `op` and hands the result back to
/// every rank. Rank 0 collects in rank order, folds, then returns the
/// verdict to each peer; `op` must be associative and commutative.
pub fn allreduce_word<T, O>(
    x: u64,
    op: O,
    comm: &dyn Comm<T>,
) -> Result<u64, comm::Error>
where
    O: Fn(u64, u64) -> u64,
{
    let size = comm.size();
    if size < 2 {
        return Ok(x);
    }
    if comm.is_root() {
        let mut acc = x;
        for from in 1..size {
            acc = op(acc, comm.recv_word(from)?);
        }
        for to in 1..size {
            comm.send_word(to, acc)?;
        }
        Ok(acc)
    } else {
        comm.send_word(0, x)?;
        comm.recv_word(0)
    }
}

/// True everywhere iff `x` is true on every rank.
pub fn all_of<T>(x: bool, comm: &dyn Comm<T>) -> Result<bool, comm::Error> {
    Ok(allreduce_word(x as u64, |a, b| a & b, comm)? != 0)
}

/// True everywhere iff `x` is false on every rank.
pub fn none_of<T>(x: bool, comm: &dyn Comm<T>) -> Result<bool, comm::Error> {
    Ok(allreduce_word(x as u64, |a, b| a | b, comm)? == 0)
}

/// True everywhere iff `x` is true on at least one rank.
pub fn any_of<T>(x: bool, comm: &dyn Comm<T>) -> Result<bool, comm::Error> {
    Ok(allreduce_word(x as u64, |a, b| a | b, comm)? != 0)
}

/// True everywhere iff every rank passed the same word.
pub fn all_same<T>(x: u64, comm: &dyn Comm<T>) -> Result<bool, comm::Error> {
    let lo = allreduce_word(x, u64::min, comm)?;
    let hi = allreduce_word(x, u64::max, comm)?;
    Ok(lo == hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric;

    #[test]
    fn one_dissenter_flips_the_verdicts() {
        let flags = fabric::spawn::<u64, _, _>(4, |node| {
            let here = node.rank() != 2;
            Ok((all_of(here, &node)?, any_of(here, &node)?, none_of(here, &node)?))
        })
        .unwrap();
        assert_eq!(flags, vec![(false, true, false); 4]);
    }

    #[test]
    fn unanimous_flags() {
        let flags = fabric::spawn::<u64, _, _>(4, |node| {
            Ok((all_of(true, &node)?, none_of(false, &node)?))
        })
        .unwrap();
        assert_eq!(flags, vec![(true, true); 4]);
    }

    #[test]
    fn equal_and_unequal_words() {
        let outcomes = fabric::spawn::<u64, _, _>(4, |node| {
            let equal = all_same(17, &node)?;
            let unequal = all_same(node.rank() as u64, &node)?;
            Ok((equal, unequal))
        })
        .unwrap();
        assert_eq!(outcomes, vec![(true, false); 4]);
    }

    #[test]
    fn sums_reach_every_rank() {
        let sums = fabric::spawn::<u64, _, _>(4, |node| {
            Ok(allreduce_word(node.rank() as u64 + 1, |a, b| a + b, &node)?)
        })
        .unwrap();
        assert_eq!(sums, vec![10; 4]);
    }

    #[test]
    fn lone_rank_reduces_to_itself() {
        let out = fabric::spawn::<u64, _, _>(1, |node| {
            Ok(allreduce_word(9, |a, b| a + b, &node)?)
        })
        .unwrap();
        assert_eq!(out, vec![9]);
    }
}
