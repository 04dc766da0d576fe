use anyhow::{Ok, Result, bail};
use thiserror::Error;

use crate::comm::Comm;
use crate::reduction::{all_same, any_of};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Gathered Block Length:: Expected {0}, Found {1}")]
    BlockLengthError(usize, usize),
    #[error("Input Slice Error:: {0}")]
    InSliceError(String),
}

///
/// Splits `s_in` at the root into `size` equal blocks and hands block
/// `j` to rank `j`. Every rank gets its block back as an owned vector;
/// the root keeps its own slice without a self-send.
pub fn scatter_vec<T>(
    s_in: Option<&[T]>,
    root: usize,
    comm: &dyn Comm<T>,
) -> Result<Vec<T>>
where
    T: Clone,
{
    let s_in = s_in.unwrap_or(&[]);
    let size = comm.size();
    if !any_of(
        comm.rank() == root
            && !s_in.is_empty()
            && s_in.len().is_multiple_of(size),
        comm,
    )? {
        bail!(Error::InSliceError(
            "scatter input size @ root should be non-zero and a multiple of p."
                .to_string()
        ))
    }
    if comm.rank() == root {
        let each = s_in.len() / size;
        for to in 0..size {
            if to != root {
                comm.send(to, &s_in[to * each..(to + 1) * each])?;
            }
        }
        Ok(s_in[root * each..(root + 1) * each].to_vec())
    } else {
        Ok(comm.recv(root)?)
    }
}

///
/// Collects equal blocks from every rank at the root, concatenated in
/// rank order. Returns `Some` at the root and `None` everywhere else.
pub fn gather_vec<T>(
    s_in: &[T],
    root: usize,
    comm: &dyn Comm<T>,
) -> Result<Option<Vec<T>>>
where
    T: Clone,
{
    if !all_same(s_in.len() as u64, comm)? {
        bail!(Error::InSliceError(
            "gather input sizes should be same across all processors"
                .to_string()
        ))
    }
    if comm.rank() == root {
        let each = s_in.len();
        let mut out = Vec::with_capacity(each * comm.size());
        for from in 0..comm.size() {
            if from == root {
                out.extend_from_slice(s_in);
            } else {
                let block = comm.recv(from)?;
                if block.len() != each {
                    bail!(Error::BlockLengthError(each, block.len()));
                }
                out.extend(block);
            }
        }
        Ok(Some(out))
    } else {
        comm.send(root, s_in)?;
        Ok(None)
    }
}

/// Gathers one control word per rank at the root, in rank order.
pub fn gather_word<T>(
    x: u64,
    root: usize,
    comm: &dyn Comm<T>,
) -> Result<Option<Vec<u64>>> {
    if comm.rank() == root {
        let mut words = Vec::with_capacity(comm.size());
        for from in 0..comm.size() {
            if from == root {
                words.push(x);
            } else {
                words.push(comm.recv_word(from)?);
            }
        }
        Ok(Some(words))
    } else {
        comm.send_word(root, x)?;
        Ok(None)
    }
}

///
/// Gathers one line of text per rank at the root, in rank order, with
/// empty lines dropped.
pub fn gather_strings<T>(
    x: String,
    root: usize,
    comm: &dyn Comm<T>,
) -> Result<Option<Vec<String>>> {
    if comm.rank() == root {
        let mut lines = Vec::with_capacity(comm.size());
        for from in 0..comm.size() {
            if from == root {
                lines.push(x.clone());
            } else {
                lines.push(comm.recv_text(from)?);
            }
        }
        lines.retain(|l| !l.is_empty());
        Ok(Some(lines))
    } else {
        comm.send_text(root, x)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric;

    #[test]
    fn scatter_hands_out_aligned_blocks() {
        let input: Vec<u32> = (0..8).collect();
        let blocks = fabric::spawn(4, |node| {
            Ok(scatter_vec(node.is_root().then_some(&input[..]), 0, &node)?)
        })
        .unwrap();
        assert_eq!(
            blocks,
            vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]
        );
    }

    #[test]
    fn scatter_then_gather_is_identity() {
        let input: Vec<u32> = (0..12).rev().collect();
        let out = fabric::spawn(4, |node| {
            let block =
                scatter_vec(node.is_root().then_some(&input[..]), 0, &node)?;
            Ok(gather_vec(&block, 0, &node)?)
        })
        .unwrap();
        assert_eq!(out[0], Some(input.clone()));
        assert!(out[1..].iter().all(|o| o.is_none()));
    }

    #[test]
    fn indivisible_scatter_is_refused() {
        let input: Vec<u32> = (0..7).collect();
        let err = fabric::spawn(4, |node| {
            Ok(scatter_vec(node.is_root().then_some(&input[..]), 0, &node)?)
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("multiple of p"));
    }

    #[test]
    fn ragged_gather_is_refused() {
        let err = fabric::spawn(2, |node| {
            let block = vec![1u8; node.rank() + 1];
            Ok(gather_vec(&block, 0, &node)?)
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("same across all"));
    }

    #[test]
    fn words_gather_in_rank_order() {
        let words = fabric::spawn::<u64, _, _>(4, |node| {
            Ok(gather_word(node.rank() as u64 * 2, 0, &node)?)
        })
        .unwrap();
        assert_eq!(words[0], Some(vec![0, 2, 4, 6]));
    }

    #[test]
    fn text_gathers_in_rank_order_without_blanks() {
        let lines = fabric::spawn::<u64, _, _>(4, |node| {
            let line = if node.rank() == 2 {
                String::new()
            } else {
                format!("rank {}", node.rank())
            };
            Ok(gather_strings(line, 0, &node)?)
        })
        .unwrap();
        assert_eq!(
            lines[0],
            Some(vec![
                "rank 0".to_string(),
                "rank 1".to_string(),
                "rank 3".to_string()
            ])
        );
    }
}
