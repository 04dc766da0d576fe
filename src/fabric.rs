use std::cell::Cell;
use std::thread;

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::comm::{Comm, Error};

///
/// Frames on the wire between two workers.
enum Msg<T> {
    /// A block of elements being sorted.
    Block(Vec<T>),
    /// A control word: a length, a flag or a timing.
    Word(u64),
    /// A line of report text.
    Text(String),
    /// Barrier token for one dissemination round.
    Token { epoch: u64, round: u32 },
}

impl<T> Msg<T> {
    fn kind(&self) -> &'static str {
        match self {
            Msg::Block(_) => "block",
            Msg::Word(_) => "word",
            Msg::Text(_) => "text",
            Msg::Token { .. } => "token",
        }
    }
}

/// Number of dissemination rounds for `n` workers.
fn ceil_log2(n: usize) -> u32 {
    if n <= 1 { 0 } else { (n - 1).ilog2() + 1 }
}

///
/// One endpoint of the in-process fabric: rank `rank` out of `size`
/// workers, holding one FIFO channel to and from every peer. Implements
/// [`Comm`], so the algorithms never learn that the "network" is a set
/// of channels inside one process.
pub struct FabricNode<T> {
    rank: usize,
    size: usize,
    txs: Vec<Sender<Msg<T>>>,
    rxs: Vec<Receiver<Msg<T>>>,
    epoch: Cell<u64>,
}

impl<T> FabricNode<T> {
    /// Wires `size` nodes into a full mesh, one channel per ordered pair.
    fn mesh(size: usize) -> Vec<Self> {
        let mut txs: Vec<Vec<Sender<Msg<T>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut rxs: Vec<Vec<Receiver<Msg<T>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        for from in 0..size {
            for to in 0..size {
                let (tx, rx) = unbounded();
                txs[from].push(tx);
                rxs[to].push(rx);
            }
        }
        txs.into_iter()
            .zip(rxs)
            .enumerate()
            .map(|(rank, (txs, rxs))| FabricNode {
                rank,
                size,
                txs,
                rxs,
                epoch: Cell::new(0),
            })
            .collect()
    }

    fn push(&self, to: usize, msg: Msg<T>) -> Result<(), Error> {
        self.txs
            .get(to)
            .ok_or(Error::PeerUnreachable(to))?
            .send(msg)
            .map_err(|_| Error::PeerUnreachable(to))
    }

    fn pull(&self, from: usize) -> Result<Msg<T>, Error> {
        self.rxs
            .get(from)
            .ok_or(Error::PeerUnreachable(from))?
            .recv()
            .map_err(|_| Error::PeerUnreachable(from))
    }
}

impl<T: Clone + Send> Comm<T> for FabricNode<T> {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, to: usize, block: &[T]) -> Result<(), Error> {
        self.push(to, Msg::Block(block.to_vec()))
    }

    fn recv(&self, from: usize) -> Result<Vec<T>, Error> {
        match self.pull(from)? {
            Msg::Block(block) => Ok(block),
            other => Err(Error::FrameMismatch {
                from,
                expected: "block",
                found: other.kind(),
            }),
        }
    }

    fn send_word(&self, to: usize, word: u64) -> Result<(), Error> {
        self.push(to, Msg::Word(word))
    }

    fn recv_word(&self, from: usize) -> Result<u64, Error> {
        match self.pull(from)? {
            Msg::Word(word) => Ok(word),
            other => Err(Error::FrameMismatch {
                from,
                expected: "word",
                found: other.kind(),
            }),
        }
    }

    fn send_text(&self, to: usize, text: String) -> Result<(), Error> {
        self.push(to, Msg::Text(text))
    }

    fn recv_text(&self, from: usize) -> Result<String, Error> {
        match self.pull(from)? {
            Msg::Text(text) => Ok(text),
            other => Err(Error::FrameMismatch {
                from,
                expected: "text",
                found: other.kind(),
            }),
        }
    }

    /// Dissemination barrier: in round `r` every worker sends a token
    /// `2^r` ranks ahead and waits for the token from `2^r` ranks behind.
    /// After `ceil(log2(size))` rounds each worker has transitively heard
    /// from every other.
    fn barrier(&self) -> Result<(), Error> {
        let epoch = self.epoch.get();
        self.epoch.set(epoch + 1);
        if self.size < 2 {
            return Ok(());
        }
        for round in 0..ceil_log2(self.size) {
            let hop = 1usize << round;
            let to = (self.rank + hop) % self.size;
            let from = (self.rank + self.size - hop) % self.size;
            self.push(to, Msg::Token { epoch, round })?;
            match self.pull(from)? {
                Msg::Token { epoch: e, round: r } if e == epoch && r == round => {}
                Msg::Token { .. } => return Err(Error::BarrierSkew(from)),
                other => {
                    return Err(Error::FrameMismatch {
                        from,
                        expected: "token",
                        found: other.kind(),
                    });
                }
            }
        }
        Ok(())
    }
}

///
/// Runs `f` once per rank on `size` worker threads wired into a full
/// mesh, then joins them all and collects their results in rank order.
///
/// A worker that fails drops its endpoints, so every peer blocked on it
/// fails its next receive with [`Error::PeerUnreachable`]: one failure
/// aborts the whole run. The reported error is the lowest-ranked
/// worker's.
pub fn spawn<T, R, F>(size: usize, f: F) -> Result<Vec<R>>
where
    T: Clone + Send,
    R: Send,
    F: Fn(FabricNode<T>) -> Result<R> + Send + Sync,
{
    let nodes = FabricNode::mesh(size);
    thread::scope(|scope| {
        let workers: Vec<_> = nodes
            .into_iter()
            .map(|node| {
                let f = &f;
                scope.spawn(move || f(node))
            })
            .collect();
        workers
            .into_iter()
            .enumerate()
            .map(|(rank, worker)| match worker.join() {
                Ok(outcome) => {
                    outcome.with_context(|| format!("worker {rank} aborted"))
                }
                Err(_) => Err(anyhow!("worker {rank} panicked")),
            })
            .collect()
    })
}
