//
// Copyright 2026 Georgia Institute of Technology
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use thiserror::Error;

///
/// Errors raised by the message substrate. Every one of them is fatal to
/// the run: there is no retry or rejoin path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The peer's endpoints are gone, usually because its worker already
    /// aborted.
    #[error("peer {0} is unreachable")]
    PeerUnreachable(usize),
    /// A frame of the wrong kind arrived; the two sides disagree on the
    /// protocol position.
    #[error("expected a {expected} frame from peer {from}, found {found}")]
    FrameMismatch {
        from: usize,
        expected: &'static str,
        found: &'static str,
    },
    /// A barrier token belonging to a different barrier call.
    #[error("barrier token from peer {0} is out of step")]
    BarrierSkew(usize),
    #[error("rank {0} cannot exchange with itself")]
    SelfExchange(usize),
}

///
/// Blocking point-to-point substrate connecting `size` peers ranked
/// `0..size`, with rank 0 acting as the root. Sends may complete before
/// the matching receive is posted; receives block until a frame arrives.
/// Frames between the same ordered pair of peers arrive in order.
///
/// Blocks of `T` carry the data being sorted; words carry lengths, flags
/// and timings; text carries gathered reports.
pub trait Comm<T> {
    /// This peer's rank.
    fn rank(&self) -> usize;
    /// Number of peers in the topology.
    fn size(&self) -> usize;
    /// Sends a block of elements to `to`.
    fn send(&self, to: usize, block: &[T]) -> Result<(), Error>;
    /// Receives a block of elements from `from`.
    fn recv(&self, from: usize) -> Result<Vec<T>, Error>;
    /// Sends a single control word to `to`.
    fn send_word(&self, to: usize, word: u64) -> Result<(), Error>;
    /// Receives a single control word from `from`.
    fn recv_word(&self, from: usize) -> Result<u64, Error>;
    /// Sends a line of report text to `to`.
    fn send_text(&self, to: usize, text: String) -> Result<(), Error>;
    /// Receives a line of report text from `from`.
    fn recv_text(&self, from: usize) -> Result<String, Error>;
    /// Blocks until every peer has entered the same barrier call.
    fn barrier(&self) -> Result<(), Error>;

    /// Returns true if this peer is rank 0.
    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

///
/// Swaps a block with `partner`: ours goes out, theirs comes back. The
/// lower rank sends before receiving and the higher rank receives before
/// sending, which stays deadlock-free even under rendezvous sends.
pub fn exchange<T>(
    comm: &dyn Comm<T>,
    partner: usize,
    block: &[T],
) -> Result<Vec<T>, Error> {
    let rank = comm.rank();
    if partner == rank {
        return Err(Error::SelfExchange(rank));
    }
    if rank < partner {
        comm.send(partner, block)?;
        comm.recv(partner)
    } else {
        let theirs = comm.recv(partner)?;
        comm.send(partner, block)?;
        Ok(theirs)
    }
}
