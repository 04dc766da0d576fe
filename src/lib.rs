//! Hypercube bitonic sort for distributed-memory arrays, with the
//! message-passing substrate realized as an in-process fabric of worker
//! threads. The goal is to provide:
//! 1. A blocking point-to-point communicator seam ([`comm::Comm`]) with
//!    input validation and typed errors, plus the collective and
//!    reduction helpers the sort is built from.
//! 2. The sorting network itself: an equal-block bitonic sort whose
//!    compare-exchange rounds are fenced by global barriers.

pub mod collective;

/// Interface to Comm objects
pub mod comm;
pub mod config;
pub mod fabric;
pub mod log;
pub mod reduction;
pub mod shift;
pub mod sort;
