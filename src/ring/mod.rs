//! Fork arbitration.
//!
//! [`ForkRing`] owns the circular fork table and the shared food counter.
//! Every philosopher contends through it; it is the only shared mutable state
//! of the arbitration core.
//!
//! ```text
//!        fork 0      fork 1      fork 2            fork n-1
//!   ──► [ P0 needs 0,1 ][ P1 needs 1,2 ] ... [ Pn-1 needs n-1,0 ] ──┐
//!   └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! A pair is taken or returned as one step under a single ring-wide lock, so
//! no philosopher ever holds one fork unpaired and the classic hold-and-wait
//! deadlock cannot form.

mod fork_ring;

pub use fork_ring::ForkRing;
