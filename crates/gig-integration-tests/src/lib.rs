//! Integration test crate for the gigboard marketplace core.
//!
//! Holds the tests that cross crate boundaries (credits → listings →
//! bookings → escrow). No public API; everything lives under `tests/`.

#![forbid(unsafe_code)]
