//! JPEG 2000 / High-Throughput JPEG 2000 (ITU-T T.814, Part 15).
//!
//! This crate implements only the HT block decoder: reconstructing one
//! code-block's sign-magnitude sample plane from its compressed MagSgn,
//! MEL, VLC, SigProp and MagRef bit-streams. Container parsing, tile and
//! resolution partitioning, the wavelet transform and the Part-1
//! arithmetic-coded block coder are out of scope; callers own all of that
//! and hand this module a flat byte buffer plus header-derived parameters.

pub mod ht_block_coder;
