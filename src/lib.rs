/*!
# htj2k-rs

A pure Rust implementation of the High-Throughput JPEG 2000 (HTJ2K, ITU-T
T.814 / ISO/IEC 15444-15) block decoder: the arithmetic-free entropy coder
that replaces Part 1's MQ-coded bit-plane passes with four interleaved
bit-streams (MagSgn, MEL, VLC, SigProp/MagRef) decoded in a single forward
sweep per code-block.

## Scope

This crate covers exactly the HT block decoder described in ITU-T T.814
§7: given one code-block's compressed bytes and its header-derived
parameters (missing MSBs, number of coding passes, segment lengths,
dimensions), it reconstructs the block's sign-magnitude sample plane.
Container parsing (JP2 boxes, code-stream markers), tile and resolution
partitioning, the wavelet transform, quantisation, and the Part-1
arithmetic-coded block coder are all out of scope — this module receives a
flat byte buffer and integer parameters from, and returns decoded samples
to, a caller that owns that surrounding machinery.

See [`jpeg2000::ht_block_coder::decode_block`] for the entry point.
*/

pub mod error;
pub mod jpeg2000;

pub use error::BlockError;
pub use jpeg2000::ht_block_coder::{decode_block, decode_block_lenient, BlockParams};
