//! High-Throughput block coder (ITU-T T.814 / ISO/IEC 15444-15).
//!
//! A code-block's compressed data holds up to three bit-streams sharing one
//! byte range: MagSgn growing forward from the start, MEL+VLC interleaved
//! and growing backward from `Lcup` (the cleanup segment length), and,
//! when present, a separate SigProp/MagRef segment beyond `Lcup` carrying
//! the refinement passes. [`decoder::decode_block`] is the external entry
//! point; everything else in this module is internal plumbing for it.

mod bit_reader;
mod cleanup;
mod decoder;
mod magref;
mod mel;
mod sigprop;
mod vlc;

pub use decoder::{decode_block, decode_block_lenient, BlockParams};
