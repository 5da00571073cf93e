//! Black-box tests of the public `decode_block` entry point, covering the
//! header-validation scenarios that don't require a hand-built conformant
//! bit-stream (see DESIGN.md for why the full-content scenarios are not
//! exercised end-to-end here).

use htj2k_rs::{decode_block, decode_block_lenient, BlockError, BlockParams};

fn params(overrides: impl FnOnce(&mut BlockParams)) -> BlockParams {
    let mut p = BlockParams {
        missing_msbs: 26,
        num_passes: 1,
        lengths1: 4,
        lengths2: 0,
        width: 4,
        height: 4,
        stride: 4,
    };
    overrides(&mut p);
    p
}

#[test]
fn empty_block_with_zero_scup_is_malformed() {
    // scup = (code[L1-1] << 4) | (code[L1-2] & 0xF) = 0 for an all-zero tail.
    let coded = [0x00u8, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
    let mut decoded = vec![0u32; 16];
    let p = params(|_| {});
    assert_eq!(decode_block(&coded, &mut decoded, &p), Err(BlockError::MalformedScup));
}

#[test]
fn scup_exceeding_lengths1_is_malformed() {
    // scup = (0x00 << 4) | (0x0A & 0xF) = 10, which exceeds lengths1 = 4.
    let coded = [0x00u8, 0xFF, 0x0A, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
    let mut decoded = vec![0u32; 16];
    let p = params(|_| {});
    assert_eq!(decode_block(&coded, &mut decoded, &p), Err(BlockError::MalformedScup));
}

#[test]
fn unsupported_pass_count_rejected_before_touching_stream() {
    let coded = [0u8; 16];
    let mut decoded = vec![0u32; 16];
    let p = params(|p| p.num_passes = 5);
    assert_eq!(decode_block(&coded, &mut decoded, &p), Err(BlockError::UnsupportedPassCount));
}

#[test]
fn truncated_refinement_recovers_through_lenient_entry_point() {
    let coded = [0u8; 16];
    let mut decoded = vec![0u32; 16];
    let p = params(|p| {
        p.num_passes = 2;
        p.lengths2 = 0;
    });
    assert_eq!(decode_block(&coded, &mut decoded, &p), Err(BlockError::TruncatedRefinement));
    // the lenient entry point clamps to one pass and retries; the retry then
    // fails for an unrelated reason (malformed scup in this all-zero fixture)
    // rather than propagating TruncatedRefinement again.
    let mut decoded2 = vec![0u32; 16];
    assert_ne!(
        decode_block_lenient(&coded, &mut decoded2, &p),
        Err(BlockError::TruncatedRefinement)
    );
}
