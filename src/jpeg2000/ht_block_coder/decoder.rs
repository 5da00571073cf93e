//! Entry point for the HTJ2K high-throughput block decoder.

use super::bit_reader::{ForwardReader, ReverseReader};
use super::cleanup::{self, Grids};
use super::magref;
use super::mel::MelDecoder;
use super::sigprop;
use crate::error::BlockError;

/// Header-derived parameters accompanying one code-block's compressed data.
/// Bundled rather than passed as a long flat argument list, matching the
/// convention this crate already uses for its other codec entry points.
#[derive(Debug, Clone, Copy)]
pub struct BlockParams {
    /// Number of zero MSB bit-planes skipped by the encoder (0..=30).
    pub missing_msbs: u32,
    /// Coding passes present: 1 (cleanup only), 2 (+SPP), 3 (+SPP+MRP).
    pub num_passes: u32,
    /// Length in bytes of the cleanup segment (MagSgn + MEL/VLC tail).
    pub lengths1: usize,
    /// Length in bytes of the refinement segment (SigProp + MagRef).
    pub lengths2: usize,
    pub width: usize,
    pub height: usize,
    /// Row stride of `decodedData`, in samples; must be >= width.
    pub stride: usize,
}

fn validate(coded: &[u8], params: &BlockParams) -> Result<u32, BlockError> {
    if params.num_passes > 3 {
        return Err(BlockError::UnsupportedPassCount);
    }
    if params.missing_msbs > 29 && params.num_passes > 1 {
        return Err(BlockError::TooManyMissingMsbs);
    }
    if params.num_passes > 1 && params.lengths2 == 0 {
        return Err(BlockError::TruncatedRefinement);
    }
    if params.lengths1 < 2 || coded.len() < params.lengths1 {
        return Err(BlockError::MalformedScup);
    }
    let scup = ((coded[params.lengths1 - 1] as u32) << 4) | (coded[params.lengths1 - 2] as u32 & 0x0F);
    if scup < 2 || scup as usize > params.lengths1 || scup > 4079 {
        return Err(BlockError::MalformedScup);
    }
    Ok(scup)
}

/// Decodes one HTJ2K code-block, failing on any malformed-stream condition
/// including a truncated refinement segment (`numPasses > 1` with
/// `lengths2 == 0`). See [`decode_block_lenient`] for a caller that
/// downgrades the latter to a warning instead, per the standard's allowance.
pub fn decode_block(
    coded: &[u8],
    decoded: &mut [u32],
    params: &BlockParams,
) -> Result<(), BlockError> {
    log::trace!(
        "HT block: {}x{} stride={} passes={} lengths=({},{}) missing_msbs={}",
        params.width,
        params.height,
        params.stride,
        params.num_passes,
        params.lengths1,
        params.lengths2,
        params.missing_msbs,
    );
    let scup = validate(coded, params).map_err(|e| {
        log::debug!("HT block: header validation failed: {e}");
        e
    })?;
    let p = 30 - params.missing_msbs;

    let magsgn_len = params.lengths1 - scup as usize;
    let magsgn_data = &coded[..magsgn_len.min(coded.len())];
    let mut magsgn = ForwardReader::new(magsgn_data, 0xFF);

    let mel_data = &coded[magsgn_len..params.lengths1.min(coded.len())];
    let mut mel = MelDecoder::new(mel_data);

    let mut vlc_reader = ReverseReader::new_vlc(coded, params.lengths1, scup as usize);

    let mut grids = Grids::new(params.width, params.height);

    cleanup::run_cleanup_pass(
        &mut grids,
        decoded,
        params.stride,
        params.width,
        params.height,
        params.missing_msbs,
        p,
        &mut mel,
        &mut vlc_reader,
        &mut magsgn,
    )
    .map_err(|e| {
        log::debug!("HT block: cleanup pass failed: {e}");
        e
    })?;

    if params.num_passes >= 2 {
        let refine = &coded[params.lengths1..(params.lengths1 + params.lengths2).min(coded.len())];
        let mut sigprop_reader = ForwardReader::new(refine, 0x00);
        let mut magref_reader = if params.num_passes >= 3 {
            Some(ReverseReader::new_mrp(refine, refine.len().saturating_sub(1), refine.len()))
        } else {
            None
        };

        let mut row = 0usize;
        while row < params.height {
            // MRP runs before SPP for each stripe: it must refine only the
            // samples that were significant after cleanup, reading one
            // MagRef bit per such sample. SPP mutates `grids` (it marks its
            // own discoveries significant), so running it first would hand
            // MRP a sigma grid that includes SPP-discovered samples with no
            // corresponding bit in the MagRef stream, desyncing the reverse
            // reader for the rest of the block.
            if let Some(reader) = magref_reader.as_mut() {
                magref::run_stripe(
                    &grids,
                    decoded,
                    params.stride,
                    params.width,
                    params.height,
                    row,
                    reader,
                    p,
                );
            }
            sigprop::run_stripe(
                &mut grids,
                decoded,
                params.stride,
                params.width,
                params.height,
                row,
                &mut sigprop_reader,
                p,
            );
            row += 4;
        }
    }

    Ok(())
}

/// Like [`decode_block`], but a `TruncatedRefinement` condition is logged
/// and recovered from by clamping `numPasses` to 1 and retrying, per
/// spec.md's documented soft-failure handling.
pub fn decode_block_lenient(
    coded: &[u8],
    decoded: &mut [u32],
    params: &BlockParams,
) -> Result<(), BlockError> {
    match decode_block(coded, decoded, params) {
        Err(BlockError::TruncatedRefinement) => {
            log::warn!(
                "HT block: numPasses={} but refinement segment is empty; clamping to 1",
                params.num_passes
            );
            let clamped = BlockParams { num_passes: 1, ..*params };
            decode_block(coded, decoded, &clamped)
        }
        other => other,
    }
}
