//! Cleanup pass (CUP): the core two-row-stripe state machine that turns
//! MEL + VLC + MagSgn bits into significance and sign-magnitude samples.
//!
//! Significance (`sigma`) and the per-sample bit-depth hint (`e_val`, used
//! for the non-initial rows' kappa computation) are kept as plain 2D grids
//! rather than the reference's nibble-packed 32-bit words: the packing is a
//! SIMD-era throughput trick, explicitly out of scope for this port (see
//! spec.md's Non-goals), and an indexable grid is both simpler and safer.

use super::bit_reader::ForwardReader;
use super::mel::MelDecoder;
use super::vlc::{self, decode_init_uvlc, decode_noninit_uvlc, QuadInfo};
use crate::error::BlockError;

/// Significance and bit-depth state accumulated across the whole block.
/// Queries past the block edges (negative row/col, or >= width/height)
/// always read as zero, matching spec.md invariant 2 ("sigma bits for
/// locations outside the block rectangle are 0").
pub struct Grids {
    sigma: Vec<u8>,
    e_val: Vec<u8>,
    width: usize,
    height: usize,
}

impl Grids {
    pub fn new(width: usize, height: usize) -> Self {
        Self { sigma: vec![0; width * height], e_val: vec![0; width * height], width, height }
    }

    fn in_bounds(&self, r: isize, c: isize) -> bool {
        r >= 0 && c >= 0 && (r as usize) < self.height && (c as usize) < self.width
    }

    pub fn sig(&self, r: isize, c: isize) -> bool {
        self.in_bounds(r, c) && self.sigma[r as usize * self.width + c as usize] != 0
    }

    fn set_sig(&mut self, r: usize, c: usize) {
        if r < self.height && c < self.width {
            self.sigma[r * self.width + c] = 1;
        }
    }

    /// Marks a sample significant from outside this module (SPP).
    pub fn mark_significant(&mut self, r: usize, c: usize) {
        self.set_sig(r, c);
    }

    pub fn e(&self, r: isize, c: isize) -> u8 {
        if self.in_bounds(r, c) {
            self.e_val[r as usize * self.width + c as usize]
        } else {
            0
        }
    }

    fn set_e(&mut self, r: usize, c: usize, v: u8) {
        if r < self.height && c < self.width {
            self.e_val[r * self.width + c] = v;
        }
    }
}

/// Quad sample offsets in decode order: top-left, bottom-left, top-right,
/// bottom-right (matching the order the VLC table's rho/E bits are packed
/// in, sample index 0..3).
const SAMPLE_OFFSETS: [(usize, usize); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

#[allow(clippy::too_many_arguments)]
fn decode_quad(
    qinf: QuadInfo,
    row: usize,
    col0: usize,
    u_q: u32,
    grids: &mut Grids,
    decoded: &mut [u32],
    stride: usize,
    width: usize,
    height: usize,
    magsgn: &mut ForwardReader,
    p: u32,
) {
    for (i, &(dr, dc)) in SAMPLE_OFFSETS.iter().enumerate() {
        let i = i as u32;
        let r = row + dr;
        let c = col0 + dc;
        if qinf.sig_bit(i) {
            let ms_val = magsgn.fetch();
            let e_k = qinf.e_k_bit(i);
            let m_n = u_q.saturating_sub(e_k);
            magsgn.advance(m_n);
            let sign = ms_val & 1;
            let mask = if m_n >= 32 { u32::MAX } else { (1u32 << m_n) - 1 };
            let mut v_n = ms_val & mask;
            v_n |= qinf.e_1_bit(i) << m_n;
            v_n |= 1;
            let sample = (sign << 31) | ((v_n + 2) << (p - 1));
            if r < height && c < width {
                decoded[r * stride + c] = sample;
            }
            grids.set_sig(r, c);
            if dr == 1 {
                grids.set_e(r, c, (32 - v_n.leading_zeros()) as u8);
            }
        } else if r < height && c < width {
            decoded[r * stride + c] = 0;
        }
    }
}

fn kappa_for_quad(is_initial: bool, rho: u8, grids: &Grids, row: usize, col0: usize) -> u32 {
    if is_initial || rho.count_ones() < 2 {
        return 1;
    }
    let e_north = grids.e(row as isize - 1, col0 as isize);
    let e_northeast = grids.e(row as isize - 1, col0 as isize + 1);
    let e_max = e_north.max(e_northeast) as u32;
    e_max.saturating_sub(1).max(1)
}

/// Consumes one MEL event and reports whether it terminates (event == 1);
/// `run` tracks the pending zero-count from the last `mel_get_run` call,
/// exactly as the reference's `run -= 2` / refill dance.
fn mel_event(mel: &mut MelDecoder, run: &mut i64) -> bool {
    *run -= 2;
    let terminates = *run == -1;
    if *run < 0 {
        let next = mel.get_run();
        *run = (next.count as i64) * 2 + (!next.terminates as i64);
    }
    terminates
}

#[allow(clippy::too_many_arguments)]
pub fn run_cleanup_pass(
    grids: &mut Grids,
    decoded: &mut [u32],
    stride: usize,
    width: usize,
    height: usize,
    missing_msbs: u32,
    p: u32,
    mel: &mut MelDecoder,
    vlc_reader: &mut super::bit_reader::ReverseReader,
    magsgn: &mut ForwardReader,
) -> Result<(), BlockError> {
    let mmsbp1 = missing_msbs + 1;
    let first_run = mel.get_run();
    let mut run: i64 = (first_run.count as i64) * 2 + (!first_run.terminates as i64);

    // Non-initial-row context (eqn. 2 of T.814): north/north-east come from
    // the stripe above, west/south-west from the quad immediately to the
    // left — all three are plain lookups into the sigma grid built so far,
    // so no bit-carry state is needed across quads the way the reference's
    // packed `qinf`/`lineState` words carry it.
    let context_from_grid = |grids: &Grids, row: usize, col0: isize| -> u8 {
        let north = grids.sig(row as isize - 1, col0 - 1) || grids.sig(row as isize - 1, col0);
        let northeast =
            grids.sig(row as isize - 1, col0 + 1) || grids.sig(row as isize - 1, col0 + 2);
        let west = grids.sig(row as isize, col0 - 1) || grids.sig(row as isize + 1, col0 - 1);
        (north as u8) | ((west as u8) << 1) | ((northeast as u8) << 2)
    };

    let mut y = 0usize;
    while y < height {
        let is_initial = y == 0;
        let table = if is_initial { &vlc::VLC_TABLE_INIT } else { &vlc::VLC_TABLE_NONINIT };
        let mut c_q: u8 = 0;

        let mut x = 0usize;
        while x < width {
            // first quad
            if !is_initial {
                c_q = context_from_grid(grids, y, x as isize);
            }
            let vlc_head = vlc_reader.fetch();
            let mut qinf0 = vlc::lookup(table, c_q, vlc_head as u16);
            if c_q == 0 {
                let terminates = mel_event(mel, &mut run);
                if !terminates {
                    qinf0 = QuadInfo::ZERO;
                }
            }
            if is_initial {
                c_q = qinf0.next_context_initial_row();
            }
            vlc_reader.advance(qinf0.cwd_len());

            // second quad
            let mut qinf1 = QuadInfo::ZERO;
            if x + 2 < width {
                let c_q1 = if is_initial { c_q } else { context_from_grid(grids, y, (x + 2) as isize) };
                let vlc_head = vlc_reader.fetch();
                qinf1 = vlc::lookup(table, c_q1, vlc_head as u16);
                if c_q1 == 0 {
                    let terminates = mel_event(mel, &mut run);
                    if !terminates {
                        qinf1 = QuadInfo::ZERO;
                    }
                }
                if is_initial {
                    c_q = qinf1.next_context_initial_row();
                }
                vlc_reader.advance(qinf1.cwd_len());
            }

            // u values
            let mut u_raw = [0u32; 2];
            let uvlc_mode_base = (qinf0.u_off() as u32) | ((qinf1.u_off() as u32) << 1);
            let consumed;
            if is_initial {
                let mut mode = uvlc_mode_base;
                if mode == 3 {
                    let terminates = mel_event(mel, &mut run);
                    if terminates {
                        mode += 1;
                    }
                }
                let vlc_val = vlc_reader.fetch();
                consumed = decode_init_uvlc(vlc_val, mode, &mut u_raw);
            } else {
                let vlc_val = vlc_reader.fetch();
                consumed = decode_noninit_uvlc(vlc_val, uvlc_mode_base, &mut u_raw);
            }
            vlc_reader.advance(consumed);

            let kappa0 = kappa_for_quad(is_initial, qinf0.rho(), grids, y, x);
            let u_q0 = u_raw[0] + kappa0 - 1;
            if u_q0 > mmsbp1 {
                return Err(BlockError::UnreachableBitplane);
            }
            decode_quad(qinf0, y, x, u_q0, grids, decoded, stride, width, height, magsgn, p);

            if x + 2 < width {
                let kappa1 = kappa_for_quad(is_initial, qinf1.rho(), grids, y, x + 2);
                let u_q1 = u_raw[1] + kappa1 - 1;
                if u_q1 > mmsbp1 {
                    return Err(BlockError::UnreachableBitplane);
                }
                decode_quad(qinf1, y, x + 2, u_q1, grids, decoded, stride, width, height, magsgn, p);
            }

            x += 4;
        }

        y += 2;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_reads_zero_outside_rectangle() {
        let grids = Grids::new(4, 4);
        assert!(!grids.sig(-1, 0));
        assert!(!grids.sig(0, 10));
        assert_eq!(grids.e(-1, 0), 0);
    }

    #[test]
    fn decode_quad_writes_bin_centre_sample_and_marks_significance() {
        let mut grids = Grids::new(4, 4);
        let mut decoded = vec![0u32; 16];
        // rho bit 0 set (top-left significant), no E_k/E_1; one MagSgn byte
        // supplying sign=0 and enough zero magnitude bits for u_q=1.
        let qinf = QuadInfo(1 << 4);
        let data = [0x00u8; 8];
        let mut magsgn = ForwardReader::new(&data, 0xFF);
        decode_quad(qinf, 0, 0, 1, &mut grids, &mut decoded, 4, 4, 4, &mut magsgn, 3);
        // m_n = u_q - e_k = 1, v_n = (bits&1)|1 = 1, sample = (1+2)<<(3-1) = 12
        assert_eq!(decoded[0], 12);
        assert!(grids.sig(0, 0));
    }
}
