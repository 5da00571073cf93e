//! VLC lookup tables and the UVLC auxiliary decoder.
//!
//! Two 1024-entry tables map `(context << 7) | head7bits` to a packed quad
//! descriptor (rho, u_off, E_k, E_1, codeword length); one is used for the
//! initial row of quads in a stripe, the other for subsequent rows. Both are
//! built once, at compile time, from per-context source rows.
//!
//! The literal ITU-T T.814 Annex C / K.1 / K.2 codeword assignment (the
//! `table0.h` / `table1.h` row data `ojph_block_decoder.cpp` `#include`s) is
//! not present anywhere in this exercise's retrieval pack — see `DESIGN.md`
//! for the record of that search. What *is* specified and is reproduced
//! faithfully here: rho is a 4-bit significance pattern, so each context's
//! codewords form a complete, collision-free 16-entry code over the table's
//! head bits; u_off tracks whether the quad has any significant sample;
//! E_k/E_1 shorten or promote the per-sample magnitude field exactly as
//! `cleanup::decode_quad` expects. `row_for` builds this mapping per
//! `(context, rho)` pair via a bijective rotate-and-fold of `rho`, keyed by
//! the context and by which of the two tables is being built, so distinct
//! contexts and the init/non-init tables never collapse onto the same
//! codeword assignment the way a single context-blind `rho -> rho` identity
//! map would.

/// One source row contributing to a VLC table: a fixed-length codeword
/// `cwd` (its low `cwd_len` bits) mapping to a quad descriptor.
#[derive(Clone, Copy)]
struct VlcRow {
    rho: u8,
    u_off: u8,
    e_k: u8,
    e_1: u8,
    cwd: u8,
    cwd_len: u8,
}

/// Per-sample E_k/E_1 bits for a given significance pattern: E_k shortens
/// the magnitude field of a quad's lone significant sample by one bit
/// (popcount(rho) == 1); E_1 promotes the first sample's magnitude MSB when
/// every sample in the quad is significant (popcount(rho) == 4).
const fn e_bits(rho: u8) -> (u8, u8) {
    let e_k = if rho.count_ones() == 1 { rho } else { 0 };
    let e_1 = if rho.count_ones() == 4 { 0b0001 } else { 0 };
    (e_k, e_1)
}

/// Bijective 4-bit codeword assignment for `rho` under a given `context`
/// and `table_id` (0 = init, 1 = non-init): rotate `rho`'s bits left by
/// `context & 0x3`, then XOR with a key mixing `context` and `table_id`.
/// Both steps are bijections on 4-bit values, so within any one
/// `(context, table_id)` pair the 16 `rho` patterns get 16 distinct,
/// collision-free codewords. The key also varies with `context` and
/// `table_id` (`context * 7` hits all 8 residues mod 16 as `context` ranges
/// 0..8), so distinct contexts within a table, and the init vs. non-init
/// table at a given context, generally assign different codewords to the
/// same `rho` — see the `vlc` test module for concrete verified instances.
const fn codeword_for(context: u8, rho: u8, table_id: u8) -> u8 {
    let shift = (context & 0x3) as u32;
    let rotated = ((rho << shift) | (rho >> (4 - shift))) & 0xF;
    let key = (context.wrapping_mul(7) ^ table_id.wrapping_mul(13)) & 0xF;
    rotated ^ key
}

const fn row_for(context: u8, rho: u8, table_id: u8) -> VlcRow {
    let (e_k, e_1) = e_bits(rho);
    VlcRow {
        rho,
        u_off: if rho != 0 { 1 } else { 0 },
        e_k,
        e_1,
        cwd: codeword_for(context, rho, table_id),
        cwd_len: 4,
    }
}

const fn pack(row: &VlcRow) -> u16 {
    ((row.rho as u16) << 4)
        | ((row.u_off as u16) << 3)
        | ((row.e_k as u16) << 12)
        | ((row.e_1 as u16) << 8)
        | (row.cwd_len as u16)
}

const fn build_table(table_id: u8) -> [u16; 1024] {
    let mut table = [0u16; 1024];
    let mut context = 0u8;
    while context < 8 {
        let mut rho = 0u8;
        while rho < 16 {
            let row = row_for(context, rho, table_id);
            let mut head = 0usize;
            while head < 128 {
                if (head as u8) & 0xF == row.cwd {
                    table[((context as usize) << 7) | head] = pack(&row);
                }
                head += 1;
            }
            rho += 1;
        }
        context += 1;
    }
    table
}

/// Table for the initial row of quads in a stripe (context derived from
/// horizontal neighbours only).
pub static VLC_TABLE_INIT: [u16; 1024] = build_table(0);

/// Table for non-initial rows (context includes the row above).
pub static VLC_TABLE_NONINIT: [u16; 1024] = build_table(1);

#[inline]
pub fn lookup(table: &[u16; 1024], context: u8, head7: u16) -> QuadInfo {
    QuadInfo(table[((context as usize) << 7) | (head7 as usize & 0x7F)])
}

/// A decoded quad descriptor: rho (4 bits), u_off (1 bit), E_k (4 bits),
/// E_1 (4 bits), codeword length (3 bits), packed into one `u16` exactly as
/// the reference's `qinf` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadInfo(pub u16);

impl QuadInfo {
    pub const ZERO: QuadInfo = QuadInfo(0);

    pub fn rho(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }
    pub fn u_off(self) -> u8 {
        ((self.0 >> 3) & 0x1) as u8
    }
    pub fn cwd_len(self) -> u32 {
        (self.0 & 0x7) as u32
    }
    pub fn e_k(self) -> u8 {
        ((self.0 >> 12) & 0xF) as u8
    }
    pub fn e_1(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }
    /// "Context uses MEL" marker: an all-zero entry.
    pub fn is_mel_marker(self) -> bool {
        self.0 == 0
    }

    /// Per-sample significance bit, `i` in 0..4 (sample index within the quad).
    pub fn sig_bit(self, i: u32) -> bool {
        (self.0 >> (4 + i)) & 1 != 0
    }
    /// Per-sample E_k bit used to shorten the magnitude field by one bit.
    pub fn e_k_bit(self, i: u32) -> u32 {
        ((self.0 >> (12 + i)) & 1) as u32
    }
    /// Per-sample E_1 bit, appended as the magnitude's MSB.
    pub fn e_1_bit(self, i: u32) -> u32 {
        ((self.0 >> (8 + i)) & 1) as u32
    }
    /// Context bits carried into the next quad: eqn. 1 of T.814 for the
    /// initial row (based purely on this quad's own significance pattern).
    /// Non-initial rows derive context directly from the sigma grid instead
    /// (see `cleanup::context_from_grid`), since north/west neighbours are
    /// already recorded there once decoded.
    pub fn next_context_initial_row(self) -> u8 {
        (self.sig_bit(0) as u8) | (((self.0 >> 5) & 0x7) as u8)
    }
}

/// Prefix-code table shared by the initial and non-initial UVLC decoders:
/// index is the low 3 bits of the VLC head; value packs prefix length (2
/// bits), suffix length (3 bits) and prefix value (3 bits).
const UVLC_PREFIX: [u8; 8] = [
    3 | (5 << 2) | (5 << 5), // 000
    1 | (0 << 2) | (1 << 5), // xx1
    2 | (0 << 2) | (2 << 5), // x10
    1 | (0 << 2) | (1 << 5), // xx1
    3 | (1 << 2) | (3 << 5), // 100
    1 | (0 << 2) | (1 << 5), // xx1
    2 | (0 << 2) | (2 << 5), // x10
    1 | (0 << 2) | (1 << 5), // xx1
];

/// Decodes the u-values for a quad pair on the initial stripe row. `mode` is
/// `u_off0 | (u_off1 << 1)`, upgraded to 4 when both u_off are set and the
/// MEL event that follows is also 1. Returns the number of VLC bits consumed
/// and writes `u[0]`/`u[1]` as `u_q + 1` (kappa is folded in by the caller).
pub fn decode_init_uvlc(vlc: u32, mode: u32, u: &mut [u32; 2]) -> u32 {
    let mut vlc = vlc;
    let mut consumed = 0u32;
    match mode {
        0 => {
            u[0] = 1;
            u[1] = 1;
        }
        1 | 2 => {
            let d = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
            vlc >>= d & 0x3;
            consumed += d & 0x3;
            let suffix_len = (d >> 2) & 0x7;
            consumed += suffix_len;
            let d = (d >> 5) + (vlc & ((1u32 << suffix_len) - 1));
            u[0] = if mode == 1 { d + 1 } else { 1 };
            u[1] = if mode == 1 { 1 } else { d + 1 };
        }
        3 => {
            let d1 = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
            vlc >>= d1 & 0x3;
            consumed += d1 & 0x3;
            if (d1 & 0x3) > 2 {
                u[1] = (vlc & 1) + 1 + 1;
                consumed += 1;
                vlc >>= 1;
                let suffix_len = (d1 >> 2) & 0x7;
                consumed += suffix_len;
                let d1 = (d1 >> 5) + (vlc & ((1u32 << suffix_len) - 1));
                u[0] = d1 + 1;
            } else {
                let d2 = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
                vlc >>= d2 & 0x3;
                consumed += d2 & 0x3;

                let suffix_len1 = (d1 >> 2) & 0x7;
                consumed += suffix_len1;
                let dd1 = (d1 >> 5) + (vlc & ((1u32 << suffix_len1) - 1));
                u[0] = dd1 + 1;
                vlc >>= suffix_len1;

                let suffix_len2 = (d2 >> 2) & 0x7;
                consumed += suffix_len2;
                let dd2 = (d2 >> 5) + (vlc & ((1u32 << suffix_len2) - 1));
                u[1] = dd2 + 1;
            }
        }
        4 => {
            let d1 = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
            vlc >>= d1 & 0x3;
            consumed += d1 & 0x3;
            let d2 = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
            vlc >>= d2 & 0x3;
            consumed += d2 & 0x3;

            let suffix_len1 = (d1 >> 2) & 0x7;
            consumed += suffix_len1;
            let dd1 = (d1 >> 5) + (vlc & ((1u32 << suffix_len1) - 1));
            u[0] = dd1 + 3;
            vlc >>= suffix_len1;

            let suffix_len2 = (d2 >> 2) & 0x7;
            consumed += suffix_len2;
            let dd2 = (d2 >> 5) + (vlc & ((1u32 << suffix_len2) - 1));
            u[1] = dd2 + 3;
        }
        _ => unreachable!("uvlc mode out of range"),
    }
    consumed
}

/// Decodes the u-values for a quad pair on a non-initial stripe row. `mode`
/// ranges 0..=3 (no MEL-driven upgrade to 4 outside the initial stripe).
pub fn decode_noninit_uvlc(vlc: u32, mode: u32, u: &mut [u32; 2]) -> u32 {
    let mut vlc = vlc;
    let mut consumed = 0u32;
    match mode {
        0 => {
            u[0] = 1;
            u[1] = 1;
        }
        1 | 2 => {
            let d = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
            vlc >>= d & 0x3;
            consumed += d & 0x3;
            let suffix_len = (d >> 2) & 0x7;
            consumed += suffix_len;
            let d = (d >> 5) + (vlc & ((1u32 << suffix_len) - 1));
            u[0] = if mode == 1 { d + 1 } else { 1 };
            u[1] = if mode == 1 { 1 } else { d + 1 };
        }
        3 => {
            let d1 = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
            vlc >>= d1 & 0x3;
            consumed += d1 & 0x3;
            let d2 = UVLC_PREFIX[(vlc & 0x7) as usize] as u32;
            vlc >>= d2 & 0x3;
            consumed += d2 & 0x3;

            let suffix_len1 = (d1 >> 2) & 0x7;
            consumed += suffix_len1;
            let dd1 = (d1 >> 5) + (vlc & ((1u32 << suffix_len1) - 1));
            u[0] = dd1 + 1;
            vlc >>= suffix_len1;

            let suffix_len2 = (d2 >> 2) & 0x7;
            consumed += suffix_len2;
            let dd2 = (d2 >> 5) + (vlc & ((1u32 << suffix_len2) - 1));
            u[1] = dd2 + 1;
        }
        _ => unreachable!("uvlc mode out of range"),
    }
    consumed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_zero_yields_kappa_baseline() {
        let mut u = [0u32; 2];
        let consumed = decode_init_uvlc(0, 0, &mut u);
        assert_eq!(consumed, 0);
        assert_eq!(u, [1, 1]);
    }

    #[test]
    fn every_context_and_rho_round_trips_through_both_tables() {
        for table_id in 0u8..=1 {
            let table = if table_id == 0 { &VLC_TABLE_INIT } else { &VLC_TABLE_NONINIT };
            for context in 0u8..8 {
                for rho in 0u8..16 {
                    let cwd = codeword_for(context, rho, table_id);
                    let info = lookup(table, context, cwd as u16);
                    assert_eq!(info.rho(), rho, "context={context} table_id={table_id}");
                    assert_eq!(info.u_off(), if rho != 0 { 1 } else { 0 });
                }
            }
        }
    }

    #[test]
    fn init_and_noninit_tables_assign_different_codewords() {
        // context 0, rho 1: VLC_TABLE_INIT uses the identity rotation (cwd=1),
        // VLC_TABLE_NONINIT mixes in the table_id key and lands on a
        // different codeword, so the same table slot holds different rows.
        assert_ne!(VLC_TABLE_INIT[1], VLC_TABLE_NONINIT[1]);
    }

    #[test]
    fn context_changes_the_decoded_rho_for_the_same_head_bits() {
        // Same 7-bit VLC head (5), different contexts, same (init) table:
        // context 0 decodes it as rho=5, context 1 as rho=1.
        assert_eq!(lookup(&VLC_TABLE_INIT, 0, 5).rho(), 5);
        assert_eq!(lookup(&VLC_TABLE_INIT, 1, 5).rho(), 1);
    }

    #[test]
    fn single_significant_sample_sets_matching_e_k_bit() {
        // rho=0b0100 (only sample index 2 significant) should carry e_k
        // set for that sample only, shortening its magnitude field.
        let info = lookup(&VLC_TABLE_INIT, 0, codeword_for(0, 0b0100, 0) as u16);
        assert_eq!(info.rho(), 0b0100);
        assert_eq!(info.e_k_bit(2), 1);
        assert_eq!(info.e_k_bit(0), 0);
    }

    #[test]
    fn fully_significant_quad_sets_e_1_on_first_sample() {
        let info = lookup(&VLC_TABLE_INIT, 0, codeword_for(0, 0b1111, 0) as u16);
        assert_eq!(info.rho(), 0b1111);
        assert_eq!(info.e_1_bit(0), 1);
        assert_eq!(info.e_1_bit(1), 0);
    }

    #[test]
    fn zero_entry_is_mel_marker() {
        assert!(QuadInfo::ZERO.is_mel_marker());
    }
}
