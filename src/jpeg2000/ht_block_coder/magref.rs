//! Magnitude-refinement pass (MRP): toggles the bin-centre bit of every
//! already-significant sample using one bit from the reverse MagRef reader.

use super::bit_reader::ReverseReader;
use super::cleanup::Grids;

/// Runs MRP over one completed (possibly partial) 4-row stripe.
pub fn run_stripe(
    grids: &Grids,
    decoded: &mut [u32],
    stride: usize,
    width: usize,
    height: usize,
    stripe_row: usize,
    reader: &mut ReverseReader,
    p: u32,
) {
    debug_assert!(p >= 2, "MRP requires at least two coded bit-planes");
    let stripe_height = (height - stripe_row).min(4);
    let half = 1u32 << (p - 2);

    for dc in 0..width {
        for dr in 0..stripe_height {
            let row = stripe_row + dr;
            let col = dc;
            if !grids.sig(row as isize, col as isize) {
                continue;
            }
            let b = reader.fetch() & 1;
            reader.advance(1);
            let idx = row * stride + col;
            decoded[idx] ^= (1 - b) << (p - 1);
            decoded[idx] |= half;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insignificant_sample_is_untouched() {
        let grids = Grids::new(4, 4);
        let mut decoded = vec![0xABu32; 16];
        let data = [0u8; 8];
        let mut reader = ReverseReader::new_mrp(&data, 0, 8);
        run_stripe(&grids, &mut decoded, 4, 4, 4, 0, &mut reader, 4);
        assert!(decoded.iter().all(|&s| s == 0xAB));
    }
}
