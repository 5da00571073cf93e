//! Significance-propagation pass (SPP): discovers samples that become
//! significant because an 8-neighbour was significant after cleanup.

use super::bit_reader::ForwardReader;
use super::cleanup::Grids;

/// Does `(row, col)` have any of its 8 neighbours significant in `grids`?
fn has_significant_neighbour(grids: &Grids, row: isize, col: isize) -> bool {
    for dr in -1isize..=1 {
        for dc in -1isize..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            if grids.sig(row + dr, col + dc) {
                return true;
            }
        }
    }
    false
}

/// Runs SPP over one completed 4-row stripe (`stripe_row` is its first row;
/// may be a partial stripe at the bottom edge). `decoded` already holds the
/// cleanup-pass sample values; newly-significant samples get the bin-centre
/// value `3 << (p - 2)`.
pub fn run_stripe(
    grids: &mut Grids,
    decoded: &mut [u32],
    stride: usize,
    width: usize,
    height: usize,
    stripe_row: usize,
    reader: &mut ForwardReader,
    p: u32,
) {
    debug_assert!(p >= 2, "SPP requires at least two coded bit-planes");
    let stripe_height = (height - stripe_row).min(4);

    let mut x = 0usize;
    while x < width {
        let group_width = (width - x).min(4);
        let mut newly_significant: Vec<(usize, usize)> = Vec::with_capacity(16);

        for dc in 0..group_width {
            let col = x + dc;
            for dr in 0..stripe_height {
                let row = stripe_row + dr;
                if grids.sig(row as isize, col as isize) {
                    continue;
                }
                if !has_significant_neighbour(grids, row as isize, col as isize) {
                    continue;
                }
                let bit = reader.fetch() & 1;
                reader.advance(1);
                if bit == 1 {
                    // Mark significant immediately (not after the whole group
                    // scan) so later samples in this same group see it as an
                    // 8-neighbour, matching the reference's in-place mbr
                    // dilation rather than a batched update.
                    grids.mark_significant(row, col);
                    newly_significant.push((row, col));
                }
            }
        }

        for &(row, col) in &newly_significant {
            let sign = reader.fetch() & 1;
            reader.advance(1);
            let sample = (sign << 31) | (3u32 << (p - 2));
            if row < height && col < width {
                decoded[row * stride + col] = sample;
            }
        }

        x += group_width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_with_no_significant_neighbour_consumes_no_bits() {
        let mut grids = Grids::new(4, 4);
        let mut decoded = vec![0u32; 16];
        let data = [0u8; 8];
        let mut reader = ForwardReader::new(&data, 0);
        run_stripe(&mut grids, &mut decoded, 4, 4, 4, 0, &mut reader, 4);
        assert!(decoded.iter().all(|&s| s == 0));
    }
}
