//! Precomputed attack tables: magic-indexed rook/bishop lookups plus the
//! leaper (knight, king, pawn) patterns. Built once on first use.

use std::sync::OnceLock;

use log::warn;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::magics::{BISHOP_MAGICS, ROOK_MAGICS};
use super::types::{Bitboard, Color, Square};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slider {
    Rook,
    Bishop,
}

impl Slider {
    const fn directions(self) -> [(i8, i8); 4] {
        match self {
            Slider::Rook => [(1, 0), (-1, 0), (0, 1), (0, -1)],
            Slider::Bishop => [(1, 1), (1, -1), (-1, 1), (-1, -1)],
        }
    }

    fn builtin_magic(self, sq: Square) -> u64 {
        match self {
            Slider::Rook => ROOK_MAGICS[sq as usize],
            Slider::Bishop => BISHOP_MAGICS[sq as usize],
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Magic {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl Magic {
    #[inline(always)]
    fn index(&self, occ: Bitboard) -> usize {
        self.offset + ((occ & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

struct Tables {
    rook: [Magic; 64],
    bishop: [Magic; 64],
    sliding: Vec<Bitboard>,
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    pawn: [[Bitboard; 64]; 2],
    fallbacks: usize,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

#[inline(always)]
fn tables() -> &'static Tables {
    TABLES.get_or_init(Tables::build)
}

/// Forces table construction. Lookups build lazily anyway; call this to keep
/// the cost out of a timed search.
pub fn init() {
    let _ = tables();
}

#[inline]
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    let t = tables();
    t.sliding[t.rook[sq as usize].index(occ)]
}

#[inline]
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    let t = tables();
    t.sliding[t.bishop[sq as usize].index(occ)]
}

#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    tables().knight[sq as usize]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    tables().king[sq as usize]
}

/// Squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    tables().pawn[color.index()][sq as usize]
}

/// Number of squares whose built-in magic had to be replaced at startup.
pub fn magic_fallbacks() -> usize {
    tables().fallbacks
}

fn offset_square(sq: Square, dr: i8, df: i8) -> Option<Square> {
    let r = (sq >> 3) as i8 + dr;
    let f = (sq & 7) as i8 + df;
    ((0..8).contains(&r) && (0..8).contains(&f)).then(|| (r * 8 + f) as Square)
}

/// Ray-scan reference: every square reachable from `sq`, first blocker included.
pub fn sliding_attacks_slow(slider: Slider, sq: Square, occ: Bitboard) -> Bitboard {
    let mut attacks = 0;
    for (dr, df) in slider.directions() {
        let mut cur = sq;
        while let Some(next) = offset_square(cur, dr, df) {
            attacks |= 1u64 << next;
            if occ & (1u64 << next) != 0 {
                break;
            }
            cur = next;
        }
    }
    attacks
}

/// Occupancy bits that can block `slider` on `sq` (board edges excluded).
pub fn relevant_mask(slider: Slider, sq: Square) -> Bitboard {
    let mut mask = 0;
    for (dr, df) in slider.directions() {
        let mut cur = sq;
        while let Some(next) = offset_square(cur, dr, df) {
            if offset_square(next, dr, df).is_none() {
                break;
            }
            mask |= 1u64 << next;
            cur = next;
        }
    }
    mask
}

// Fills `table` for one square; false on a destructive collision.
fn fill_square(slider: Slider, sq: Square, mask: Bitboard, magic: u64, table: &mut [Bitboard]) -> bool {
    let shift = 64 - mask.count_ones();
    table.fill(0);
    let mut subset: Bitboard = 0;
    loop {
        let attacks = sliding_attacks_slow(slider, sq, subset);
        let idx = (subset.wrapping_mul(magic) >> shift) as usize;
        if table[idx] == 0 {
            table[idx] = attacks;
        } else if table[idx] != attacks {
            return false;
        }
        // Carry-rippler walk over all subsets of the mask.
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            return true;
        }
    }
}

/// Searches a collision-free magic for `sq` by trial of sparse random numbers.
pub fn find_magic(slider: Slider, sq: Square, rng: &mut SmallRng) -> u64 {
    let mask = relevant_mask(slider, sq);
    let mut scratch = vec![0; 1usize << mask.count_ones()];
    loop {
        let candidate = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (mask.wrapping_mul(candidate) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        if fill_square(slider, sq, mask, candidate, &mut scratch) {
            return candidate;
        }
    }
}

fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [0; 64];
    for sq in 0..64u8 {
        for &(dr, df) in deltas {
            if let Some(to) = offset_square(sq, dr, df) {
                table[sq as usize] |= 1u64 << to;
            }
        }
    }
    table
}

impl Tables {
    fn build() -> Tables {
        let mut rng = SmallRng::seed_from_u64(0x5EED_0F_B17B0A2D);
        let mut sliding = Vec::with_capacity(102_400 + 5_248);
        let mut fallbacks = 0;
        let mut rook = [Magic::default(); 64];
        let mut bishop = [Magic::default(); 64];

        for (slider, magics) in [(Slider::Rook, &mut rook), (Slider::Bishop, &mut bishop)] {
            for sq in 0..64u8 {
                let mask = relevant_mask(slider, sq);
                let bits = mask.count_ones();
                let offset = sliding.len();
                sliding.resize(offset + (1usize << bits), 0);
                let mut magic = slider.builtin_magic(sq);
                if !fill_square(slider, sq, mask, magic, &mut sliding[offset..]) {
                    warn!("{slider:?} magic for square {sq} collides; searching a replacement");
                    fallbacks += 1;
                    magic = find_magic(slider, sq, &mut rng);
                    fill_square(slider, sq, mask, magic, &mut sliding[offset..]);
                }
                magics[sq as usize] = Magic { mask, magic, shift: 64 - bits, offset };
            }
        }

        let knight = leaper_table(&[(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)]);
        let king = leaper_table(&[(1, -1), (1, 0), (1, 1), (0, -1), (0, 1), (-1, -1), (-1, 0), (-1, 1)]);
        let pawn = [leaper_table(&[(1, -1), (1, 1)]), leaper_table(&[(-1, -1), (-1, 1)])];

        Tables { rook, bishop, sliding, knight, king, pawn, fallbacks }
    }
}
