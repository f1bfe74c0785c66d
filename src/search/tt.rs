use log::info;

use crate::error::{EngineError, Result};

pub const MATE: i32 = 32_000;
pub const MAX_PLY: usize = 128;
/// Scores beyond this magnitude encode a forced mate.
pub const MATE_BOUND: i32 = MATE - MAX_PLY as i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact = 1,
    Lower = 2,
    Upper = 3,
}

impl Bound {
    fn from_bits(bits: u8) -> Option<Bound> {
        match bits & 3 {
            1 => Some(Bound::Exact),
            2 => Some(Bound::Lower),
            3 => Some(Bound::Upper),
            _ => None,
        }
    }
}

/// One slot. `flag` packs the bound in its low 2 bits (0 = empty) and the
/// 6-bit search age above them.
#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    key: u32,
    score: i16,
    best: u16,
    depth: u8,
    flag: u8,
}

impl Entry {
    #[inline]
    fn is_empty(&self) -> bool {
        self.flag & 3 == 0
    }

    #[inline]
    fn age(&self) -> u8 {
        self.flag >> 2
    }
}

const WAYS: usize = 4;
const AGE_MASK: u8 = 0x3F;

#[derive(Clone, Copy, Debug, Default)]
struct Bucket {
    slots: [Entry; WAYS],
}

/// Result of a probe: a score only when usable at this depth and window,
/// and the stored move whenever the position is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Probe {
    pub score: Option<i32>,
    pub best: Option<u16>,
}

/// Raw view of a stored entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stored {
    pub depth: u8,
    pub bound: Bound,
    /// Score as stored, i.e. relative to the storing node for mates.
    pub score: i32,
    pub best: Option<u16>,
    pub age: u8,
}

/// Mate scores are stored relative to the storing node.
#[inline]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_BOUND {
        score + ply as i32
    } else if score < -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_BOUND {
        score - ply as i32
    } else if score < -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

/// Bucketed transposition table in one flat allocation.
pub struct Tt {
    buckets: Vec<Bucket>,
    mask: usize,
    age: u8,
}

impl Default for Tt {
    fn default() -> Self {
        Self::new()
    }
}

impl Tt {
    /// Small table suitable for tests; use `with_capacity_mb` for play.
    pub fn new() -> Self {
        let mut tt = Tt { buckets: Vec::new(), mask: 0, age: 0 };
        tt.set_capacity_entries(1 << 16);
        tt
    }

    pub fn with_capacity_mb(mb: usize) -> Result<Self> {
        let mut tt = Tt { buckets: Vec::new(), mask: 0, age: 0 };
        tt.resize_mb(mb)?;
        Ok(tt)
    }

    /// Reallocates to the largest power-of-two bucket count fitting `mb`.
    pub fn resize_mb(&mut self, mb: usize) -> Result<()> {
        let bytes = mb.max(1).saturating_mul(1024 * 1024);
        let fit = (bytes / std::mem::size_of::<Bucket>()).max(1);
        let count = 1usize << (usize::BITS - 1 - fit.leading_zeros());
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(count).map_err(|_| EngineError::TableAlloc { mb })?;
        buckets.resize(count, Bucket::default());
        self.buckets = buckets;
        self.mask = count - 1;
        info!(
            "TT: allocated {} buckets ({} entries, {} KiB)",
            count,
            count * WAYS,
            count * std::mem::size_of::<Bucket>() / 1024
        );
        Ok(())
    }

    /// Sizes the table to hold roughly `entries` slots, rounded down to a
    /// power-of-two bucket count.
    pub fn set_capacity_entries(&mut self, entries: usize) {
        let fit = (entries / WAYS).max(1);
        let count = 1usize << (usize::BITS - 1 - fit.leading_zeros());
        self.buckets = vec![Bucket::default(); count];
        self.mask = count - 1;
    }

    pub fn clear(&mut self) {
        self.buckets.fill(Bucket::default());
        self.age = 0;
    }

    /// Starts a new search generation for replacement aging.
    pub fn new_search(&mut self) {
        self.age = (self.age + 1) & AGE_MASK;
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len() * WAYS
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().flat_map(|b| b.slots.iter()).filter(|e| !e.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filled share of the first thousand buckets, in permille.
    pub fn hashfull(&self) -> usize {
        let sample = self.buckets.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let used: usize = self.buckets[..sample]
            .iter()
            .map(|b| b.slots.iter().filter(|e| !e.is_empty() && e.age() == self.age).count())
            .sum();
        used * 1000 / (sample * WAYS)
    }

    #[inline]
    fn locate(&self, hash: u64) -> (usize, u32) {
        (hash as usize & self.mask, (hash >> 32) as u32)
    }

    #[inline]
    fn age_distance(&self, entry: &Entry) -> u8 {
        self.age.wrapping_sub(entry.age()) & AGE_MASK
    }

    pub fn probe(&self, hash: u64, depth: i32, alpha: i32, beta: i32, ply: usize) -> Probe {
        let (idx, key) = self.locate(hash);
        let Some(e) = self.buckets[idx].slots.iter().find(|e| !e.is_empty() && e.key == key) else {
            return Probe::default();
        };
        let best = (e.best != 0).then_some(e.best);
        let mut score = None;
        if e.depth as i32 >= depth {
            let s = score_from_tt(e.score as i32, ply);
            let usable = match Bound::from_bits(e.flag) {
                Some(Bound::Exact) => true,
                Some(Bound::Lower) => s >= beta,
                Some(Bound::Upper) => s <= alpha,
                None => false,
            };
            if usable {
                score = Some(s);
            }
        }
        Probe { score, best }
    }

    pub fn peek(&self, hash: u64) -> Option<Stored> {
        let (idx, key) = self.locate(hash);
        let e = self.buckets[idx].slots.iter().find(|e| !e.is_empty() && e.key == key)?;
        Some(Stored {
            depth: e.depth,
            bound: Bound::from_bits(e.flag)?,
            score: e.score as i32,
            best: (e.best != 0).then_some(e.best),
            age: e.age(),
        })
    }

    /// Stored move for `hash`, regardless of depth.
    pub fn best_move(&self, hash: u64) -> Option<u16> {
        self.probe(hash, i32::MAX, 0, 0, 0).best
    }

    pub fn store(&mut self, hash: u64, depth: i32, score: i32, bound: Bound, best: Option<u16>, ply: usize) {
        let (idx, key) = self.locate(hash);
        let entry = Entry {
            key,
            score: score_to_tt(score, ply).clamp(i16::MIN as i32, i16::MAX as i32) as i16,
            best: best.unwrap_or(0),
            depth: depth.clamp(0, u8::MAX as i32) as u8,
            flag: bound as u8 | self.age << 2,
        };

        // One pass in slot order: an empty slot or this position's own slot
        // ends the scan; otherwise evict the shallowest, oldest entry.
        let mut victim = 0;
        let mut worst = i32::MAX;
        for (i, e) in self.buckets[idx].slots.iter().enumerate() {
            if e.is_empty() {
                victim = i;
                break;
            }
            if e.key == key {
                if entry.depth < e.depth && self.age_distance(e) == 0 {
                    return;
                }
                victim = i;
                break;
            }
            let s = e.depth as i32 - 4 * self.age_distance(e) as i32;
            if s < worst {
                worst = s;
                victim = i;
            }
        }

        let slot = &mut self.buckets[idx].slots[victim];
        // Keep the old move when re-storing the same position without one.
        let keep_move = entry.best == 0 && !slot.is_empty() && slot.key == key;
        let old_best = slot.best;
        *slot = entry;
        if keep_move {
            slot.best = old_best;
        }
    }
}
