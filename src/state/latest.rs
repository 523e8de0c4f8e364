use std::sync::atomic::{AtomicU64, Ordering};

const VALID_FLAG: u64 = 1;
const GENERATION_SHIFT: u32 = 1;
const GENERATION_MASK: u32 = 0x7FFF_FFFF;
const VALUE_SHIFT: u32 = 32;

/// A consistent `(distance, valid)` pair as seen by readers of the [`LatestDistanceSlot`].
///
/// An invalid reading always carries a distance of `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceReading {
    distance_cm: f32,
    valid: bool,
}

impl DistanceReading {
    pub fn valid(distance_cm: f32) -> Self {
        Self {
            distance_cm,
            valid: true,
        }
    }

    pub fn invalid() -> Self {
        Self {
            distance_cm: 0.0,
            valid: false,
        }
    }

    pub fn distance_cm(&self) -> f32 {
        self.distance_cm
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the distance only when the reading is valid.
    pub fn valid_distance(&self) -> Option<f32> {
        self.valid.then_some(self.distance_cm)
    }

    fn pack(self, generation: u32) -> u64 {
        let flag = if self.valid { VALID_FLAG } else { 0 };
        ((self.distance_cm.to_bits() as u64) << VALUE_SHIFT)
            | (((generation & GENERATION_MASK) as u64) << GENERATION_SHIFT)
            | flag
    }

    fn unpack(word: u64) -> Self {
        if word & VALID_FLAG == 0 {
            return Self::invalid();
        }
        Self::valid(f32::from_bits((word >> VALUE_SHIFT) as u32))
    }
}

fn generation_of(word: u64) -> u32 {
    (word >> GENERATION_SHIFT) as u32 & GENERATION_MASK
}

fn next_generation(word: u64) -> u32 {
    generation_of(word).wrapping_add(1) & GENERATION_MASK
}

impl Default for DistanceReading {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Most recent distance published by the sensor task.
///
/// Value, validity flag and a publish generation live in a single atomic word, so a reader
/// can never observe a new value with a stale flag or the other way around. The generation
/// grows by one on every publish (31 bits, wrapping).
#[derive(Debug)]
pub struct LatestDistanceSlot {
    word: AtomicU64,
}

impl LatestDistanceSlot {
    pub fn new() -> Self {
        Self {
            word: AtomicU64::new(DistanceReading::invalid().pack(0)),
        }
    }

    /// Replaces the current reading and returns the generation it was published under.
    pub fn publish(&self, reading: DistanceReading) -> u32 {
        let previous = self
            .word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                Some(reading.pack(next_generation(word)))
            })
            .unwrap_or_else(|word| word);
        next_generation(previous)
    }

    pub fn snapshot(&self) -> DistanceReading {
        DistanceReading::unpack(self.word.load(Ordering::Acquire))
    }

    /// Generation of the reading currently held.
    pub fn generation(&self) -> u32 {
        generation_of(self.word.load(Ordering::Acquire))
    }
}

impl Default for LatestDistanceSlot {
    fn default() -> Self {
        Self::new()
    }
}
