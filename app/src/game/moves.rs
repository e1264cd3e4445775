use std::time::{SystemTime, UNIX_EPOCH};

use strum::EnumCount;

use crate::models::Move;

/// Where the computer's move comes from.
pub trait MoveSource {
    fn next_move(&mut self) -> Move;
}

impl<F: FnMut() -> Move> MoveSource for F {
    fn next_move(&mut self) -> Move {
        self()
    }
}

/// Xorshift128+ drawing uniformly from the three moves.
#[derive(Debug, Clone)]
pub struct XorShiftMoves {
    s0: u64,
    s1: u64,
}

impl XorShiftMoves {
    pub fn with_seed(seed: u64) -> Self {
        // splitmix64 spreads the seed; the state must never be all zero
        let mut sm = seed;
        let mut next = || {
            sm = sm.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = sm;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^ (z >> 31)
        };
        let s0 = next();
        let s1 = next();

        if s0 == 0 && s1 == 0 {
            Self { s0: 1, s1: 0 }
        } else {
            Self { s0, s1 }
        }
    }

    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(nanos ^ u64::from(std::process::id()).rotate_left(32))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut s1 = self.s0;
        let s0 = self.s1;
        self.s0 = s0;
        s1 ^= s1 << 23;
        self.s1 = s1 ^ s0 ^ (s1 >> 17) ^ (s0 >> 26);
        self.s1.wrapping_add(s0)
    }
}

impl MoveSource for XorShiftMoves {
    fn next_move(&mut self) -> Move {
        let n = Move::COUNT as u64;
        // reject the top sliver so every move is equally likely
        let zone = u64::MAX - (u64::MAX % n);
        loop {
            let r = self.next_u64();
            if r < zone {
                return Move::ALL[(r % n) as usize];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sequence_repeats() {
        let mut a = XorShiftMoves::with_seed(42);
        let mut b = XorShiftMoves::with_seed(42);

        for _ in 0..64 {
            assert_eq!(a.next_move(), b.next_move());
        }
    }

    #[test]
    fn every_move_shows_up() {
        let mut moves = XorShiftMoves::with_seed(7);
        let mut seen = [0usize; Move::COUNT];

        for _ in 0..3000 {
            let m = moves.next_move();
            seen[Move::ALL.iter().position(|x| *x == m).unwrap()] += 1;
        }

        // roughly a third each
        assert!(seen.iter().all(|c| (800..1200).contains(c)), "{seen:?}");
    }

    #[test]
    fn closures_are_sources() {
        let mut fixed = || Move::Scissors;
        assert_eq!(fixed.next_move(), Move::Scissors);
    }
}
