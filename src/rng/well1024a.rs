const R: usize = 32;
const M1: usize = 3;
const M2: usize = 24;
const M3: usize = 10;
const WARMUP_ITERATIONS: usize = 1000;

fn mat0pos(t: u32, v: u32) -> u32 {
    v ^ (v >> t)
}

fn mat0neg(t: u32, v: u32) -> u32 {
    v ^ (v << t)
}

/// WELL-1024a pseudo-random generator: 32 words of state plus a rotating
/// index, advanced by the WELL recurrence (Panneton, L'Ecuyer, Matsumoto).
pub struct Well1024a {
    state: [u32; R],
    index: usize,
}

impl Well1024a {
    /// seed from 32 arbitrary words and run the warm-up loop before first use.
    pub fn seeded(words: [u32; R]) -> Self {
        let mut well = Self {
            state: words,
            index: 0,
        };
        for _ in 0..WARMUP_ITERATIONS {
            well.next_u32();
        }
        well
    }

    /// seed from the system's default RNG, matching the reference's use of a
    /// low-quality generator to fill initial state.
    pub fn from_entropy() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let mut words = [0u32; R];
        for word in words.iter_mut() {
            *word = rng.random();
        }
        Self::seeded(words)
    }

    pub fn next_u32(&mut self) -> u32 {
        let i = self.index;
        let rm1 = (i + R - 1) % R;
        let vm1 = (i + M1) % R;
        let vm2 = (i + M2) % R;
        let vm3 = (i + M3) % R;

        let z0 = self.state[rm1];
        let z1 = mat0neg(8, self.state[i]) ^ mat0pos(1, self.state[vm1]);
        let z2 = mat0neg(19, self.state[vm2]) ^ mat0neg(14, self.state[vm3]);
        let new_v1 = z1 ^ z2;
        let new_v0 = mat0neg(11, z0) ^ mat0neg(7, z1) ^ mat0neg(13, z2);

        self.state[i] = new_v1;
        self.state[rm1] = new_v0;
        self.index = rm1;
        self.state[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic_given_same_seed() {
        let seed = [0x1234_5678u32; 32];
        let mut a = Well1024a::seeded(seed);
        let mut b = Well1024a::seeded(seed);
        for _ in 0..64 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn is_not_constant() {
        let mut well = Well1024a::seeded([0xdead_beefu32; 32]);
        let first = well.next_u32();
        let mut saw_different = false;
        for _ in 0..32 {
            if well.next_u32() != first {
                saw_different = true;
                break;
            }
        }
        assert!(saw_different);
    }

    #[test]
    fn is_full_period_walk_not_all_zero() {
        let mut words = [0u32; 32];
        words[0] = 1;
        let mut well = Well1024a::seeded(words);
        let mut any_nonzero = false;
        for _ in 0..256 {
            if well.next_u32() != 0 {
                any_nonzero = true;
            }
        }
        assert!(any_nonzero);
    }
}
