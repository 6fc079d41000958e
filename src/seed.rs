use rand::Rng;

/// Characters a generated seed is drawn from.
pub const SEED_ALPHABET: &[u8] = b"1234567890abcdefghABCDEFGHQWERTYqwerty";
pub const SEED_LEN: usize = 20;

/// Fresh seed string from the thread-local entropy source.
pub fn generate_seed() -> String {
    generate_seed_with(&mut rand::thread_rng())
}

pub fn generate_seed_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SEED_LEN)
        .map(|_| SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())] as char)
        .collect()
}

/// Folds a seed string into the 64-bit value fed to `StdRng::seed_from_u64` (FNV-1a).
pub fn fold_seed(seed: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    seed.bytes()
        .fold(OFFSET, |h, b| (h ^ b as u64).wrapping_mul(PRIME))
}
