use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::TieBreakMode;

/// Derives a seed from the join code of a session.
///
/// The code is hashed with SHA-256 and the first 8 bytes of the digest are read as a
/// big-endian integer. Surrounding whitespace is ignored.
pub fn seed_from_join_code(join_code: &str) -> u64 {
    let digest = sha256::digest(join_code.trim());
    let seed = u64::from_str_radix(&digest[..16], 16).unwrap_or_default();
    debug!("seed_from_join_code: {:?} -> {}", join_code, seed);
    seed
}

/// The random source for the given mode.
pub fn rng_for(mode: TieBreakMode) -> StdRng {
    match mode {
        TieBreakMode::Random => StdRng::from_entropy(),
        TieBreakMode::Seeded(seed) => StdRng::seed_from_u64(seed),
    }
}
