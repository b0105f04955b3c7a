//! PNR generation

use rand::Rng;

/// PNR length in characters
pub const PNR_LENGTH: usize = 10;

const PNR_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random PNR code
///
/// PNRs are not guaranteed unique by construction; callers insert them
/// against a UNIQUE column and regenerate on collision.
pub fn generate_pnr<R: Rng>(rng: &mut R) -> String {
    (0..PNR_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..PNR_CHARSET.len());
            PNR_CHARSET[idx] as char
        })
        .collect()
}
