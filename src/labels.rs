//! Random label pools for the `kind` and `queue` columns.

use fake::{Fake, StringFaker};
use rand::Rng;

pub const DEFAULT_POOL_SIZE: usize = 100;

const MIN_LEN: usize = 5;
const MAX_LEN: usize = 50;

const ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Builds `size` alphabetic labels, each 5 to 50 characters long.
///
/// Labels are not deduplicated; with lengths this wide a collision is
/// practically impossible and harmless anyway.
pub fn label_pool<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Vec<String> {
    let faker = StringFaker::with(ALPHA.to_vec(), MIN_LEN..MAX_LEN + 1);
    (0..size).map(|_| faker.fake_with_rng::<String, _>(rng)).collect()
}
