use futures::future::BoxFuture;
use rand::{rng, Rng};
use thiserror::Error;

use super::retry;
use crate::errors::StorageError;

/// Alphabet for generated codes
const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Attempt budget before generation gives up
pub const MAX_GENERATE_ATTEMPTS: usize = 20;

/// Generated code lengths are clamped to this range; user aliases may be
/// longer, up to the configured maximum
const MIN_CODE_LENGTH: usize = 1;
const MAX_CODE_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Every candidate within the budget collided with an existing code
    #[error("No unique code found after {0} attempts")]
    Exhausted(usize),

    /// The existence check itself failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Produces a random candidate code from the `[a-z0-9]` alphabet.
///
/// `ThreadRng` is cryptographically secure, so candidates are not guessable
/// from earlier ones.
pub fn random_code(length: usize) -> String {
    let mut generator = rng();
    (0..length)
        .map(|_| CODE_ALPHABET[generator.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Generates a fresh code that `exists` does not know yet.
///
/// The callback is consulted once per candidate; generation itself never
/// mutates storage. Collisions trigger regeneration until the attempt
/// budget runs out, at which point `GenerateError::Exhausted` is returned.
pub async fn generate_unique_code<'a, F>(
    exists: F,
    max_length: usize,
) -> Result<String, GenerateError>
where
    F: Fn(String) -> BoxFuture<'a, Result<bool, StorageError>>,
{
    let length = max_length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH);

    let found = retry::bounded(MAX_GENERATE_ATTEMPTS, |_| {
        let candidate = random_code(length);
        let check = exists(candidate.clone());
        async move {
            if check.await? {
                Ok::<_, StorageError>(None)
            } else {
                Ok(Some(candidate))
            }
        }
    })
    .await?;

    found.ok_or(GenerateError::Exhausted(MAX_GENERATE_ATTEMPTS))
}
