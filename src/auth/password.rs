use bcrypt::{hash, verify};

use crate::error::ApiError;

/// Salted one-way password hashing with a configurable bcrypt cost factor.
///
/// Hashing at production cost takes tens of milliseconds on purpose; callers
/// on an async executor should run it through `tokio::task::spawn_blocking`
/// so it never stalls the reactor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, ApiError> {
        hash(password, self.cost)
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Checks `password` against a stored digest. `Ok(false)` means the
    /// password does not match; `Err` means the digest itself is unusable.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, ApiError> {
        verify(password, hashed_password)
            .map_err(|e| ApiError::Internal(format!("Failed to verify password: {}", e)))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}
