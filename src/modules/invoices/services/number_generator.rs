use async_trait::async_trait;
use rand::Rng;

use crate::core::{AppError, Result};
use crate::modules::invoices::models::InvoiceNumber;

/// Attempts made before giving up on a unique invoice number
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Lookup used to keep generated invoice numbers unique
#[async_trait]
pub trait InvoiceNumberRegistry: Send + Sync {
    async fn invoice_number_exists(&self, candidate: &InvoiceNumber) -> Result<bool>;
}

/// Draw a random `LLLL-NNNNNN` candidate
pub fn random_invoice_number<R: Rng + ?Sized>(rng: &mut R) -> InvoiceNumber {
    let mut candidate = String::with_capacity(11);
    for _ in 0..4 {
        candidate.push(rng.gen_range(b'A'..=b'Z') as char);
    }
    candidate.push('-');
    for _ in 0..6 {
        candidate.push(rng.gen_range(b'0'..=b'9') as char);
    }

    InvoiceNumber::from_generated(candidate)
}

/// Mints invoice numbers that are not yet stored
#[derive(Debug, Clone, Copy)]
pub struct InvoiceNumberGenerator {
    max_attempts: u32,
}

impl InvoiceNumberGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate a number unknown to `registry`.
    ///
    /// Gives up with `GenerationExhausted` once every attempt has collided;
    /// a duplicate is never returned.
    pub async fn generate<R>(&self, registry: &R) -> Result<InvoiceNumber>
    where
        R: InvoiceNumberRegistry + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = random_invoice_number(&mut rand::thread_rng());

            if !registry.invoice_number_exists(&candidate).await? {
                return Ok(candidate);
            }

            tracing::warn!(
                attempt,
                candidate = %candidate,
                "Invoice number collision, retrying"
            );
        }

        Err(AppError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for InvoiceNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}
