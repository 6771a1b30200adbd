// Tests for invoice and account number generation.
//
// Properties tested:
// 1. generated invoice numbers always match LLLL-NNNNNN
// 2. the generator never returns a number the registry already holds
// 3. account numbers follow the largest existing CUS- suffix

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use jewelcalc::customers::services::generate_account_number;
use jewelcalc::invoices::models::InvoiceNumber;
use jewelcalc::invoices::services::number_generator::random_invoice_number;
use jewelcalc::invoices::services::{InvoiceNumberGenerator, InvoiceNumberRegistry};
use jewelcalc::{AppError, Result};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Registry backed by a set, recording every candidate it was asked about
#[derive(Default)]
struct SetRegistry {
    taken: HashSet<String>,
    asked: Mutex<Vec<String>>,
}

#[async_trait]
impl InvoiceNumberRegistry for SetRegistry {
    async fn invoice_number_exists(&self, candidate: &InvoiceNumber) -> Result<bool> {
        self.asked.lock().unwrap().push(candidate.to_string());
        Ok(self.taken.contains(candidate.as_str()))
    }
}

/// Registry that reports every candidate as taken
struct FullRegistry;

#[async_trait]
impl InvoiceNumberRegistry for FullRegistry {
    async fn invoice_number_exists(&self, _candidate: &InvoiceNumber) -> Result<bool> {
        Ok(true)
    }
}

#[tokio::test]
async fn test_generated_number_is_unused() {
    let registry = SetRegistry::default();
    let number = InvoiceNumberGenerator::default().generate(&registry).await.unwrap();

    assert!(number.as_str().parse::<InvoiceNumber>().is_ok());
    assert_eq!(registry.asked.lock().unwrap().as_slice(), [number.to_string()]);
}

#[tokio::test]
async fn test_exhausted_generator_fails() {
    let result = InvoiceNumberGenerator::new(3).generate(&FullRegistry).await;
    assert!(matches!(result, Err(AppError::GenerationExhausted { attempts: 3 })));
}

#[test]
fn test_random_numbers_vary() {
    let mut rng = StdRng::seed_from_u64(42);
    let numbers: HashSet<String> = (0..200)
        .map(|_| random_invoice_number(&mut rng).to_string())
        .collect();

    // 26^4 × 10^6 possibilities; 200 draws should not repeat
    assert_eq!(numbers.len(), 200);
}

#[test]
fn test_account_numbers_follow_max_suffix() {
    let empty: [&str; 0] = [];
    assert_eq!(generate_account_number(&empty), "CUS-00001");
    assert_eq!(
        generate_account_number(&["CUS-00004", "legacy-17", "CUS-00002"]),
        "CUS-00005"
    );
    assert_eq!(generate_account_number(&["CUS-99999"]), "CUS-100000");
}

proptest! {
    #[test]
    fn test_invoice_number_shape(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let number = random_invoice_number(&mut rng);
        let (letters, digits) = number.as_str().split_once('-').unwrap();

        prop_assert_eq!(letters.len(), 4);
        prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
        prop_assert_eq!(digits.len(), 6);
        prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_account_number_exceeds_every_existing(
        suffixes in prop::collection::vec(1u64..100_000, 0..20),
    ) {
        let existing: Vec<String> = suffixes.iter().map(|n| format!("CUS-{:05}", n)).collect();
        let next = generate_account_number(&existing);
        let next_suffix: u64 = next.trim_start_matches("CUS-").parse().unwrap();

        prop_assert!(suffixes.iter().all(|n| *n < next_suffix));
        prop_assert!(!existing.contains(&next));
    }
}
