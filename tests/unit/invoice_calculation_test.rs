// Property-based tests for invoice aggregation.
//
// Properties tested:
// 1. subtotal is the sum of line totals
// 2. taxable = subtotal - discount, and both taxes use the same base
// 3. total = taxable + cgst + sgst
// 4. item order does not change the totals
// 5. taxable = subtotal × (1 - discount / 100), each tax is taxable × rate / 100
// 6. total is never below the taxable amount

use jewelcalc::invoices::models::{InvoiceCharges, InvoiceDraft, LineItem};
use jewelcalc::invoices::services::compute_invoice_totals;
use jewelcalc::AppError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn charges(discount: Decimal, cgst: Decimal, sgst: Decimal) -> InvoiceCharges {
    InvoiceCharges {
        discount_percent: discount,
        cgst_percent: cgst,
        sgst_percent: sgst,
    }
}

fn item_strategy() -> impl Strategy<Value = LineItem> {
    (1i64..=50_000, 1i64..=1_000_000, 0i64..=2_000, 0i64..=2_000).prop_map(
        |(weight, rate, wastage, making)| {
            LineItem::new(
                "Gold 22K",
                Decimal::new(weight, 2),
                Decimal::new(rate, 2),
                Decimal::new(wastage, 2),
                Decimal::new(making, 2),
            )
            .unwrap()
        },
    )
}

fn percent_strategy(max_hundredths: i64) -> impl Strategy<Value = Decimal> {
    (0..=max_hundredths).prop_map(|p| Decimal::new(p, 2))
}

#[test]
fn test_single_item_invoice() {
    let item = LineItem::new("Gold 24K", dec!(10.5), dec!(6500.0), dec!(5.0), dec!(10.0)).unwrap();
    let totals = compute_invoice_totals(&[item], &charges(dec!(0), dec!(1.5), dec!(1.5))).unwrap();

    assert_eq!(totals.subtotal, dec!(78487.5));
    assert_eq!(totals.discount_amount, dec!(0));
    assert_eq!(totals.taxable_amount, dec!(78487.5));
    assert_eq!(totals.cgst_amount, dec!(1177.3125));
    assert_eq!(totals.sgst_amount, dec!(1177.3125));
    assert_eq!(totals.total, dec!(80842.125));
}

#[test]
fn test_discounted_invoice() {
    let item = LineItem::new("Gold 24K", dec!(11.5), dec!(6500), dec!(0), dec!(0)).unwrap();
    let totals = compute_invoice_totals(&[item], &charges(dec!(10), dec!(1.5), dec!(1.5))).unwrap();

    assert_eq!(totals.subtotal, dec!(74750.0));
    assert_eq!(totals.discount_amount, dec!(7475.0));
    assert_eq!(totals.taxable_amount, dec!(67275.0));
    assert_eq!(totals.cgst_amount, dec!(1009.125));
    assert_eq!(totals.sgst_amount, dec!(1009.125));
    assert_eq!(totals.total, dec!(69293.25));
}

#[test]
fn test_empty_invoice_rejected() {
    let result = compute_invoice_totals(&[], &charges(dec!(0), dec!(1.5), dec!(1.5)));
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_draft_accumulates_items() {
    let draft = InvoiceDraft::for_customer(7)
        .with_item(LineItem::new("Gold 24K", dec!(10.5), dec!(6500.0), dec!(5.0), dec!(10.0)).unwrap())
        .with_item(LineItem::new("Silver", dec!(100), dec!(75), dec!(3), dec!(8)).unwrap())
        .with_charges(charges(dec!(0), dec!(1.5), dec!(1.5)));

    assert_eq!(draft.items().len(), 2);
    let totals = draft.totals().unwrap();
    assert_eq!(totals.subtotal, dec!(78487.5) + dec!(8325));

    let trimmed = draft.without_item(1).unwrap();
    assert_eq!(trimmed.totals().unwrap().subtotal, dec!(78487.5));
    assert!(trimmed.without_item(5).is_err());
}

proptest! {
    #[test]
    fn test_subtotal_is_sum_of_line_totals(
        items in prop::collection::vec(item_strategy(), 1..8),
    ) {
        let totals = compute_invoice_totals(&items, &InvoiceCharges::default()).unwrap();
        let expected: Decimal = items.iter().map(LineItem::line_total).sum();

        prop_assert_eq!(totals.subtotal, expected);
        prop_assert_eq!(totals.total, expected);
    }

    #[test]
    fn test_total_decomposes(
        items in prop::collection::vec(item_strategy(), 1..8),
        discount in percent_strategy(10_000),
        cgst in percent_strategy(2_800),
        sgst in percent_strategy(2_800),
    ) {
        let totals = compute_invoice_totals(&items, &charges(discount, cgst, sgst)).unwrap();

        prop_assert_eq!(totals.taxable_amount, totals.subtotal - totals.discount_amount);
        prop_assert_eq!(
            totals.total,
            totals.taxable_amount + totals.cgst_amount + totals.sgst_amount
        );
        prop_assert!(totals.taxable_amount >= Decimal::ZERO);
        prop_assert!(totals.discount_amount <= totals.subtotal);
    }

    #[test]
    fn test_equal_rates_give_equal_taxes(
        items in prop::collection::vec(item_strategy(), 1..5),
        rate in percent_strategy(2_800),
    ) {
        let totals = compute_invoice_totals(&items, &charges(Decimal::ZERO, rate, rate)).unwrap();
        prop_assert_eq!(totals.cgst_amount, totals.sgst_amount);
    }

    #[test]
    fn test_item_order_is_irrelevant(
        items in prop::collection::vec(item_strategy(), 1..8),
        discount in percent_strategy(10_000),
    ) {
        let rates = charges(discount, dec!(1.5), dec!(1.5));
        let forward = compute_invoice_totals(&items, &rates).unwrap();

        let mut reversed = items.clone();
        reversed.reverse();
        let backward = compute_invoice_totals(&reversed, &rates).unwrap();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn test_taxes_apply_to_discounted_base(
        items in prop::collection::vec(item_strategy(), 1..8),
        discount in percent_strategy(10_000),
        cgst in percent_strategy(2_800),
        sgst in percent_strategy(2_800),
    ) {
        let totals = compute_invoice_totals(&items, &charges(discount, cgst, sgst)).unwrap();

        prop_assert_eq!(
            totals.taxable_amount,
            totals.subtotal * (Decimal::ONE - discount / Decimal::ONE_HUNDRED)
        );
        prop_assert_eq!(totals.cgst_amount, totals.taxable_amount * cgst / Decimal::ONE_HUNDRED);
        prop_assert_eq!(totals.sgst_amount, totals.taxable_amount * sgst / Decimal::ONE_HUNDRED);
        prop_assert!(totals.total >= totals.taxable_amount);
    }
}
