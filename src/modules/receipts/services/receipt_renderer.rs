// Printable receipts for stored invoices.
//
// Two layouts share one set of text helpers: a paginated A4 invoice with an
// item table, and a single-page 80 mm thermal roll with one block per item.
// Amounts are printed with `format_rs` because the built-in PDF fonts carry
// no rupee glyph.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use crate::core::money::{format_plain, format_rs};
use crate::core::timezone::format_receipt_date;
use crate::core::{AppError, Result};
use crate::modules::customers::models::Customer;
use crate::modules::invoices::models::{Invoice, LineItem};

const A4_WIDTH: f32 = 210.0;
const A4_HEIGHT: f32 = 297.0;
const A4_MARGIN: f32 = 15.0;
const A4_ROW_HEIGHT: f32 = 6.0;
/// Lowest baseline for a table row before a new page is started
const A4_TABLE_FLOOR: f32 = 40.0;
const A4_TABLE_TOP_FIRST_PAGE: f32 = 215.0;
const A4_TABLE_TOP_NEXT_PAGE: f32 = 275.0;

const THERMAL_WIDTH: f32 = 80.0;
const THERMAL_MARGIN: f32 = 4.0;
const THERMAL_HEADER_HEIGHT: f32 = 58.0;
const THERMAL_ITEM_HEIGHT: f32 = 24.0;
const THERMAL_FOOTER_HEIGHT: f32 = 56.0;

const A4_COLUMNS: [(&str, f32); 8] = [
    ("No", 15.0),
    ("Metal", 24.0),
    ("Weight(g)", 58.0),
    ("Rate", 80.0),
    ("Item Val", 102.0),
    ("Wastage", 126.0),
    ("Making", 148.0),
    ("Total", 170.0),
];

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
        })
    }
}

fn pdf_error(err: impl std::fmt::Display) -> AppError {
    AppError::Pdf(err.to_string())
}

fn text(layer: &PdfLayerReference, font: &IndirectFontRef, value: &str, size: f32, x: f32, y: f32) {
    layer.use_text(value, size, Mm(x), Mm(y), font);
}

fn rule(layer: &PdfLayerReference, from_x: f32, to_x: f32, y: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from_x), Mm(y)), false),
            (Point::new(Mm(to_x), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn finish(doc: PdfDocumentReference) -> Result<Vec<u8>> {
    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(pdf_error)?;
    writer.into_inner().map_err(pdf_error)
}

/// Summary lines shared by both layouts: label and formatted amount
fn summary_lines(invoice: &Invoice) -> Vec<(String, String)> {
    let totals = invoice.totals();
    let charges = invoice.charges();
    let mut lines = vec![("Subtotal".to_string(), format_rs(totals.subtotal))];

    if charges.discount_percent > rust_decimal::Decimal::ZERO {
        lines.push((
            format!("Discount ({}%)", charges.discount_percent.normalize()),
            format!("-{}", format_rs(totals.discount_amount)),
        ));
    }

    lines.push((
        format!("CGST ({}%)", charges.cgst_percent.normalize()),
        format_rs(totals.cgst_amount),
    ));
    lines.push((
        format!("SGST ({}%)", charges.sgst_percent.normalize()),
        format_rs(totals.sgst_amount),
    ));

    lines
}

fn item_cells(item_no: usize, item: &LineItem) -> [String; 8] {
    let amounts = item.amounts();
    [
        item_no.to_string(),
        item.metal().to_string(),
        item.weight().normalize().to_string(),
        format_plain(item.rate()),
        format_plain(amounts.item_value),
        format_plain(amounts.wastage_amount),
        format_plain(amounts.making_amount),
        format_plain(amounts.line_total),
    ]
}

/// Number of A4 pages the item table needs
pub fn a4_page_count(item_count: usize) -> usize {
    let rows_per_page =
        |top: f32| (((top - A4_TABLE_FLOOR) / A4_ROW_HEIGHT).floor() as usize).max(1);
    let first = rows_per_page(A4_TABLE_TOP_FIRST_PAGE - A4_ROW_HEIGHT);
    let next = rows_per_page(A4_TABLE_TOP_NEXT_PAGE - A4_ROW_HEIGHT);

    if item_count <= first {
        1
    } else {
        1 + (item_count - first).div_ceil(next)
    }
}

fn a4_table_header(layer: &PdfLayerReference, fonts: &Fonts, y: f32) -> f32 {
    for (label, x) in A4_COLUMNS {
        text(layer, &fonts.bold, label, 10.0, x, y);
    }
    rule(layer, A4_MARGIN, A4_WIDTH - A4_MARGIN, y - 2.0);
    y - A4_ROW_HEIGHT - 1.0
}

/// Render an invoice as an A4 PDF
pub fn render_a4(invoice: &Invoice, customer: Option<&Customer>) -> Result<Vec<u8>> {
    let title = format!("Invoice {}", invoice.invoice_no);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(A4_WIDTH), Mm(A4_HEIGHT), "Layer 1");
    let fonts = Fonts::load(&doc)?;
    let mut layer = doc.get_page(page).get_layer(layer);

    let mut y = A4_HEIGHT - 25.0;
    text(&layer, &fonts.bold, "JEWELLERY INVOICE", 18.0, A4_MARGIN, y);
    y -= 12.0;
    text(&layer, &fonts.regular, &format!("Invoice No: {}", invoice.invoice_no), 11.0, A4_MARGIN, y);
    text(
        &layer,
        &fonts.regular,
        &format!("Date: {}", format_receipt_date(invoice.date)),
        11.0,
        A4_WIDTH - 75.0,
        y,
    );

    y -= 10.0;
    if let Some(customer) = customer {
        let account = customer.account_no.as_deref().unwrap_or("-");
        text(&layer, &fonts.regular, &format!("Account: {}", account), 11.0, A4_MARGIN, y);
        y -= 6.0;
        text(&layer, &fonts.regular, &format!("Customer: {}", customer.name), 11.0, A4_MARGIN, y);
        y -= 6.0;
        text(&layer, &fonts.regular, &format!("Phone: {}", customer.phone), 11.0, A4_MARGIN, y);
        if !customer.address.is_empty() {
            y -= 6.0;
            text(&layer, &fonts.regular, &format!("Address: {}", customer.address), 11.0, A4_MARGIN, y);
        }
    }

    y = a4_table_header(&layer, &fonts, y.min(A4_TABLE_TOP_FIRST_PAGE));

    for (index, item) in invoice.items().iter().enumerate() {
        if y < A4_TABLE_FLOOR {
            let (next_page, next_layer) = doc.add_page(Mm(A4_WIDTH), Mm(A4_HEIGHT), "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = a4_table_header(&layer, &fonts, A4_TABLE_TOP_NEXT_PAGE);
        }

        for (cell, (_, x)) in item_cells(index + 1, item).iter().zip(A4_COLUMNS) {
            text(&layer, &fonts.regular, cell, 10.0, x, y);
        }
        y -= A4_ROW_HEIGHT;
    }

    // Summary block needs roughly 45 mm
    if y < 50.0 {
        let (next_page, next_layer) = doc.add_page(Mm(A4_WIDTH), Mm(A4_HEIGHT), "Layer 1");
        layer = doc.get_page(next_page).get_layer(next_layer);
        y = A4_TABLE_TOP_NEXT_PAGE;
    }

    rule(&layer, A4_MARGIN, A4_WIDTH - A4_MARGIN, y + 2.0);
    y -= 6.0;
    for (label, amount) in summary_lines(invoice) {
        text(&layer, &fonts.regular, &label, 11.0, 120.0, y);
        text(&layer, &fonts.regular, &amount, 11.0, 160.0, y);
        y -= 6.0;
    }

    y -= 2.0;
    text(&layer, &fonts.bold, "TOTAL", 14.0, 120.0, y);
    text(&layer, &fonts.bold, &format_rs(invoice.totals().total), 14.0, 160.0, y);

    text(&layer, &fonts.regular, "Thank you for your business!", 9.0, A4_MARGIN, 15.0);

    finish(doc)
}

/// Page height of a thermal receipt for `item_count` items
pub fn thermal_height(item_count: usize) -> f32 {
    THERMAL_HEADER_HEIGHT + THERMAL_ITEM_HEIGHT * item_count as f32 + THERMAL_FOOTER_HEIGHT
}

/// Render an invoice as a single-page 80 mm thermal receipt
pub fn render_thermal(invoice: &Invoice, customer: Option<&Customer>) -> Result<Vec<u8>> {
    let height = thermal_height(invoice.items().len());
    let title = format!("Receipt {}", invoice.invoice_no);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(THERMAL_WIDTH), Mm(height), "Layer 1");
    let fonts = Fonts::load(&doc)?;
    let layer = doc.get_page(page).get_layer(layer);

    let left = THERMAL_MARGIN;
    let right = THERMAL_WIDTH - THERMAL_MARGIN;
    let amount_x = 46.0;

    let mut y = height - 10.0;
    text(&layer, &fonts.bold, "JEWELLERY RECEIPT", 12.0, left, y);
    y -= 7.0;
    text(&layer, &fonts.regular, &format!("No: {}", invoice.invoice_no), 8.0, left, y);
    y -= 4.5;
    text(&layer, &fonts.regular, &format!("Date: {}", format_receipt_date(invoice.date)), 8.0, left, y);

    if let Some(customer) = customer {
        y -= 4.5;
        text(&layer, &fonts.regular, &format!("Customer: {}", customer.name), 8.0, left, y);
        y -= 4.5;
        text(&layer, &fonts.regular, &format!("Phone: {}", customer.phone), 8.0, left, y);
        if let Some(account) = &customer.account_no {
            y -= 4.5;
            text(&layer, &fonts.regular, &format!("Account: {}", account), 8.0, left, y);
        }
    }

    y -= 4.0;
    rule(&layer, left, right, y);

    for (index, item) in invoice.items().iter().enumerate() {
        let amounts = item.amounts();
        y -= 5.0;
        text(&layer, &fonts.bold, &format!("{}. {}", index + 1, item.metal()), 9.0, left, y);
        y -= 4.0;
        text(
            &layer,
            &fonts.regular,
            &format!("{} g x {}", item.weight().normalize(), format_plain(item.rate())),
            8.0,
            left,
            y,
        );
        text(&layer, &fonts.regular, &format_rs(amounts.item_value), 8.0, amount_x, y);
        y -= 4.0;
        text(
            &layer,
            &fonts.regular,
            &format!("Wastage {}%", item.wastage_percent().normalize()),
            8.0,
            left,
            y,
        );
        text(&layer, &fonts.regular, &format_rs(amounts.wastage_amount), 8.0, amount_x, y);
        y -= 4.0;
        text(
            &layer,
            &fonts.regular,
            &format!("Making {}%", item.making_percent().normalize()),
            8.0,
            left,
            y,
        );
        text(&layer, &fonts.regular, &format_rs(amounts.making_amount), 8.0, amount_x, y);
        y -= 4.5;
        text(&layer, &fonts.bold, "Item total", 8.0, left, y);
        text(&layer, &fonts.bold, &format_rs(amounts.line_total), 8.0, amount_x, y);
        y -= 2.5;
        rule(&layer, left, right, y);
    }

    for (label, amount) in summary_lines(invoice) {
        y -= 5.0;
        text(&layer, &fonts.regular, &label, 8.0, left, y);
        text(&layer, &fonts.regular, &amount, 8.0, amount_x, y);
    }

    y -= 3.0;
    rule(&layer, left, right, y);
    y -= 6.0;
    text(&layer, &fonts.bold, "TOTAL", 11.0, left, y);
    text(&layer, &fonts.bold, &format_rs(invoice.totals().total), 11.0, 40.0, y);
    y -= 8.0;
    text(&layer, &fonts.regular, "Thank you! Visit again.", 8.0, left, y);

    finish(doc)
}
