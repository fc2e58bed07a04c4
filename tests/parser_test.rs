use receipt_extract::{
    PaymentMethod, ValidationResult, is_eml_upload, normalize_date, parse_email_text,
    validate_parsed_email,
};

#[test]
fn test_known_vendor_outranks_generic_patterns() {
    let parsed = parse_email_text("Your receipt from Amazon. Sold by: XYZ Corp");
    assert_eq!(parsed.vendor.as_deref(), Some("Amazon"));
}

#[test]
fn test_vendor_from_sold_by_label() {
    let parsed = parse_email_text("Sold by: Gamma Electronics LLC");
    assert_eq!(parsed.vendor.as_deref(), Some("Gamma Electronics"));
}

#[test]
fn test_vendor_from_thank_you_phrase() {
    let parsed = parse_email_text("Thank you for your purchase at Fresh Greens Market!");
    assert_eq!(parsed.vendor.as_deref(), Some("Fresh Greens Market"));
}

#[test]
fn test_vendor_strips_email_remnant() {
    let parsed = parse_email_text("From: Acme Supplies, Inc. <billing@acme.example>\n\nInvoice");
    assert_eq!(parsed.vendor.as_deref(), Some("Acme Supplies"));
}

#[test]
fn test_vendor_absent() {
    let parsed = parse_email_text("nothing merchant-like in here");
    assert!(parsed.vendor.is_none());
}

#[test]
fn test_date_labeled_numeric() {
    let parsed = parse_email_text("Order Date: 01/06/2026");
    assert_eq!(parsed.date.as_deref(), Some("2026-01-06"));
}

#[test]
fn test_date_labeled_textual() {
    let parsed = parse_email_text("Placed on January 6, 2026");
    assert_eq!(parsed.date.as_deref(), Some("2026-01-06"));
}

#[test]
fn test_date_bare_iso() {
    let parsed = parse_email_text("Delivered 2026-01-06 by courier");
    assert_eq!(parsed.date.as_deref(), Some("2026-01-06"));
}

#[test]
fn test_date_bare_abbreviated_month() {
    let parsed = parse_email_text("Your card was charged on Feb. 3, 2026");
    assert_eq!(parsed.date.as_deref(), Some("2026-02-03"));
}

#[test]
fn test_normalize_date_is_idempotent_and_timezone_free() {
    assert_eq!(normalize_date("01/06/2026").as_deref(), Some("2026-01-06"));
    assert_eq!(normalize_date("January 6, 2026").as_deref(), Some("2026-01-06"));
    assert_eq!(normalize_date("2026-01-06").as_deref(), Some("2026-01-06"));
    // Two-digit years land in the 2000s.
    assert_eq!(normalize_date("3/4/26").as_deref(), Some("2026-03-04"));
}

#[test]
fn test_normalize_date_rejects_implausible() {
    assert!(normalize_date("13/45/2026").is_none());
    assert!(normalize_date("01/06/1999").is_none());
    assert!(normalize_date("not a date").is_none());
}

#[test]
fn test_amount_largest_labeled_wins() {
    let parsed = parse_email_text("Subtotal $10.00 Tax $1.00 Total $11.00");
    assert_eq!(parsed.total, Some(11.0));
    assert_eq!(parsed.currency.as_deref(), Some("USD"));
}

#[test]
fn test_amount_euro_symbol() {
    let parsed = parse_email_text("Grand Total: €89.99");
    assert_eq!(parsed.total, Some(89.99));
    assert_eq!(parsed.currency.as_deref(), Some("EUR"));
}

#[test]
fn test_amount_prefixed_symbol_checked_first() {
    let parsed = parse_email_text("Total: HK$ 120.00");
    assert_eq!(parsed.total, Some(120.0));
    assert_eq!(parsed.currency.as_deref(), Some("HKD"));
}

#[test]
fn test_amount_currency_code_scan_fallback() {
    let parsed = parse_email_text("Amount charged 49.00. All prices in CAD.");
    assert_eq!(parsed.total, Some(49.0));
    assert_eq!(parsed.currency.as_deref(), Some("CAD"));
}

#[test]
fn test_amount_defaults_to_usd() {
    let parsed = parse_email_text("You paid 25.00 for this order");
    assert_eq!(parsed.total, Some(25.0));
    assert_eq!(parsed.currency.as_deref(), Some("USD"));
}

#[test]
fn test_amount_generic_pass_when_no_label() {
    let parsed = parse_email_text("We put $7.25 on your card and 19.99 USD on the gift card");
    // Generic pass, largest plausible amount wins.
    assert_eq!(parsed.total, Some(19.99));
}

#[test]
fn test_amount_absent() {
    let parsed = parse_email_text("no money mentioned here");
    assert!(parsed.total.is_none());
    assert!(parsed.currency.is_none());
}

#[test]
fn test_amount_implausible_rejected() {
    let parsed = parse_email_text("Total: $4,500,000.00");
    assert!(parsed.total.is_none());
}

#[test]
fn test_order_number_with_hash() {
    let parsed = parse_email_text("Order #112-7366106-5775433 has shipped");
    assert_eq!(parsed.order_number.as_deref(), Some("112-7366106-5775433"));
}

#[test]
fn test_order_number_labeled() {
    let parsed = parse_email_text("Confirmation Number: QX84-ZZT9");
    assert_eq!(parsed.order_number.as_deref(), Some("QX84-ZZT9"));
}

#[test]
fn test_order_number_numeric_fallback() {
    let parsed = parse_email_text("Your confirmation 98765432 is attached");
    assert_eq!(parsed.order_number.as_deref(), Some("98765432"));
}

#[test]
fn test_payment_method_card_network() {
    let parsed = parse_email_text("Paid with Visa ending in 4242");
    assert_eq!(parsed.payment_method, Some(PaymentMethod::Credit));
}

#[test]
fn test_payment_method_debit_card_outranks_network() {
    let parsed = parse_email_text("Visa debit card ending in 1234");
    assert_eq!(parsed.payment_method, Some(PaymentMethod::Debit));
}

#[test]
fn test_payment_method_wallets() {
    assert_eq!(
        parse_email_text("Charged via Apple Pay").payment_method,
        Some(PaymentMethod::Credit)
    );
    assert_eq!(
        parse_email_text("Sent with Venmo").payment_method,
        Some(PaymentMethod::Debit)
    );
}

#[test]
fn test_payment_method_cash_and_check() {
    assert_eq!(
        parse_email_text("paid in cash").payment_method,
        Some(PaymentMethod::Cash)
    );
    assert_eq!(
        parse_email_text("Paid by check #1042").payment_method,
        Some(PaymentMethod::Check)
    );
}

#[test]
fn test_payment_method_bare_masked_card_defaults_credit() {
    let parsed = parse_email_text("Card ****4242");
    assert_eq!(parsed.payment_method, Some(PaymentMethod::Credit));
}

#[test]
fn test_payment_method_absent_is_none() {
    let parsed = parse_email_text("We shipped your package");
    assert!(parsed.payment_method.is_none());
}

#[test]
fn test_items_quantity_prefixed() {
    let parsed = parse_email_text(
        "2 x Organic Bananas\n\
         1 x Oat Milk 64oz\n\
         3 x Sourdough Loaf",
    );
    assert_eq!(
        parsed.items,
        vec!["Organic Bananas", "Oat Milk 64oz", "Sourdough Loaf"]
    );
}

#[test]
fn test_items_dash_price_lines_dedup() {
    let parsed = parse_email_text("Espresso - $4.50\nCroissant - $3.25\nEspresso - $4.50");
    assert_eq!(parsed.items, vec!["Espresso", "Croissant"]);
}

#[test]
fn test_items_skip_summary_lines() {
    let parsed = parse_email_text("Gift Wrap $2.00\nSubtotal $10.00\nTotal $12.00");
    assert_eq!(parsed.items, vec!["Gift Wrap"]);
}

#[test]
fn test_items_capped_at_twenty() {
    let text: String = (0..30)
        .map(|i| format!("1 x Widget Model {i:02}\n"))
        .collect();
    let parsed = parse_email_text(&text);
    assert_eq!(parsed.items.len(), 20);
}

#[test]
fn test_html_input_is_stripped() {
    let parsed = parse_email_text(
        "<html><style>p { color: red; }</style><body>\
         <h1>Receipt</h1><p>Order Date: 02/14/2026</p>\
         <p>Total: $25.00</p></body></html>",
    );
    assert_eq!(parsed.date.as_deref(), Some("2026-02-14"));
    assert_eq!(parsed.total, Some(25.0));
}

#[test]
fn test_raw_text_is_preserved() {
    let input = "Total $9.99";
    let parsed = parse_email_text(input);
    assert_eq!(parsed.raw_text, input);
}

#[test]
fn test_validator_vendor_date_total_scores_85() {
    let mut parsed = parse_email_text("");
    parsed.vendor = Some("Amazon".to_string());
    parsed.date = Some("2026-01-06".to_string());
    parsed.total = Some(49.99);

    let report = validate_parsed_email(&parsed);
    assert_eq!(report.confidence, 85);
    assert!(report.is_valid);
    assert!(report.missing_fields.is_empty());
}

#[test]
fn test_validator_vendor_alone_scores_30() {
    let mut parsed = parse_email_text("");
    parsed.vendor = Some("Amazon".to_string());

    let report = validate_parsed_email(&parsed);
    assert_eq!(report.confidence, 30);
    assert!(!report.is_valid);
    assert_eq!(report.missing_fields, vec!["date", "total"]);
}

#[test]
fn test_validator_full_extraction_scores_100() {
    let mut parsed = parse_email_text("");
    parsed.vendor = Some("Amazon".to_string());
    parsed.date = Some("2026-01-06".to_string());
    parsed.total = Some(49.99);
    parsed.order_number = Some("112-7366106".to_string());
    parsed.items = vec!["USB Cable".to_string()];

    let report = validate_parsed_email(&parsed);
    assert_eq!(report.confidence, 100);
    assert!(report.is_valid);
}

#[test]
fn test_validator_zero_total_counts_missing() {
    let mut parsed = parse_email_text("");
    parsed.total = Some(0.0);

    let report = validate_parsed_email(&parsed);
    assert_eq!(report.missing_fields, vec!["vendor", "date", "total"]);
}

#[test]
fn test_validation_parse_failure_report() {
    let report = ValidationResult::parse_failure();
    assert!(!report.is_valid);
    assert_eq!(report.confidence, 0);
    assert_eq!(report.missing_fields, vec!["parsing failed"]);
}

#[test]
fn test_is_eml_upload() {
    assert!(is_eml_upload("receipt.EML", "application/octet-stream"));
    assert!(is_eml_upload("forwarded", "message/rfc822"));
    assert!(!is_eml_upload("receipt.png", "image/png"));
}
