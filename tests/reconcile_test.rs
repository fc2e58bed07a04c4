use receipt_extract::{
    ExtractError, OcrItem, OcrResult, TransactionDraft, parse_email_text,
};

fn ocr_fixture() -> OcrResult {
    OcrResult::from_json(
        r#"{
            "date": "2026-01-06",
            "vendor": "Blue Bottle Coffee",
            "amount": 12.5,
            "subtotal": 11.25,
            "tax": 1.25,
            "currency": "USD",
            "category": "meals",
            "paymentMethod": "credit",
            "items": [
                "Drip Coffee",
                {"name": "Croissant", "qty": 2, "unitPrice": 3.25}
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_ocr_population_fills_empty_draft() {
    let mut draft = TransactionDraft::new();
    draft.apply_ocr(&ocr_fixture());

    assert_eq!(draft.date, "2026-01-06");
    assert_eq!(draft.vendor, "Blue Bottle Coffee");
    assert_eq!(draft.amount, "12.50");
    assert_eq!(draft.subtotal, "11.25");
    assert_eq!(draft.tax, "1.25");
    assert_eq!(draft.currency, "USD");
    assert_eq!(draft.category, "meals");
    assert_eq!(draft.payment_method, "credit");

    assert_eq!(draft.items.len(), 2);
    assert_eq!(draft.items[0].name, "Drip Coffee");
    assert!((draft.items[0].qty - 1.0).abs() < f64::EPSILON);
    assert!(draft.items[0].unit_price.abs() < f64::EPSILON);
    assert_eq!(draft.items[1].name, "Croissant");
    assert!((draft.items[1].amount - 6.5).abs() < 1e-9);
}

#[test]
fn test_user_set_field_is_never_overwritten() {
    let mut draft = TransactionDraft::new();
    draft.vendor = "My Edit".to_string();

    draft.apply_ocr(&ocr_fixture());
    assert_eq!(draft.vendor, "My Edit");

    let parsed = parse_email_text("Thank you for your purchase at Amazon\nTotal: $49.99");
    draft.apply_email(&parsed);
    assert_eq!(draft.vendor, "My Edit");
    // The email result cannot overwrite what OCR already filled either.
    assert_eq!(draft.amount, "12.50");
}

#[test]
fn test_first_populating_source_wins_and_is_idempotent() {
    let mut draft = TransactionDraft::new();

    let parsed = parse_email_text("Your order from Target\nOrder Total: $20.00");
    draft.apply_email(&parsed);
    assert_eq!(draft.vendor, "Target");
    assert_eq!(draft.amount, "20.00");

    draft.apply_ocr(&ocr_fixture());
    assert_eq!(draft.vendor, "Target");
    assert_eq!(draft.amount, "20.00");
    // OCR still fills what the email could not.
    assert_eq!(draft.subtotal, "11.25");

    draft.apply_ocr(&ocr_fixture());
    assert_eq!(draft.vendor, "Target");
}

#[test]
fn test_category_sentinel_counts_as_unset() {
    let mut draft = TransactionDraft::new();
    assert_eq!(draft.category, "other");

    draft.apply_ocr(&ocr_fixture());
    assert_eq!(draft.category, "meals");

    // A non-sentinel category is user-set and stays.
    let mut edited = TransactionDraft::new();
    edited.category = "travel".to_string();
    edited.apply_ocr(&ocr_fixture());
    assert_eq!(edited.category, "travel");
}

#[test]
fn test_amounts_written_with_two_decimals() {
    let mut draft = TransactionDraft::new();
    let parsed = parse_email_text("You paid 11.5 for this order");
    draft.apply_email(&parsed);
    assert_eq!(draft.amount, "11.50");
}

#[test]
fn test_email_items_get_unit_defaults() {
    let mut draft = TransactionDraft::new();
    let parsed = parse_email_text("2 x Organic Bananas\n1 x Oat Milk 64oz\n3 x Sourdough Loaf");
    draft.apply_email(&parsed);

    assert_eq!(draft.items.len(), 3);
    for item in &draft.items {
        assert!((item.qty - 1.0).abs() < f64::EPSILON);
        assert!(item.unit_price.abs() < f64::EPSILON);
        assert!(item.selected);
    }
}

#[test]
fn test_existing_items_not_replaced_by_population() {
    let mut draft = TransactionDraft::new();
    draft.add_item("Hand-entered".to_string());

    draft.apply_ocr(&ocr_fixture());
    assert_eq!(draft.items.len(), 1);
    assert_eq!(draft.items[0].name, "Hand-entered");
}

#[test]
fn test_item_amount_recomputed_on_edit() {
    let mut draft = TransactionDraft::new();
    let id = draft.add_item("USB Cable".to_string());

    draft.set_item_unit_price(id, 4.25).unwrap();
    draft.set_item_qty(id, 3.0).unwrap();

    let item = &draft.items[0];
    assert!((item.amount - item.qty * item.unit_price).abs() < f64::EPSILON);
    assert!((item.amount - 12.75).abs() < 1e-9);

    // Negative input clamps to zero and the amount follows.
    draft.set_item_qty(id, -2.0).unwrap();
    assert!(draft.items[0].qty.abs() < f64::EPSILON);
    assert!(draft.items[0].amount.abs() < f64::EPSILON);
}

#[test]
fn test_unknown_item_id_is_an_error() {
    let mut draft = TransactionDraft::new();
    assert!(matches!(
        draft.set_item_qty(99, 1.0),
        Err(ExtractError::UnknownItem(99))
    ));
    assert!(matches!(
        draft.remove_item(99),
        Err(ExtractError::UnknownItem(99))
    ));
}

#[test]
fn test_selected_subtotal_and_explicit_apply() {
    let mut draft = TransactionDraft::new();
    draft.amount = "99.99".to_string();

    let a = draft.add_item("Espresso".to_string());
    let b = draft.add_item("Croissant".to_string());
    draft.set_item_unit_price(a, 4.5).unwrap();
    draft.set_item_unit_price(b, 3.25).unwrap();

    assert!((draft.selected_subtotal() - 7.75).abs() < 1e-9);

    draft.set_item_selected(b, false).unwrap();
    assert!((draft.selected_subtotal() - 4.5).abs() < 1e-9);

    // The subtotal never touches the draft amount until explicitly applied.
    assert_eq!(draft.amount, "99.99");
    draft.apply_selected_subtotal();
    assert_eq!(draft.amount, "4.50");
    assert_eq!(draft.subtotal, "4.50");
}

#[test]
fn test_select_all_toggles_uniformly() {
    let mut draft = TransactionDraft::new();
    draft.add_item("One".to_string());
    draft.add_item("Two".to_string());

    draft.select_all(false);
    assert!(draft.items.iter().all(|i| !i.selected));
    assert!(draft.selected_subtotal().abs() < f64::EPSILON);

    draft.select_all(true);
    assert!(draft.items.iter().all(|i| i.selected));
}

#[test]
fn test_remove_item() {
    let mut draft = TransactionDraft::new();
    let a = draft.add_item("Keep".to_string());
    let b = draft.add_item("Drop".to_string());
    assert_ne!(a, b);

    draft.remove_item(b).unwrap();
    assert_eq!(draft.items.len(), 1);
    assert_eq!(draft.items[0].name, "Keep");
}

#[test]
fn test_ocr_item_amount_without_unit_price() {
    let ocr = OcrResult::from_json(
        r#"{"items": [{"name": "Bundle", "qty": 2, "amount": 9.0}]}"#,
    )
    .unwrap();

    let mut draft = TransactionDraft::new();
    draft.apply_ocr(&ocr);

    // Unit price is derived from the supplied amount.
    assert!((draft.items[0].unit_price - 4.5).abs() < 1e-9);
    assert!((draft.items[0].amount - 9.0).abs() < 1e-9);
}

#[test]
fn test_ocr_item_shapes_deserialize() {
    let ocr = OcrResult::from_json(r#"{"items": ["Plain Name"]}"#).unwrap();
    assert!(matches!(&ocr.items[0], OcrItem::Name(n) if n == "Plain Name"));

    let bad = OcrResult::from_json("not json at all");
    assert!(matches!(bad, Err(ExtractError::OcrPayload(_))));
}
