//! Reconciliation of OCR output, parsed-email output, and user edits into a
//! single editable transaction draft.
//!
//! The merge policy is first-writer-wins until the user touches a field:
//! automated population only ever fills fields that are still empty, so
//! re-running it with the same or a different source is idempotent and a
//! value the user typed is never clobbered. Callers serialize merges into a
//! given draft; the empty-check-then-set is not atomic across sources.

use crate::error::{ExtractError, Result};
use crate::types::{OcrItem, OcrResult, ParsedEmailData};
use serde::{Deserialize, Serialize};

/// Category sentinel meaning "the user has not picked one yet".
const DEFAULT_CATEGORY: &str = "other";

/// One line of a transaction draft.
///
/// `amount` is always `qty * unit_price`: it is recomputed on every quantity
/// or price edit and has no direct setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub name: String,
    pub qty: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub selected: bool,
}

/// The editable form state a transaction is reconciled into.
///
/// Scalar fields are form strings; an empty string means unset. Monetary
/// fields are written pre-formatted to two decimals at populate time, not
/// re-derived later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub date: String,
    pub vendor: String,
    pub amount: String,
    pub subtotal: String,
    pub tax: String,
    pub tip: String,
    pub currency: String,
    pub category: String,
    pub payment_method: String,
    pub items: Vec<LineItem>,
    pub notes: String,
    pub business_purpose: String,
    #[serde(skip)]
    next_item_id: u64,
}

impl Default for TransactionDraft {
    fn default() -> Self {
        Self {
            date: String::new(),
            vendor: String::new(),
            amount: String::new(),
            subtotal: String::new(),
            tax: String::new(),
            tip: String::new(),
            currency: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            payment_method: String::new(),
            items: Vec::new(),
            notes: String::new(),
            business_purpose: String::new(),
            next_item_id: 1,
        }
    }
}

impl TransactionDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an OCR result into the draft, filling only fields that are
    /// still empty.
    pub fn apply_ocr(&mut self, ocr: &OcrResult) {
        set_if_empty(&mut self.date, ocr.date.as_deref());
        set_if_empty(&mut self.vendor, ocr.vendor.as_deref());
        set_money_if_empty(&mut self.amount, ocr.amount);
        set_money_if_empty(&mut self.subtotal, ocr.subtotal);
        set_money_if_empty(&mut self.tax, ocr.tax);
        set_money_if_empty(&mut self.tip, ocr.tip);
        set_if_empty(&mut self.currency, ocr.currency.as_deref());
        set_if_empty(&mut self.payment_method, ocr.payment_method.map(|m| m.as_str()));

        if self.category == DEFAULT_CATEGORY
            && let Some(category) = ocr.category.as_deref().filter(|c| !c.is_empty())
        {
            self.category = category.to_string();
        }

        if self.items.is_empty() {
            for item in &ocr.items {
                self.push_ocr_item(item);
            }
        }
    }

    /// Merge a parsed-email result into the draft, same policy as OCR.
    pub fn apply_email(&mut self, parsed: &ParsedEmailData) {
        set_if_empty(&mut self.date, parsed.date.as_deref());
        set_if_empty(&mut self.vendor, parsed.vendor.as_deref());
        set_money_if_empty(&mut self.amount, parsed.total);
        set_if_empty(&mut self.currency, parsed.currency.as_deref());
        set_if_empty(
            &mut self.payment_method,
            parsed.payment_method.map(|m| m.as_str()),
        );

        if self.items.is_empty() {
            for name in &parsed.items {
                self.add_item(name.clone());
            }
        }
    }

    /// Append a manually added line item (quantity 1, price 0). Returns its
    /// id.
    pub fn add_item(&mut self, name: String) -> u64 {
        let id = self.next_id();
        self.items.push(LineItem {
            id,
            name,
            qty: 1.0,
            unit_price: 0.0,
            amount: 0.0,
            selected: true,
        });
        id
    }

    pub fn remove_item(&mut self, id: u64) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Err(ExtractError::UnknownItem(id));
        }
        Ok(())
    }

    pub fn set_item_name(&mut self, id: u64, name: String) -> Result<()> {
        self.item_mut(id)?.name = name;
        Ok(())
    }

    /// Change a quantity; the item amount is recomputed.
    pub fn set_item_qty(&mut self, id: u64, qty: f64) -> Result<()> {
        let item = self.item_mut(id)?;
        item.qty = qty.max(0.0);
        item.amount = item.qty * item.unit_price;
        Ok(())
    }

    /// Change a unit price; the item amount is recomputed.
    pub fn set_item_unit_price(&mut self, id: u64, unit_price: f64) -> Result<()> {
        let item = self.item_mut(id)?;
        item.unit_price = unit_price.max(0.0);
        item.amount = item.qty * item.unit_price;
        Ok(())
    }

    pub fn set_item_selected(&mut self, id: u64, selected: bool) -> Result<()> {
        self.item_mut(id)?.selected = selected;
        Ok(())
    }

    /// Set every item's selection flag uniformly.
    pub fn select_all(&mut self, selected: bool) {
        for item in &mut self.items {
            item.selected = selected;
        }
    }

    /// Sum of `amount` over the currently selected items.
    #[must_use]
    pub fn selected_subtotal(&self) -> f64 {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.amount)
            .sum()
    }

    /// Overwrite the draft's amount and subtotal with the selected-items
    /// subtotal. This is the one sanctioned overwrite and only happens on an
    /// explicit user action, never during automated population.
    pub fn apply_selected_subtotal(&mut self) {
        let subtotal = self.selected_subtotal();
        self.amount = format!("{subtotal:.2}");
        self.subtotal.clone_from(&self.amount);
    }

    fn push_ocr_item(&mut self, item: &OcrItem) {
        match item {
            OcrItem::Name(name) => {
                self.add_item(name.clone());
            }
            OcrItem::Detailed {
                name,
                qty,
                unit_price,
                amount,
            } => {
                let qty = qty.unwrap_or(1.0).max(0.0);
                let unit_price = unit_price
                    .or_else(|| amount.filter(|_| qty > 0.0).map(|a| a / qty))
                    .unwrap_or(0.0)
                    .max(0.0);
                let id = self.next_id();
                self.items.push(LineItem {
                    id,
                    name: name.clone(),
                    qty,
                    unit_price,
                    amount: qty * unit_price,
                    selected: true,
                });
            }
        }
    }

    fn item_mut(&mut self, id: u64) -> Result<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ExtractError::UnknownItem(id))
    }

    fn next_id(&mut self) -> u64 {
        // The counter restarts at deserialization; never hand out an id an
        // existing item already holds.
        let floor = self
            .items
            .iter()
            .map(|item| item.id + 1)
            .max()
            .unwrap_or(1);
        let id = self.next_item_id.max(floor);
        self.next_item_id = id + 1;
        id
    }
}

fn set_if_empty(slot: &mut String, value: Option<&str>) {
    if slot.is_empty()
        && let Some(value) = value
        && !value.is_empty()
    {
        *slot = value.to_string();
    }
}

fn set_money_if_empty(slot: &mut String, value: Option<f64>) {
    if slot.is_empty()
        && let Some(value) = value
    {
        *slot = format!("{value:.2}");
    }
}
