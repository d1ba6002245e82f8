use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{ApiResponse, Flags, Invoice, LineItem, RawInvoice, VendorInfo};

/// Outcome of decoding one embedded field.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Value(T),
    Fallback { value: T, error: String },
}

impl<T> Decoded<T> {
    fn from_result(result: Result<T, serde_json::Error>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Decoded::Value(value),
            Err(err) => Decoded::Fallback {
                value: fallback(),
                error: err.to_string(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decoded::Fallback { .. })
    }

    pub fn into_value(self) -> T {
        match self {
            Decoded::Value(value) | Decoded::Fallback { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedField {
    Items,
    Flags,
    VendorInfo,
}

impl EmbeddedField {
    pub fn name(self) -> &'static str {
        match self {
            EmbeddedField::Items => "Items",
            EmbeddedField::Flags => "Flags",
            EmbeddedField::VendorInfo => "VendorInfo",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeFailure {
    pub invoice_id: String,
    pub field: EmbeddedField,
    pub error: String,
}

/// Normalized read-endpoint payload, ready to replace the session data.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub invoices: Vec<Invoice>,
    pub vendors: Vec<VendorInfo>,
    pub decode_failures: Vec<DecodeFailure>,
    pub skipped_records: usize,
}

/// Embedded records may be structured JSON or JSON-encoded text.
fn decode_embedded<T: DeserializeOwned>(raw: Value) -> Result<T, serde_json::Error> {
    match raw {
        Value::String(text) => serde_json::from_str(&text),
        other => serde_json::from_value(other),
    }
}

pub fn decode_items(raw: Option<Value>) -> Decoded<Vec<LineItem>> {
    match raw {
        None => Decoded::Value(Vec::new()),
        Some(raw) => Decoded::from_result(decode_embedded(raw), Vec::new),
    }
}

pub fn decode_flags(raw: Option<Value>) -> Decoded<Option<Flags>> {
    match raw {
        None => Decoded::Value(None),
        Some(raw) => Decoded::from_result(decode_embedded::<Flags>(raw).map(Some), || {
            Some(Flags::default())
        }),
    }
}

pub fn decode_vendor_info(raw: Option<Value>) -> Decoded<Option<VendorInfo>> {
    match raw {
        None => Decoded::Value(None),
        Some(raw) => Decoded::from_result(decode_embedded::<VendorInfo>(raw).map(Some), || None),
    }
}

fn invoice_key(raw: &RawInvoice) -> String {
    raw.invoice_id.as_text().unwrap_or_default().to_string()
}

/// Decodes one invoice. Each embedded field is decoded on its own so a bad
/// `Items` payload never costs the `Flags` or `VendorInfo` of the same record.
pub fn normalize_invoice(raw: RawInvoice, failures: &mut Vec<DecodeFailure>) -> Invoice {
    let invoice_id = invoice_key(&raw);

    let mut settle = |field: EmbeddedField, error: Option<String>| {
        if let Some(error) = error {
            tracing::warn!(
                invoice_id = %invoice_id,
                field = field.name(),
                error = %error,
                "failed to decode embedded invoice field"
            );
            failures.push(DecodeFailure {
                invoice_id: invoice_id.clone(),
                field,
                error,
            });
        }
    };

    let items = decode_items(raw.items);
    settle(EmbeddedField::Items, fallback_error(&items));
    let flags = decode_flags(raw.flags);
    settle(EmbeddedField::Flags, fallback_error(&flags));
    let vendor_info = decode_vendor_info(raw.vendor_info);
    settle(EmbeddedField::VendorInfo, fallback_error(&vendor_info));

    Invoice {
        invoice_id,
        invoice_number: raw.invoice_number,
        invoice_date: raw.invoice_date,
        due_date: raw.due_date,
        vendor_email: raw.vendor_email,
        total_amount: raw.total_amount,
        currency: raw.currency,
        tax_amount: raw.tax_amount,
        notes: raw.notes,
        terms_and_conditions: raw.terms_and_conditions,
        file_url: raw.file_url,
        items: items.into_value(),
        flags: flags.into_value(),
        vendor_info: vendor_info.into_value(),
    }
}

fn fallback_error<T>(decoded: &Decoded<T>) -> Option<String> {
    match decoded {
        Decoded::Fallback { error, .. } => Some(error.clone()),
        Decoded::Value(_) => None,
    }
}

pub fn normalize_response(response: ApiResponse) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for entry in response.invoices {
        match serde_json::from_value::<RawInvoice>(entry) {
            Ok(raw) => {
                let invoice = normalize_invoice(raw, &mut batch.decode_failures);
                batch.invoices.push(invoice);
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping invoice record that is not an object");
                batch.skipped_records += 1;
            }
        }
    }

    for entry in response.vendors {
        match serde_json::from_value::<VendorInfo>(entry) {
            Ok(vendor) => batch.vendors.push(vendor),
            Err(err) => {
                tracing::warn!(error = %err, "skipping vendor record that is not an object");
                batch.skipped_records += 1;
            }
        }
    }

    batch
}
