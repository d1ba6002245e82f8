use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A scalar field value, classified once when the payload is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayValue {
    Flag(bool),
    #[default]
    Absent,
    Empty,
    Text(String),
}

impl DisplayValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, DisplayValue::Absent)
    }

    /// Text content, if any. Flags and absent values have none.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DisplayValue::Text(text) => Some(text),
            DisplayValue::Empty => Some(""),
            _ => None,
        }
    }
}

impl From<Value> for DisplayValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(flag) => DisplayValue::Flag(flag),
            Value::Null => DisplayValue::Absent,
            Value::String(text) if text.is_empty() => DisplayValue::Empty,
            Value::String(text) => DisplayValue::Text(text),
            Value::Number(number) => DisplayValue::Text(number.to_string()),
            other => DisplayValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        DisplayValue::from(Value::String(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for DisplayValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(DisplayValue::from)
    }
}

impl Serialize for DisplayValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DisplayValue::Flag(flag) => serializer.serialize_bool(*flag),
            DisplayValue::Absent => serializer.serialize_none(),
            DisplayValue::Empty => serializer.serialize_str(""),
            DisplayValue::Text(text) => serializer.serialize_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "Description", default)]
    pub description: DisplayValue,
    #[serde(rename = "Quantity", default)]
    pub quantity: DisplayValue,
    #[serde(rename = "UnitPrice", default)]
    pub unit_price: DisplayValue,
    #[serde(rename = "Amount", default)]
    pub amount: DisplayValue,
}

const KNOWN_FLAGS: [&str; 4] = [
    "IncorrectVendorInfo",
    "DuplicateInvoice",
    "UnusualAmounts",
    "ItemizedInvoice",
];

/// Risk indicators computed by the backend verifier. `None` means the check
/// was skipped, the key was missing, or the value was not a boolean.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Flags {
    #[serde(rename = "IncorrectVendorInfo", skip_serializing_if = "Option::is_none")]
    pub incorrect_vendor_info: Option<bool>,
    #[serde(rename = "DuplicateInvoice", skip_serializing_if = "Option::is_none")]
    pub duplicate_invoice: Option<bool>,
    #[serde(rename = "UnusualAmounts", skip_serializing_if = "Option::is_none")]
    pub unusual_amounts: Option<bool>,
    #[serde(rename = "ItemizedInvoice", skip_serializing_if = "Option::is_none")]
    pub itemized_invoice: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    /// Keys exactly as received, in wire order. Empty for records built in code.
    #[serde(skip)]
    pub received: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Flags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let received = Map::<String, Value>::deserialize(deserializer)?;
        let indicator = |key: &str| received.get(key).and_then(Value::as_bool);
        let extra = received
            .iter()
            .filter(|(key, _)| !KNOWN_FLAGS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Flags {
            incorrect_vendor_info: indicator("IncorrectVendorInfo"),
            duplicate_invoice: indicator("DuplicateInvoice"),
            unusual_amounts: indicator("UnusualAmounts"),
            itemized_invoice: indicator("ItemizedInvoice"),
            extra,
            received,
        })
    }
}

impl Flags {
    /// Indicators to show: the received keys when the record came off the
    /// wire, otherwise the ones that are set.
    pub fn indicators(&self) -> Vec<(String, DisplayValue)> {
        if !self.received.is_empty() {
            return self
                .received
                .iter()
                .map(|(name, value)| (name.clone(), DisplayValue::from(value.clone())))
                .collect();
        }
        let known = [
            self.incorrect_vendor_info,
            self.duplicate_invoice,
            self.unusual_amounts,
            self.itemized_invoice,
        ];
        let mut out: Vec<(String, DisplayValue)> = KNOWN_FLAGS
            .iter()
            .zip(known)
            .filter_map(|(name, value)| value.map(|flag| (name.to_string(), DisplayValue::Flag(flag))))
            .collect();
        for (name, value) in &self.extra {
            out.push((name.clone(), DisplayValue::from(value.clone())));
        }
        out
    }

    pub fn any_raised(&self) -> bool {
        let known = [
            self.incorrect_vendor_info,
            self.duplicate_invoice,
            self.unusual_amounts,
            self.itemized_invoice,
        ];
        known.iter().any(|flag| *flag == Some(true))
            || self.extra.values().any(|value| *value == Value::Bool(true))
    }
}

const VENDOR_FIELDS: [&str; 9] = [
    "vendorId",
    "VendorName",
    "VendorEmail",
    "VendorAddress",
    "VendorGSTIN",
    "VendorBankName",
    "VendorBankAccount",
    "VendorIFSCCode",
    "VendorBankRoutingNumber",
];

/// Vendor identity and banking details. A record decoded from the wire keeps
/// its original object in `received` and serializes back to it unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VendorInfo {
    pub vendor_id: DisplayValue,
    pub vendor_name: DisplayValue,
    pub vendor_email: DisplayValue,
    pub vendor_address: DisplayValue,
    pub vendor_gstin: DisplayValue,
    pub vendor_bank_name: DisplayValue,
    pub vendor_bank_account: DisplayValue,
    pub vendor_ifsc_code: DisplayValue,
    pub vendor_bank_routing_number: DisplayValue,
    pub received: Option<Map<String, Value>>,
}

impl VendorInfo {
    fn known_fields(&self) -> [&DisplayValue; 9] {
        [
            &self.vendor_id,
            &self.vendor_name,
            &self.vendor_email,
            &self.vendor_address,
            &self.vendor_gstin,
            &self.vendor_bank_name,
            &self.vendor_bank_account,
            &self.vendor_ifsc_code,
            &self.vendor_bank_routing_number,
        ]
    }

    /// Fields to show: every received key in wire order, or the set ones for
    /// records built in code.
    pub fn fields(&self) -> Vec<(String, DisplayValue)> {
        match &self.received {
            Some(record) => record
                .iter()
                .map(|(name, value)| (name.clone(), DisplayValue::from(value.clone())))
                .collect(),
            None => VENDOR_FIELDS
                .iter()
                .zip(self.known_fields())
                .filter(|(_, value)| !value.is_absent())
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for VendorInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = Map::<String, Value>::deserialize(deserializer)?;
        let field = |key: &str| record.get(key).cloned().map(DisplayValue::from).unwrap_or_default();
        Ok(VendorInfo {
            vendor_id: field("vendorId"),
            vendor_name: field("VendorName"),
            vendor_email: field("VendorEmail"),
            vendor_address: field("VendorAddress"),
            vendor_gstin: field("VendorGSTIN"),
            vendor_bank_name: field("VendorBankName"),
            vendor_bank_account: field("VendorBankAccount"),
            vendor_ifsc_code: field("VendorIFSCCode"),
            vendor_bank_routing_number: field("VendorBankRoutingNumber"),
            received: Some(record),
        })
    }
}

impl Serialize for VendorInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(record) = &self.received {
            return record.serialize(serializer);
        }
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in VENDOR_FIELDS.iter().zip(self.known_fields()) {
            if !value.is_absent() {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// Invoice as it arrives on the wire. The embedded records stay raw until
/// normalization decodes them one field at a time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInvoice {
    #[serde(rename = "invoiceId", default)]
    pub invoice_id: DisplayValue,
    #[serde(rename = "InvoiceNumber", default)]
    pub invoice_number: DisplayValue,
    #[serde(rename = "InvoiceDate", default)]
    pub invoice_date: DisplayValue,
    #[serde(rename = "DueDate", default)]
    pub due_date: DisplayValue,
    #[serde(rename = "VendorEmail", default)]
    pub vendor_email: DisplayValue,
    #[serde(rename = "TotalAmount", default)]
    pub total_amount: DisplayValue,
    #[serde(rename = "Currency", default)]
    pub currency: DisplayValue,
    #[serde(rename = "TaxAmount", default)]
    pub tax_amount: DisplayValue,
    #[serde(rename = "Notes", default)]
    pub notes: DisplayValue,
    #[serde(rename = "TermsAndConditions", default)]
    pub terms_and_conditions: DisplayValue,
    #[serde(rename = "FileURL", default)]
    pub file_url: DisplayValue,
    #[serde(rename = "Items", default)]
    pub items: Option<Value>,
    #[serde(rename = "Flags", default)]
    pub flags: Option<Value>,
    #[serde(rename = "VendorInfo", default)]
    pub vendor_info: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub invoice_id: String,
    pub invoice_number: DisplayValue,
    pub invoice_date: DisplayValue,
    pub due_date: DisplayValue,
    pub vendor_email: DisplayValue,
    pub total_amount: DisplayValue,
    pub currency: DisplayValue,
    pub tax_amount: DisplayValue,
    pub notes: DisplayValue,
    pub terms_and_conditions: DisplayValue,
    pub file_url: DisplayValue,
    pub items: Vec<LineItem>,
    pub flags: Option<Flags>,
    pub vendor_info: Option<VendorInfo>,
}

impl Invoice {
    pub fn is_flagged(&self) -> bool {
        self.flags.as_ref().map(Flags::any_raised).unwrap_or(false)
    }

    pub fn has_incorrect_vendor_info(&self) -> bool {
        self.flags
            .as_ref()
            .and_then(|flags| flags.incorrect_vendor_info)
            .unwrap_or(false)
    }

    /// Currency prefix for amounts; `$` when the invoice names none.
    pub fn currency_symbol(&self) -> &str {
        match self.currency.as_text() {
            Some(code) if !code.is_empty() => code,
            _ => "$",
        }
    }
}

/// Body of the read endpoint. Entries stay raw so one malformed record does
/// not reject the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vendors: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub invoices: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Tab {
    #[default]
    Unflagged,
    Flagged,
    Vendors,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Unflagged, Tab::Flagged, Tab::Vendors];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Unflagged => "Unflagged Invoices",
            Tab::Flagged => "Flagged Invoices",
            Tab::Vendors => "Trusted Vendors",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Tab::Unflagged => "unflagged",
            Tab::Flagged => "flagged",
            Tab::Vendors => "vendors",
        }
    }

    pub fn parse(raw: &str) -> Option<Tab> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unflagged" | "1" => Some(Tab::Unflagged),
            "flagged" | "2" => Some(Tab::Flagged),
            "vendors" | "3" => Some(Tab::Vendors),
            _ => None,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A trusted vendor paired with its 1-based position in the directory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VendorRow<'a> {
    pub index: usize,
    pub vendor: &'a VendorInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabCounts {
    pub unflagged: usize,
    pub flagged: usize,
    pub vendors: usize,
}

impl TabCounts {
    pub fn for_tab(&self, tab: Tab) -> usize {
        match tab {
            Tab::Unflagged => self.unflagged,
            Tab::Flagged => self.flagged,
            Tab::Vendors => self.vendors,
        }
    }
}
