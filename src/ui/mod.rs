//! Plain-text rendering of the dashboard session.

use crate::models::{Invoice, Tab, VendorRow};
use crate::services::state::Session;
use crate::services::views;
use crate::utils::{file_link, format_amount, format_timestamp, safe_display};

const RULE_WIDTH: usize = 72;
const DETAIL_INDENT: &str = "    ";

pub fn render(session: &Session) -> String {
    let mut lines = header(session);
    lines.extend(body(session, session.active_tab()));
    lines.join("\n")
}

/// Renders a specific tab regardless of which one is active.
pub fn render_tab(session: &Session, tab: Tab) -> String {
    let mut lines = vec![format!("== {} ({}) ==", tab.label(), session.counts().for_tab(tab))];
    lines.extend(body(session, tab));
    lines.join("\n")
}

fn header(session: &Session) -> Vec<String> {
    let counts = session.counts();
    let tabs = Tab::ALL
        .iter()
        .map(|tab| {
            let label = format!("{} ({})", tab.label(), counts.for_tab(*tab));
            if *tab == session.active_tab() {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");

    let refreshed = session
        .last_loaded()
        .map(|at| format!("last refreshed {}", format_timestamp(at)))
        .unwrap_or_else(|| "not loaded yet".to_string());

    vec![
        format!("TrustBill Invoice Dashboard ({})", refreshed),
        tabs,
        "-".repeat(RULE_WIDTH),
    ]
}

fn body(session: &Session, tab: Tab) -> Vec<String> {
    if session.is_loading() {
        return vec!["⟳ Loading...".to_string()];
    }
    if let Some(error) = session.error() {
        return vec![format!("⚠ {}", error), "  Type `retry` to reload.".to_string()];
    }

    match tab {
        Tab::Unflagged => invoice_rows(session, tab, &views::unflagged(session.invoices())),
        Tab::Flagged => invoice_rows(session, tab, &views::flagged(session.invoices())),
        Tab::Vendors => vendor_rows(session, &views::vendor_rows(session.vendors())),
    }
}

fn chevron(expanded: bool) -> &'static str {
    if expanded {
        "▾"
    } else {
        "▸"
    }
}

fn invoice_rows(session: &Session, tab: Tab, invoices: &[&Invoice]) -> Vec<String> {
    if invoices.is_empty() {
        return vec!["No invoices to show.".to_string()];
    }

    let mut lines = Vec::new();
    for invoice in invoices {
        let expanded = session.is_expanded(tab, &invoice.invoice_id);
        let badge = if tab == Tab::Flagged { "Flagged" } else { "Approved" };
        lines.push(format!(
            "{} Invoice - {}  By: {}  {}  [{}]",
            chevron(expanded),
            display_id(&invoice.invoice_id),
            safe_display(&invoice.vendor_email),
            format_amount(invoice.currency_symbol(), &invoice.total_amount),
            badge
        ));
        if expanded {
            lines.extend(invoice_details(session, tab, invoice));
        }
    }
    lines
}

fn display_id(invoice_id: &str) -> String {
    if invoice_id.is_empty() {
        crate::utils::GLYPH_UNKNOWN.to_string()
    } else {
        invoice_id.to_string()
    }
}

fn invoice_details(session: &Session, tab: Tab, invoice: &Invoice) -> Vec<String> {
    let currency = invoice.currency_symbol();
    let mut lines = vec![
        detail("Invoice Number", safe_display(&invoice.invoice_number)),
        detail("Invoice Date", safe_display(&invoice.invoice_date)),
        detail("Due Date", safe_display(&invoice.due_date)),
        detail("Currency", safe_display(&invoice.currency)),
        detail("Tax Amount", format_amount(currency, &invoice.tax_amount)),
        detail("Notes", safe_display(&invoice.notes)),
        detail("Terms & Conditions", safe_display(&invoice.terms_and_conditions)),
        detail(
            "File URL",
            file_link(&invoice.file_url)
                .map(str::to_string)
                .unwrap_or_else(|| "No file available".to_string()),
        ),
    ];

    lines.push(format!("{}Items:", DETAIL_INDENT));
    if invoice.items.is_empty() {
        lines.push(format!("{}  No items available", DETAIL_INDENT));
    }
    for item in &invoice.items {
        lines.push(format!(
            "{}  - {} | Qty: {} | Unit: {} | Amount: {}",
            DETAIL_INDENT,
            safe_display(&item.description),
            safe_display(&item.quantity),
            format_amount(currency, &item.unit_price),
            format_amount(currency, &item.amount),
        ));
    }

    if let Some(flags) = &invoice.flags {
        lines.push(format!("{}Flags:", DETAIL_INDENT));
        for (name, value) in flags.indicators() {
            lines.push(format!("{}  {}: {}", DETAIL_INDENT, name, safe_display(&value)));
        }
    }

    if let Some(vendor) = &invoice.vendor_info {
        lines.push(format!("{}Vendor Information:", DETAIL_INDENT));
        for (name, value) in vendor.fields() {
            lines.push(format!("{}  {}: {}", DETAIL_INDENT, name, safe_display(&value)));
        }
    }

    if tab == Tab::Flagged {
        if session.is_unflagging(&invoice.invoice_id) {
            lines.push(format!("{}Unflagging...", DETAIL_INDENT));
        } else {
            lines.push(format!(
                "{}Type `unflag {}` to acknowledge this invoice.",
                DETAIL_INDENT, invoice.invoice_id
            ));
        }
    }

    lines
}

fn detail(label: &str, value: String) -> String {
    format!("{}{}: {}", DETAIL_INDENT, label, value)
}

fn vendor_rows(session: &Session, rows: &[VendorRow<'_>]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["No trusted vendors yet.".to_string()];
    }

    let mut lines = Vec::new();
    for row in rows {
        let expanded = session.is_expanded(Tab::Vendors, &row.index.to_string());
        lines.push(format!(
            "{} {}. {}  {}  [Active]",
            chevron(expanded),
            row.index,
            safe_display(&row.vendor.vendor_name),
            safe_display(&row.vendor.vendor_email),
        ));
        if expanded {
            for (name, value) in row.vendor.fields() {
                lines.push(detail(&name, safe_display(&value)));
            }
        }
    }
    lines
}
