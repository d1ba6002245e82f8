use crate::models::{Invoice, TabCounts, VendorInfo, VendorRow};

pub fn unflagged(invoices: &[Invoice]) -> Vec<&Invoice> {
    invoices.iter().filter(|invoice| !invoice.is_flagged()).collect()
}

pub fn flagged(invoices: &[Invoice]) -> Vec<&Invoice> {
    invoices.iter().filter(|invoice| invoice.is_flagged()).collect()
}

/// Pairs each vendor with its 1-based position. The index is positional and
/// changes whenever the directory order does.
pub fn vendor_rows(vendors: &[VendorInfo]) -> Vec<VendorRow<'_>> {
    vendors
        .iter()
        .enumerate()
        .map(|(position, vendor)| VendorRow {
            index: position + 1,
            vendor,
        })
        .collect()
}

pub fn tab_counts(invoices: &[Invoice], vendors: &[VendorInfo]) -> TabCounts {
    let flagged = invoices.iter().filter(|invoice| invoice.is_flagged()).count();
    TabCounts {
        unflagged: invoices.len() - flagged,
        flagged,
        vendors: vendors.len(),
    }
}
