use crate::services::api::InvoiceApi;
use crate::services::state::{AppState, UnflagOutcome};

pub async fn unflag_invoice<A: InvoiceApi>(
    invoice_id: &str,
    state: &AppState<A>,
) -> Result<UnflagOutcome, String> {
    if invoice_id.trim().is_empty() {
        return Err("An invoice id is required".to_string());
    }
    let invoice = state
        .read(|session| session.flagged_invoice(invoice_id).cloned())
        .ok_or_else(|| format!("Invoice {} is not in the flagged list", invoice_id))?;

    Ok(state.unflag_invoice(&invoice).await)
}
