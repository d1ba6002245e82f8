use crate::models::Tab;
use crate::services::api::InvoiceApi;
use crate::services::state::{AppState, LoadOutcome};

pub fn switch_tab<A: InvoiceApi>(tab: Tab, state: &AppState<A>) {
    state.set_active_tab(tab);
}

/// Expands or collapses a row of the active tab.
pub fn toggle_row<A: InvoiceApi>(row_key: &str, state: &AppState<A>) -> Result<bool, String> {
    let (tab, exists) = state.read(|session| {
        let tab = session.active_tab();
        (tab, session.has_row(tab, row_key))
    });
    if !exists {
        return Err(format!("No row `{}` on {}", row_key, tab.label()));
    }
    Ok(state.toggle_expand(tab, row_key))
}

pub async fn refresh<A: InvoiceApi>(state: &AppState<A>) -> LoadOutcome {
    state.fetch_data().await
}
