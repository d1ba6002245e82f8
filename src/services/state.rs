use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};

use crate::models::{Invoice, Tab, TabCounts, VendorInfo};
use crate::services::api::InvoiceApi;
use crate::services::normalize::normalize_response;
use crate::services::views;

pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch data. Please try again.";
pub const UNFLAG_ERROR_MESSAGE: &str = "Failed to unflag invoice. Please try again.";

/// Everything the dashboard shows. Only `AppState` mutates it.
#[derive(Debug, Default)]
pub struct Session {
    invoices: Vec<Invoice>,
    vendors: Vec<VendorInfo>,
    active_tab: Tab,
    expanded: HashSet<(Tab, String)>,
    unflagging: HashSet<String>,
    loads_in_flight: usize,
    error: Option<String>,
    last_loaded: Option<DateTime<Local>>,
}

impl Session {
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn vendors(&self) -> &[VendorInfo] {
        &self.vendors
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn is_expanded(&self, tab: Tab, row_key: &str) -> bool {
        self.expanded.contains(&(tab, row_key.to_string()))
    }

    pub fn is_unflagging(&self, invoice_id: &str) -> bool {
        self.unflagging.contains(invoice_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loads_in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_loaded(&self) -> Option<DateTime<Local>> {
        self.last_loaded
    }

    pub fn counts(&self) -> TabCounts {
        views::tab_counts(&self.invoices, &self.vendors)
    }

    pub fn flagged_invoice(&self, invoice_id: &str) -> Option<&Invoice> {
        self.invoices
            .iter()
            .find(|invoice| invoice.invoice_id == invoice_id && invoice.is_flagged())
    }

    /// Whether `row_key` names a row currently shown on `tab`.
    pub fn has_row(&self, tab: Tab, row_key: &str) -> bool {
        match tab {
            Tab::Unflagged => views::unflagged(&self.invoices)
                .iter()
                .any(|invoice| invoice.invoice_id == row_key),
            Tab::Flagged => self.flagged_invoice(row_key).is_some(),
            Tab::Vendors => row_key
                .parse::<usize>()
                .map(|index| index >= 1 && index <= self.vendors.len())
                .unwrap_or(false),
        }
    }

    fn replace_data(&mut self, invoices: Vec<Invoice>, vendors: Vec<VendorInfo>) {
        self.invoices = invoices;
        self.vendors = vendors;
        self.last_loaded = Some(Local::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded {
        invoices: usize,
        vendors: usize,
        decode_failures: usize,
    },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorRegistration {
    NotRequested,
    Registered,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnflagOutcome {
    Acknowledged { vendor: VendorRegistration },
    AlreadyInFlight,
    Failed,
}

pub struct AppState<A> {
    api: A,
    session: Mutex<Session>,
}

impl<A: InvoiceApi> AppState<A> {
    pub fn new(api: A) -> Self {
        Self::with_tab(api, Tab::default())
    }

    pub fn with_tab(api: A, tab: Tab) -> Self {
        AppState {
            api,
            session: Mutex::new(Session {
                active_tab: tab,
                ..Session::default()
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs `f` against the current session. The lock is released before returning.
    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    pub fn set_active_tab(&self, tab: Tab) {
        self.update(|session| session.active_tab = tab);
    }

    /// Flips the expanded state of a row and returns the new state.
    pub fn toggle_expand(&self, tab: Tab, row_key: &str) -> bool {
        self.update(|session| {
            let key = (tab, row_key.to_string());
            if session.expanded.remove(&key) {
                false
            } else {
                session.expanded.insert(key);
                true
            }
        })
    }

    /// Reloads invoices and vendors. On failure the previous data stays and
    /// the session carries a user-facing error instead.
    pub async fn fetch_data(&self) -> LoadOutcome {
        self.update(|session| {
            session.loads_in_flight += 1;
            session.error = None;
        });

        let result = self.api.fetch_all().await;

        match result {
            Ok(response) => {
                let batch = normalize_response(response);
                let outcome = LoadOutcome::Loaded {
                    invoices: batch.invoices.len(),
                    vendors: batch.vendors.len(),
                    decode_failures: batch.decode_failures.len(),
                };
                tracing::info!(
                    invoices = batch.invoices.len(),
                    vendors = batch.vendors.len(),
                    decode_failures = batch.decode_failures.len(),
                    skipped = batch.skipped_records,
                    "dashboard data loaded"
                );
                self.update(|session| {
                    session.replace_data(batch.invoices, batch.vendors);
                    session.loads_in_flight = session.loads_in_flight.saturating_sub(1);
                });
                outcome
            }
            Err(err) => {
                tracing::error!(code = err.code(), error = %err, "error fetching data");
                self.update(|session| {
                    session.error = Some(FETCH_ERROR_MESSAGE.to_string());
                    session.loads_in_flight = session.loads_in_flight.saturating_sub(1);
                });
                LoadOutcome::Failed
            }
        }
    }

    /// Acknowledges a flagged invoice, promotes its vendor snapshot when the
    /// vendor details were the reason for the flag, then reloads.
    pub async fn unflag_invoice(&self, invoice: &Invoice) -> UnflagOutcome {
        let invoice_id = invoice.invoice_id.clone();
        if invoice_id.trim().is_empty() {
            tracing::warn!("refusing to unflag an invoice without an id");
            self.update(|session| session.error = Some(UNFLAG_ERROR_MESSAGE.to_string()));
            return UnflagOutcome::Failed;
        }

        let claimed = self.update(|session| session.unflagging.insert(invoice_id.clone()));
        if !claimed {
            tracing::debug!(invoice_id = %invoice_id, "unflag already in flight");
            return UnflagOutcome::AlreadyInFlight;
        }

        if let Err(err) = self.api.unflag(&invoice_id).await {
            tracing::error!(invoice_id = %invoice_id, code = err.code(), error = %err, "error unflagging invoice");
            self.update(|session| {
                session.error = Some(UNFLAG_ERROR_MESSAGE.to_string());
                session.unflagging.remove(&invoice_id);
            });
            return UnflagOutcome::Failed;
        }
        tracing::info!(invoice_id = %invoice_id, "invoice acknowledged");

        let vendor = match (invoice.has_incorrect_vendor_info(), invoice.vendor_info.as_ref()) {
            (true, Some(vendor_info)) => match self.api.add_vendor(vendor_info).await {
                Ok(()) => {
                    tracing::info!(invoice_id = %invoice_id, "vendor added to trusted list");
                    VendorRegistration::Registered
                }
                Err(err) => {
                    tracing::warn!(invoice_id = %invoice_id, error = %err, "failed to add vendor");
                    VendorRegistration::Failed
                }
            },
            _ => VendorRegistration::NotRequested,
        };

        self.fetch_data().await;

        self.update(|session| {
            session.expanded.remove(&(Tab::Flagged, invoice_id.clone()));
            session.unflagging.remove(&invoice_id);
        });

        UnflagOutcome::Acknowledged { vendor }
    }
}
