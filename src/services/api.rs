use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use crate::errors::{AppError, AppResult};
use crate::models::{ApiResponse, VendorInfo};

/// Remote invoice service. `HttpInvoiceApi` is the production implementation;
/// tests substitute their own.
#[async_trait]
pub trait InvoiceApi: Send + Sync {
    /// `GET {base}`: every invoice and trusted vendor.
    async fn fetch_all(&self) -> AppResult<ApiResponse>;

    /// `PUT {base}/{invoice_id}` with an empty body. The backend clears the flags.
    async fn unflag(&self, invoice_id: &str) -> AppResult<()>;

    /// `POST {base}/vendors/add` with the vendor record as body.
    async fn add_vendor(&self, vendor: &VendorInfo) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct HttpInvoiceApi {
    client: Client,
    base: Url,
}

impl HttpInvoiceApi {
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        HttpInvoiceApi { client, base }
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl InvoiceApi for HttpInvoiceApi {
    async fn fetch_all(&self) -> AppResult<ApiResponse> {
        let response = self.client.get(self.base.clone()).send().await?;
        let response = ensure_success(response)?;
        let body: ApiResponse = response.json().await?;
        tracing::debug!(
            invoices = body.invoices.len(),
            vendors = body.vendors.len(),
            "fetched dashboard data"
        );
        Ok(body)
    }

    async fn unflag(&self, invoice_id: &str) -> AppResult<()> {
        let url = self.endpoint(&[invoice_id])?;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }

    async fn add_vendor(&self, vendor: &VendorInfo) -> AppResult<()> {
        let url = self.endpoint(&["vendors", "add"])?;
        let response = self.client.post(url).json(vendor).send().await?;
        ensure_success(response)?;
        Ok(())
    }
}

fn ensure_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}
