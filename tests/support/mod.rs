#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use trustbill_dashboard::errors::{AppError, AppResult};
use trustbill_dashboard::models::{ApiResponse, VendorInfo};
use trustbill_dashboard::services::api::InvoiceApi;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchAll,
    Unflag(String),
    AddVendor(Value),
}

/// In-memory backend. Unflagging clears every flag of the invoice and adding a
/// vendor appends it to the directory, like the real service.
pub struct FakeApi {
    payload: Mutex<Value>,
    calls: Mutex<Vec<Call>>,
    pub fail_fetch: AtomicBool,
    pub fail_unflag: AtomicBool,
    pub fail_add_vendor: AtomicBool,
    unflag_gate: Option<Arc<Semaphore>>,
    fetch_gate: Option<Arc<Semaphore>>,
}

impl FakeApi {
    pub fn new(payload: Value) -> Self {
        FakeApi {
            payload: Mutex::new(payload),
            calls: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_unflag: AtomicBool::new(false),
            fail_add_vendor: AtomicBool::new(false),
            unflag_gate: None,
            fetch_gate: None,
        }
    }

    /// Unflag requests wait for a permit on `gate` before answering.
    pub fn gated(payload: Value, gate: Arc<Semaphore>) -> Self {
        FakeApi {
            unflag_gate: Some(gate),
            ..FakeApi::new(payload)
        }
    }

    /// Fetches are recorded straight away, then wait for a permit on `gate`.
    pub fn fetch_gated(payload: Value, gate: Arc<Semaphore>) -> Self {
        FakeApi {
            fetch_gate: Some(gate),
            ..FakeApi::new(payload)
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == Call::FetchAll)
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InvoiceApi for FakeApi {
    async fn fetch_all(&self) -> AppResult<ApiResponse> {
        self.record(Call::FetchAll);
        if let Some(gate) = &self.fetch_gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection refused".to_string()));
        }
        let payload = self.payload.lock().unwrap().clone();
        Ok(serde_json::from_value(payload)?)
    }

    async fn unflag(&self, invoice_id: &str) -> AppResult<()> {
        self.record(Call::Unflag(invoice_id.to_string()));
        if let Some(gate) = &self.unflag_gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.fail_unflag.load(Ordering::SeqCst) {
            return Err(AppError::Status {
                status: 500,
                url: format!("http://fake/invoices/{}", invoice_id),
            });
        }

        let mut payload = self.payload.lock().unwrap();
        if let Some(invoices) = payload["invoices"].as_array_mut() {
            for invoice in invoices.iter_mut() {
                if invoice["invoiceId"] != json!(invoice_id) {
                    continue;
                }
                let flags = match &invoice["Flags"] {
                    Value::String(text) => serde_json::from_str(text).unwrap_or(Value::Null),
                    other => other.clone(),
                };
                if let Value::Object(mut flags) = flags {
                    for value in flags.values_mut() {
                        *value = json!(false);
                    }
                    invoice["Flags"] = Value::Object(flags);
                }
            }
        }
        Ok(())
    }

    async fn add_vendor(&self, vendor: &VendorInfo) -> AppResult<()> {
        let body = serde_json::to_value(vendor)?;
        self.record(Call::AddVendor(body.clone()));
        if self.fail_add_vendor.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection reset".to_string()));
        }
        let mut payload = self.payload.lock().unwrap();
        if let Some(vendors) = payload["vendors"].as_array_mut() {
            vendors.push(body);
        }
        Ok(())
    }
}

pub fn vendor_json(name: &str, email: &str) -> Value {
    json!({
        "vendorId": format!("v-{}", name.to_lowercase()),
        "VendorName": name,
        "VendorEmail": email,
        "VendorAddress": "1 Market Street",
        "VendorGSTIN": "",
        "VendorBankName": "First Bank",
        "VendorBankAccount": "000123",
        "VendorIFSCCode": null,
        "VendorBankRoutingNumber": "021000021"
    })
}

pub fn invoice_json(id: &str, flags: Option<Value>, vendor: Option<Value>) -> Value {
    let mut invoice = json!({
        "invoiceId": id,
        "InvoiceNumber": format!("N-{}", id),
        "InvoiceDate": "2024-03-01",
        "DueDate": "2024-03-31",
        "VendorEmail": "billing@acme.test",
        "TotalAmount": "1200.00",
        "Currency": "USD",
        "TaxAmount": "200.00",
        "Notes": "",
        "TermsAndConditions": "Net 30",
        "FileURL": "-",
        "Items": [
            {"Description": "Consulting", "Quantity": "10", "UnitPrice": "100.00", "Amount": "1000.00"}
        ]
    });
    if let Some(flags) = flags {
        invoice["Flags"] = flags;
    }
    if let Some(vendor) = vendor {
        invoice["VendorInfo"] = vendor;
    }
    invoice
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Loopback HTTP/1.1 server answering requests with scripted responses in order.
pub struct StubServer {
    pub base: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(path: &str, responses: Vec<(u16, String)>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let recorded = recorded.clone();
                let queue = queue.clone();
                tokio::spawn(async move {
                    let Some(request) = read_request(&mut socket).await else {
                        return;
                    };
                    recorded.lock().unwrap().push(request);
                    let (status, body) = queue
                        .lock()
                        .unwrap()
                        .pop_front()
                        .unwrap_or((404, "{\"message\":\"Not found\"}".to_string()));
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        StubServer {
            base: Url::parse(&format!("http://{}{}", addr, path)).unwrap(),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let body_end = buffer.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buffer[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
