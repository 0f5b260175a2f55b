//! Full-service wallet server JSON-RPC client
//!
//! Talks to the local wallet server over its JSON-RPC endpoint
//! (default `http://127.0.0.1:9090/wallet`). Every request is a POST of
//! `{"method", "params", "jsonrpc": "2.0", "id"}`; responses carry either
//! `result` or `error`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountSecrets, Balance, SecretEntropy, TransactionResult, Txo};
use crate::ports::WalletGateway;

/// Default wallet server endpoint
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9090/wallet";

/// Maximum number of attempts for read-only calls while the server is unreachable
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Request timeout; transaction building can take a while on a cold server
const REQUEST_TIMEOUT_SECS: u64 = 60;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: JsonValue,
    jsonrpc: &'a str,
    id: u64,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorDetail>,
}

#[derive(Deserialize)]
struct RpcErrorDetail {
    #[serde(default)]
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<JsonValue>,
}

impl RpcErrorDetail {
    fn describe(&self, method: &str) -> String {
        let detail = self
            .data
            .as_ref()
            .and_then(|d| d.get("details"))
            .and_then(|d| d.as_str());
        match detail {
            Some(d) => format!("{} failed ({}): {}: {}", method, self.code, self.message, d),
            None => format!("{} failed ({}): {}", method, self.code, self.message),
        }
    }
}

#[derive(Deserialize)]
struct AccountMapResponse {
    #[serde(default)]
    account_map: BTreeMap<String, Account>,
}

#[derive(Deserialize)]
struct AccountResponse {
    account: Account,
}

#[derive(Deserialize)]
struct SecretsResponse {
    account_secrets: AccountSecrets,
}

#[derive(Deserialize)]
struct RemovedResponse {
    removed: bool,
}

#[derive(Deserialize)]
struct BalanceResponse {
    balance: Balance,
}

#[derive(Deserialize)]
struct TxoMapResponse {
    #[serde(default)]
    txo_ids: Vec<String>,
    #[serde(default)]
    txo_map: BTreeMap<String, Txo>,
}

#[derive(Deserialize)]
struct TransactionLogResponse {
    transaction_log: TransactionResult,
}

/// Blocking JSON-RPC client for the full-service wallet server
#[derive(Debug)]
pub struct FullServiceClient {
    client: Client,
    url: Url,
    verbose: bool,
}

impl FullServiceClient {
    /// Create a client for the given endpoint URL
    pub fn new(rpc_url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(rpc_url).context("Invalid wallet server URL")?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("Wallet server URL must use http or https");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            url,
            verbose: false,
        })
    }

    /// Print method names and timings to stderr (never parameters)
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Single request, no retries
    fn call<R: DeserializeOwned>(&self, method: &str, params: JsonValue) -> Result<R> {
        let request = RpcRequest {
            method,
            params,
            jsonrpc: "2.0",
            id: REQUEST_ID.fetch_add(1, Ordering::Relaxed),
        };

        let started = Instant::now();
        if self.verbose {
            eprintln!("[mobwallet] -> {}", method);
        }

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .map_err(|e| self.map_request_error(method, e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| self.map_request_error(method, e))?;

        if self.verbose {
            eprintln!(
                "[mobwallet] <- {} ({}, {} ms)",
                method,
                status,
                started.elapsed().as_millis()
            );
        }

        match serde_json::from_str::<RpcResponse<R>>(&body) {
            Ok(RpcResponse { error: Some(err), .. }) => Err(Error::remote(err.describe(method))),
            Ok(RpcResponse { result: Some(result), .. }) if status.is_success() => Ok(result),
            Ok(_) if status.is_success() => {
                Err(Error::remote(format!("{} returned no result", method)))
            }
            Err(e) if status.is_success() => Err(Error::remote(format!(
                "{} returned a malformed response: {}",
                method, e
            ))),
            _ if status.is_server_error() && body.trim().is_empty() => Err(Error::unavailable(
                format!("{} returned HTTP {}", method, status),
            )),
            _ => Err(Error::remote(format!("{} returned HTTP {}", method, status))),
        }
    }

    /// Read-only call, retried with backoff while the server is unreachable
    ///
    /// The server takes a moment to bind its port after `start --bg`.
    fn read_call<R: DeserializeOwned>(&self, method: &str, params: JsonValue) -> Result<R> {
        let mut attempt = 0;
        loop {
            match self.call(method, params.clone()) {
                Err(Error::RemoteUnavailable(msg)) if attempt + 1 < MAX_RETRIES => {
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                    if self.verbose {
                        eprintln!(
                            "[mobwallet] Wallet server unavailable, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            msg
                        );
                    }
                    thread::sleep(delay);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Map request errors to transport or server errors
    fn map_request_error(&self, method: &str, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::unavailable(format!(
                "{} timed out after {} seconds",
                method, REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::unavailable(format!("unable to connect to {}", self.url))
        } else if error.is_request() || error.is_body() {
            Error::unavailable(format!("{} request failed: {}", method, error))
        } else {
            Error::remote(format!("{} request failed: {}", method, error))
        }
    }
}

/// Server expects 64-bit integers as strings
fn u64_param(value: Option<u64>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v.to_string()),
        None => JsonValue::Null,
    }
}

impl WalletGateway for FullServiceClient {
    fn list_accounts(&self) -> Result<BTreeMap<String, Account>> {
        let response: AccountMapResponse = self.read_call("get_all_accounts", json!({}))?;
        Ok(response.account_map)
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        let response: AccountResponse =
            self.read_call("get_account", json!({ "account_id": account_id }))?;
        Ok(response.account)
    }

    fn create_account(&self, name: Option<&str>, first_block_index: Option<u64>) -> Result<Account> {
        let response: AccountResponse = self.call(
            "create_account",
            json!({
                "name": name.unwrap_or(""),
                "first_block_index": u64_param(first_block_index),
            }),
        )?;
        Ok(response.account)
    }

    fn import_account(
        &self,
        entropy: &SecretEntropy,
        name: Option<&str>,
        first_block_index: Option<u64>,
    ) -> Result<Account> {
        let entropy_hex = entropy.to_hex();
        let response: AccountResponse = self.call(
            "import_account",
            json!({
                "entropy": entropy_hex.as_str(),
                "name": name.unwrap_or(""),
                "first_block_index": u64_param(first_block_index),
            }),
        )?;
        Ok(response.account)
    }

    fn export_account_secrets(&self, account_id: &str) -> Result<AccountSecrets> {
        let response: SecretsResponse =
            self.read_call("export_account_secrets", json!({ "account_id": account_id }))?;
        Ok(response.account_secrets)
    }

    fn update_account_name(&self, account_id: &str, name: &str) -> Result<Account> {
        let response: AccountResponse = self.call(
            "update_account_name",
            json!({ "account_id": account_id, "name": name }),
        )?;
        Ok(response.account)
    }

    fn remove_account(&self, account_id: &str) -> Result<bool> {
        let response: RemovedResponse =
            self.call("remove_account", json!({ "account_id": account_id }))?;
        Ok(response.removed)
    }

    fn get_balance(&self, account_id: &str) -> Result<Balance> {
        let response: BalanceResponse =
            self.read_call("get_balance_for_account", json!({ "account_id": account_id }))?;
        Ok(response.balance)
    }

    fn list_txos(&self, account_id: &str) -> Result<Vec<Txo>> {
        let mut response: TxoMapResponse =
            self.read_call("get_all_txos_for_account", json!({ "account_id": account_id }))?;

        // Keep the server's ordering; fall back to map order for ids it did not list
        let mut txos = Vec::with_capacity(response.txo_map.len());
        for id in &response.txo_ids {
            if let Some(txo) = response.txo_map.remove(id) {
                txos.push(txo);
            }
        }
        txos.extend(response.txo_map.into_values());
        Ok(txos)
    }

    fn build_and_submit_transaction(
        &self,
        account_id: &str,
        value_pmob: u64,
        recipient_address: &str,
    ) -> Result<TransactionResult> {
        let response: TransactionLogResponse = self.call(
            "build_and_submit_transaction",
            json!({
                "account_id": account_id,
                "recipient_public_address": recipient_address,
                "value_pmob": value_pmob.to_string(),
            }),
        )?;
        Ok(response.transaction_log)
    }
}
