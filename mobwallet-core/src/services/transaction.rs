//! Transaction service - submit a payment and confirm it landed
//!
//! A submission is never retried: the server may have accepted a request
//! whose response was lost, and a second call could pay twice.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use super::sync::{SyncPoller, SyncProgress};
use crate::domain::amount::mob_to_pmob;
use crate::domain::result::{Error, Result};
use crate::domain::{Balance, TransactionResult};
use crate::ports::WalletGateway;

/// What the user is asked to approve
#[derive(Debug, Clone, Serialize)]
pub struct PaymentPreview {
    pub account_id: String,
    pub to_address: String,
    pub amount: Decimal,
    pub amount_pmob: u64,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Submitted; `balance` is set once the sender's account has synced past
    /// the block containing the transaction
    Sent {
        result: TransactionResult,
        balance: Option<Balance>,
    },
    Cancelled,
}

pub struct TransactionService {
    gateway: Arc<dyn WalletGateway>,
    poller: Arc<SyncPoller>,
}

impl TransactionService {
    pub fn new(gateway: Arc<dyn WalletGateway>, poller: Arc<SyncPoller>) -> Self {
        Self { gateway, poller }
    }

    /// Submit a payment, then wait for the sender's account to sync past it
    pub fn send_and_confirm<F>(
        &self,
        from_account_id: &str,
        amount: Decimal,
        to_address: &str,
        confirm: F,
    ) -> Result<SendOutcome>
    where
        F: FnOnce(&PaymentPreview) -> bool,
    {
        self.send_and_confirm_with_progress(from_account_id, amount, to_address, confirm, |_| {})
    }

    /// [`send_and_confirm`](Self::send_and_confirm), reporting sync progress
    /// while waiting for the confirmation block
    pub fn send_and_confirm_with_progress<F, P>(
        &self,
        from_account_id: &str,
        amount: Decimal,
        to_address: &str,
        confirm: F,
        on_progress: P,
    ) -> Result<SendOutcome>
    where
        F: FnOnce(&PaymentPreview) -> bool,
        P: FnMut(&SyncProgress<'_>),
    {
        match self.submit(from_account_id, amount, to_address, confirm)? {
            SendOutcome::Sent { result, .. } => {
                let balance = self.poller.wait_for_sync_with_progress(
                    from_account_id,
                    Some(result.confirmation_block_index()),
                    on_progress,
                )?;
                Ok(SendOutcome::Sent {
                    result,
                    balance: Some(balance),
                })
            }
            SendOutcome::Cancelled => Ok(SendOutcome::Cancelled),
        }
    }

    /// Submit a payment without waiting for it to be observed
    pub fn submit<F>(
        &self,
        from_account_id: &str,
        amount: Decimal,
        to_address: &str,
        confirm: F,
    ) -> Result<SendOutcome>
    where
        F: FnOnce(&PaymentPreview) -> bool,
    {
        let preview = self.preview(from_account_id, amount, to_address)?;
        if !confirm(&preview) {
            return Ok(SendOutcome::Cancelled);
        }

        let result = self
            .gateway
            .build_and_submit_transaction(from_account_id, preview.amount_pmob, &preview.to_address)
            .map_err(|e| Error::SubmissionFailed(e.to_string()))?;

        Ok(SendOutcome::Sent {
            result,
            balance: None,
        })
    }

    /// Wait for another account (typically the recipient) to observe a transaction
    pub fn confirm_receipt(&self, account_id: &str, result: &TransactionResult) -> Result<Balance> {
        self.confirm_receipt_with_progress(account_id, result, |_| {})
    }

    pub fn confirm_receipt_with_progress<P>(
        &self,
        account_id: &str,
        result: &TransactionResult,
        on_progress: P,
    ) -> Result<Balance>
    where
        P: FnMut(&SyncProgress<'_>),
    {
        self.poller.wait_for_sync_with_progress(
            account_id,
            Some(result.confirmation_block_index()),
            on_progress,
        )
    }

    fn preview(&self, from_account_id: &str, amount: Decimal, to_address: &str) -> Result<PaymentPreview> {
        if amount <= Decimal::ZERO {
            return Err(Error::validation("Amount must be greater than zero"));
        }
        let amount_pmob = mob_to_pmob(amount)?;

        let to_address = to_address.trim();
        if to_address.is_empty() {
            return Err(Error::validation("Recipient address must not be empty"));
        }

        Ok(PaymentPreview {
            account_id: from_account_id.to_string(),
            to_address: to_address.to_string(),
            amount: amount.normalize(),
            amount_pmob,
        })
    }
}
