//! All accounts held at one service address.

use std::io;

use crate::accounts::{SupplyStatus, UtilityAccount, UtilityKind};
use crate::address::Address;
use crate::error::Result;
use crate::statement::BillLine;

/// Heterogeneous set of accounts billed together for one address.
#[derive(Debug)]
pub struct ServicePortfolio {
    address: Address,
    accounts: Vec<Box<dyn UtilityAccount>>,
}

impl ServicePortfolio {
    /// Creates an empty portfolio for `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            accounts: Vec::new(),
        }
    }

    /// Service address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Adds an account.
    pub fn push(&mut self, account: Box<dyn UtilityAccount>) {
        self.accounts.push(account);
    }

    /// Accounts in insertion order.
    pub fn accounts(&self) -> &[Box<dyn UtilityAccount>] {
        &self.accounts
    }

    /// First account of the given kind, if any.
    pub fn account(&self, kind: UtilityKind) -> Option<&dyn UtilityAccount> {
        self.accounts
            .iter()
            .find(|a| a.kind() == kind)
            .map(|a| a.as_ref())
    }

    /// One bill line per account.
    ///
    /// # Errors
    ///
    /// Returns the first account billing error.
    pub fn bill_lines(&self) -> Result<Vec<BillLine>> {
        self.accounts
            .iter()
            .map(|a| BillLine::from_account(a.as_ref()))
            .collect()
    }

    /// Signed total of every account's bill.
    ///
    /// # Errors
    ///
    /// Returns the first account billing error.
    pub fn total_bill(&self) -> Result<f64> {
        self.accounts.iter().map(|a| a.calculate_bill()).sum()
    }

    /// Polls every account's supply status.
    pub fn supply_all(&self) -> Vec<(UtilityKind, SupplyStatus)> {
        self.accounts.iter().map(|a| (a.kind(), a.supply())).collect()
    }

    /// Writes every account's status block to `out`.
    ///
    /// # Errors
    ///
    /// Propagates sink I/O errors.
    pub fn show_status(&self, out: &mut dyn io::Write) -> io::Result<()> {
        for account in &self.accounts {
            account.show_status(out)?;
        }
        Ok(())
    }
}
