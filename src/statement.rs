//! Period bill statement assembled from account bills.

use std::fmt;

use serde::Serialize;

use crate::accounts::{UtilityAccount, UtilityKind};
use crate::address::Address;
use crate::error::Result;

/// One account's bill for the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillLine {
    /// Service address.
    pub address: Address,
    /// Utility billed.
    pub utility: UtilityKind,
    /// Plan or supply strategy tag.
    pub plan: String,
    /// Usage in the utility's unit.
    pub usage: f64,
    /// Local generation (electricity only).
    pub generation: Option<f64>,
    /// Signed amount: positive charge, negative credit.
    pub amount: f64,
}

impl BillLine {
    /// Captures an account's current totals and bill.
    ///
    /// # Errors
    ///
    /// Propagates the account's `calculate_bill` error.
    pub fn from_account(account: &dyn UtilityAccount) -> Result<Self> {
        Ok(Self {
            address: account.address().clone(),
            utility: account.kind(),
            plan: account.plan_label(),
            usage: account.period_usage(),
            generation: account.period_generation(),
            amount: account.calculate_bill()?,
        })
    }

    /// Whether this line credits the customer.
    pub fn is_credit(&self) -> bool {
        self.amount < 0.0
    }
}

/// Headline totals of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatementSummary {
    /// Number of bill lines.
    pub line_count: usize,
    /// Sum of positive amounts.
    pub total_charges: f64,
    /// Sum of credit magnitudes (non-negative).
    pub total_credits: f64,
    /// Charges minus credits.
    pub net_total: f64,
}

/// Bill lines for every account billed in a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillStatement {
    lines: Vec<BillLine>,
}

impl BillStatement {
    /// Builds a statement from pre-computed lines.
    pub fn from_lines(lines: Vec<BillLine>) -> Self {
        Self { lines }
    }

    /// Appends a line.
    pub fn push(&mut self, line: BillLine) {
        self.lines.push(line);
    }

    /// All lines in billing order.
    pub fn lines(&self) -> &[BillLine] {
        &self.lines
    }

    /// Lines for one utility kind.
    pub fn lines_for(&self, utility: UtilityKind) -> impl Iterator<Item = &BillLine> {
        self.lines.iter().filter(move |l| l.utility == utility)
    }

    /// Sum of all positive amounts.
    pub fn total_charges(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).filter(|a| *a > 0.0).sum()
    }

    /// Sum of credit magnitudes.
    pub fn total_credits(&self) -> f64 {
        self.lines
            .iter()
            .filter(|l| l.is_credit())
            .map(|l| l.amount.abs())
            .sum()
    }

    /// Signed total across all lines.
    pub fn net_total(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Headline totals.
    pub fn summary(&self) -> StatementSummary {
        StatementSummary {
            line_count: self.lines.len(),
            total_charges: self.total_charges(),
            total_credits: self.total_credits(),
            net_total: self.net_total(),
        }
    }
}

impl fmt::Display for BillStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Bill Statement ---")?;
        for l in &self.lines {
            write!(
                f,
                "{:<32} {:<12} {:<26} {:>10.2} {:<3}",
                l.address.to_string(),
                l.utility,
                l.plan,
                l.usage,
                l.utility.unit()
            )?;
            if let Some(g) = l.generation {
                write!(f, " (gen {g:.2})")?;
            }
            writeln!(f, " {:>10.2}", l.amount)?;
        }
        writeln!(f, "Total charges:   {:.2}", self.total_charges())?;
        writeln!(f, "Total credits:   {:.2}", self.total_credits())?;
        write!(f, "Net total:       {:.2}", self.net_total())
    }
}
