//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::accounts::UtilityKind;
use crate::statement::{BillStatement, StatementSummary};

/// Optional filter for the bills endpoint.
#[derive(Debug, Deserialize)]
pub struct BillsQuery {
    /// Utility name (`electricity`, `gas`, `water`, `internet`).
    pub utility: Option<String>,
}

/// Net amount billed for one utility.
#[derive(Debug, Serialize)]
pub struct UtilityTotal {
    /// Utility kind.
    pub utility: UtilityKind,
    /// Number of accounts billed.
    pub lines: usize,
    /// Signed total for the utility.
    pub net_total: f64,
}

/// Statement totals plus a per-utility breakdown.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Headline totals.
    #[serde(flatten)]
    pub totals: StatementSummary,
    /// One entry per utility kind with at least one line.
    pub by_utility: Vec<UtilityTotal>,
}

impl From<&BillStatement> for SummaryResponse {
    fn from(st: &BillStatement) -> Self {
        let by_utility = UtilityKind::ALL
            .into_iter()
            .filter_map(|utility| {
                let lines: Vec<f64> = st.lines_for(utility).map(|l| l.amount).collect();
                (!lines.is_empty()).then(|| UtilityTotal {
                    utility,
                    lines: lines.len(),
                    net_total: lines.iter().sum(),
                })
            })
            .collect();
        Self {
            totals: st.summary(),
            by_utility,
        }
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::statement::BillLine;

    fn line(utility: UtilityKind, amount: f64) -> BillLine {
        BillLine {
            address: Address::new("2 Api Rd", "Rest", "80008"),
            utility,
            plan: "p".to_string(),
            usage: 0.0,
            generation: None,
            amount,
        }
    }

    #[test]
    fn summary_groups_by_utility() {
        let st = BillStatement::from_lines(vec![
            line(UtilityKind::Gas, 10.0),
            line(UtilityKind::Electricity, -4.0),
            line(UtilityKind::Gas, 5.0),
        ]);
        let s = SummaryResponse::from(&st);
        assert_eq!(s.totals.line_count, 3);
        assert_eq!(s.by_utility.len(), 2);
        assert_eq!(s.by_utility[0].utility, UtilityKind::Electricity);
        assert_eq!(s.by_utility[1].net_total, 15.0);
    }
}
