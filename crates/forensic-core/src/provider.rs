//! Statement provider seam.
//!
//! The market-data vendor lives outside this crate. Anything that can hand
//! back a [`FinancialStatements`] for a ticker implements
//! [`StatementProvider`]; a failure there ends the run before any scoring.

use std::collections::HashMap;

use crate::error::ForensicError;
use crate::statements::FinancialStatements;
use crate::ForensicResult;

pub trait StatementProvider {
    fn fetch(&self, ticker: &str) -> ForensicResult<FinancialStatements>;
}

/// Provider backed by statements already in memory, keyed by upper-cased ticker.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    statements: HashMap<String, FinancialStatements>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, statements: FinancialStatements) {
        self.statements
            .insert(statements.ticker.trim().to_uppercase(), statements);
    }

    pub fn with(mut self, statements: FinancialStatements) -> Self {
        self.insert(statements);
        self
    }
}

impl StatementProvider for InMemoryProvider {
    fn fetch(&self, ticker: &str) -> ForensicResult<FinancialStatements> {
        self.statements
            .get(&ticker.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| ForensicError::FetchError {
                ticker: ticker.to_string(),
                reason: "no statements available".into(),
            })
    }
}
