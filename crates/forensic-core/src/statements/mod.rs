//! Raw statement intake: year-indexing, the three-way inner join and the
//! mapping of provider labels onto the canonical schema.

pub mod normalizer;
pub mod raw;

pub use normalizer::{normalize, resolve_column, AliasTable, CanonicalField, StatementRecord};
pub use raw::{merge_statements, FinancialStatements, LineItems, MergedRow, MergedStatements, StatementPeriod};
