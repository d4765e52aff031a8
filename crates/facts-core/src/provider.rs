//! Provider trait for fetching fact repositories.
//!
//! [`FactSource`] is the boundary between fact retrieval and derivation:
//! implementations resolve a ticker and return an already-parsed
//! [`CompanyFacts`] repository. Derivation code never calls a source.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{CompanyFacts, Symbol},
};

/// Source of disclosed company facts.
///
/// Implementations own ticker resolution, transport, and parsing. Errors
/// such as an unknown ticker or a failed download are reported here and
/// never surface inside a derivation.
#[async_trait]
pub trait FactSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Returns a description of this source.
    fn description(&self) -> &str;

    /// Fetches the fact repository for a symbol.
    ///
    /// Returns [`DataError::SymbolNotFound`](crate::DataError::SymbolNotFound)
    /// when the ticker cannot be resolved.
    async fn company_facts(&self, symbol: &Symbol) -> Result<CompanyFacts>;
}
