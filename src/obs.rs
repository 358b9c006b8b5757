//! Optional observability helpers for token issuance and catalog calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `catalog_auth.op` with the `op` (operation)
//!   and `stage` (call site) fields, plus events when the cached token is replaced.
//! - Enable `metrics` to increment the `catalog_auth_operation_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Signing a new developer token.
	TokenIssue,
	/// Authenticated request sent through the bearer transport.
	AuthenticatedRequest,
	/// Catalog album search.
	CatalogSearch,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::TokenIssue => "token_issue",
			OperationKind::AuthenticatedRequest => "authenticated_request",
			OperationKind::CatalogSearch => "catalog_search",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
