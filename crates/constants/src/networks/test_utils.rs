//! Constants for tests.

#[cfg(any(test, feature = "test-utils"))]
use crate::SnowyConstants;

/// Name of the test network.
pub const NAME: &str = "test";
/// Cluster endpoint used in tests. Nothing listens here.
pub const CLUSTER_URL: &str = "http://127.0.0.1:1";
/// Program identifier used in tests: 32 bytes of `0x07`.
pub const PROGRAM_ID: &str = "US517G5965aydkZ46HS38QLi7UQiSojurfbQfKCELFx";

/// Snowy constants for tests.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST: SnowyConstants =
    SnowyConstants::new(crate::KnownNetworks::Test, CLUSTER_URL, PROGRAM_ID);
