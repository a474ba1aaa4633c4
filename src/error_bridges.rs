//! Error bridge implementations for language-specific errors.
//!
//! This module provides `impl From<X> for ModshiftError` conversions from the
//! JavaScript adapter's error types to the unified `ModshiftError` type.
//!
//! These bridges live in the root crate rather than `modshift-core` because
//! they depend on adapter types that are not part of core.

// The `From` impls themselves live in `modshift-js` (crates/modshift-js/src/error.rs):
// the orphan rule forbids implementing a foreign trait for two foreign types here.
