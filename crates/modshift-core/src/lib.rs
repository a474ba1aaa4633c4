//! Core infrastructure for modshift.
//!
//! This crate provides the language-agnostic pieces of a module move:
//! - Byte spans and the batch span editor that regenerates source text
//! - Specifier classification and path canonicalization
//! - Rewrite options shared by language adapters
//! - Error types and error codes
//! - Text position utilities

pub mod config;
pub mod edit;
pub mod error;
pub mod span;
pub mod specifier;
pub mod text;
