// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! [`Source`] is the read-only document view every adapter implements, and
//! [`SourceProvider`] turns raw documents into sources. The read surface
//! handed to lazy items lives in the domain as
//! [`ConfigGetter`](crate::domain::ConfigGetter).

pub mod provider;
pub mod source;

// Re-export commonly used types
pub use provider::SourceProvider;
pub use source::{wrong_type, Source};
