//! Database models split into domain-specific modules.

pub mod common;
pub mod expenditure;
pub mod funding_source;
pub mod grant;
pub mod receipt;
pub mod report;

pub use common::*;
pub use expenditure::*;
pub use funding_source::*;
pub use grant::*;
pub use receipt::*;
pub use report::*;
