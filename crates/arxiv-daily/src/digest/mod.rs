//! Daily digest of newly dated papers.
//!
//! The digest covers the rows whose publish date is the day before the run.
//! Delivery goes through the `notify` crate and never fails the run.

mod generator;
mod sender;
mod window;

pub use generator::DigestGenerator;
pub use sender::{DigestOutcome, DigestSender};
pub use window::{yesterday, DigestWindow};
