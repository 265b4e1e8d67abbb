//! recalc-engine - formula evaluation over snapshot grids.
//!
//! Two evaluation layers share one cell store:
//!
//! - the *precise* path preprocesses a formula into a Rhai script and runs it
//!   against registered spreadsheet builtins ([`engine`], [`builtins`]);
//! - the *fallback* path recognizes a bounded set of formula shapes and
//!   dispatches them onto the statistics library directly ([`fallback`],
//!   [`stats`]).

pub mod builtins;
pub mod engine;
pub mod fallback;
pub mod stats;
