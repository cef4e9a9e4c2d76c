//! Diagnostic probe for how Linux bridges treat the hardware addresses of their ports.
//!
//! Creates the TAP interfaces `nltest_tp0` and `nltest_tp1` and the bridge `nltest_br0`,
//! joins both interfaces to the bridge and reports duplicate or changing MAC addresses.
//! Requires `CAP_NET_ADMIN`.

pub mod service;

pub use service::probe::{run, ProbeSummary};
