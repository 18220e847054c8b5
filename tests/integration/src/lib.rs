//! End-to-end test harness for the WS-Trust codec.
//!
//! The tests live under `tests/` and exercise `kc-protocol-wstrust` only
//! through its public API.
