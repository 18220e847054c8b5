//! End-to-End Integration Tests
//!
//! These tests drive the WS-Trust codec through its public API only, with a
//! toy ticket token standing in for real token types.

mod common;
mod claims;
mod end_to_end;
mod key_material;
mod responses;
mod roundtrip;
mod validation;
