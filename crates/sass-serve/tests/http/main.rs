//! Integration tests for the stylesheet handler
//!
//! Each test starts its own server on an ephemeral port.

mod harness;

mod stylesheets;
