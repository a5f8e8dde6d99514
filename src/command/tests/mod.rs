//! Unit tests for the command module.
//!
//! Tests are organised by component, covering declaration rules, wire
//! formats, registry resolution, option decoding, the response protocol,
//! synchronization, dispatch, and the in-memory platform.

mod dispatcher_tests;
mod support;
