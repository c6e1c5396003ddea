//! Common test utilities and helpers
//!
//! Shared fakes and fixtures for the integration suites.
#![allow(dead_code)]

pub mod mock_services;
pub mod test_fixtures;
