//! Polls API Library
//!
//! This library provides the core functionality for the Polls API: the
//! question/choice domain, account management, SQLite repositories and the
//! HTTP layer, including the bulk question update endpoint.

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
