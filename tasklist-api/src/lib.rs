//! # Tasklist API Library
//!
//! Request-side authentication pipeline for the tasklist service.
//!
//! ## Modules
//!
//! - `auth_service`: Registration, login and token authentication
//! - `envelope`: Success/failure response envelope
//! - `error`: Pipeline errors and envelope mapping
//! - `store`: User store trait and in-memory backend
//! - `telemetry`: Tracing subscriber setup

pub mod auth_service;
pub mod envelope;
pub mod error;
pub mod store;
pub mod telemetry;
