//! Thin Salesforce REST client.
//!
//! This crate exposes a single entry point, [`SalesforceClient::invoke`],
//! which accepts a [`SalesforceRequest`] and forwards it to the Salesforce
//! REST API of one org. Authentication uses the SOAP username + password +
//! security-token login; the resulting session id is cached in memory and
//! refreshed once when Salesforce reports an invalid session.
//!
//! The request shape (an `operation` discriminant plus operation-specific
//! fields) mirrors the wire format consumed by the org, so callers build
//! requests declaratively and receive the raw JSON response back.

pub mod auth;
pub mod client;
pub mod error;
pub mod request;

pub use client::{SalesforceClient, SalesforceConfig};
pub use error::SalesforceError;
pub use request::SalesforceRequest;
