//! MCP tool server for one Salesforce org.
//!
//! Wraps a shared [`salesforce_client::SalesforceClient`] in ten MCP tools
//! covering object discovery, schema description, SOQL queries and record
//! CRUD, served over streamable HTTP or stdio.

pub mod server;
pub mod tools;

pub use server::SalesforceMcpServer;
