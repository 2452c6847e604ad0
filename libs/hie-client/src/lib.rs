//! Remote data service clients
//!
//! The admin core talks to two services with the same interface shape: the
//! clinical-entity repository and the administrative-metadata service. Both
//! are reached through the [`DataServiceClient`] trait, which works on
//! resource type names and JSON payloads; the [`typed`] helpers turn those
//! into model structs.
//!
//! # Example
//!
//! ```rust,no_run
//! use hie_client::{typed, HttpDataServiceClient, Query};
//! use hie_models::AssigningAuthority;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpDataServiceClient::new("https://hie.example.org/ami")?;
//! let mut bundle = typed::query_as::<AssigningAuthority>(
//!     &client,
//!     &Query::new().filter("domainName", "NHID"),
//! )
//! .await?;
//! bundle.reconstitute();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod typed;

pub use client::DataServiceClient;
pub use error::{Error, Result};
pub use http::HttpDataServiceClient;
pub use query::Query;

// Re-export model types used in the client interface
pub use hie_models::Bundle;
