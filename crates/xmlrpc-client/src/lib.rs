//! XML-RPC client.
//!
//! Wraps the `xmlrpc-core` codec with a transport and the call helpers used
//! against ERP-style `common`/`object` endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use xmlrpc_client::{ClientConfig, Value, XmlRpcClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://erp.example.com/xmlrpc/2/common")?
//!     .with_database("mydb");
//! let client = XmlRpcClient::new(config)?;
//!
//! let uid = client.authenticate("admin", "secret").await?;
//! println!("logged in as {:?}", uid.as_i64());
//!
//! let names = client
//!     .execute_kw(
//!         uid.as_i64().unwrap_or_default(),
//!         "secret",
//!         "res.partner",
//!         "search_read",
//!         Value::from(vec![Value::Array(vec![])]),
//!         Value::structure([("fields", Value::from(vec!["name"]))]),
//!     )
//!     .await?;
//! println!("{names:?}");
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod transport;

pub use client::XmlRpcClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientErrorCode, ClientResult};
pub use transport::{BoxFuture, HttpTransport, Transport};

pub use xmlrpc_core::{MethodResult, Value};
