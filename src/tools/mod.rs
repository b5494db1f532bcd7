//! Tool handlers served by the MCP servers in this crate.
//!
//! - `stock` - company lookup, company listing and random stock quotes
//! - `employee` - fixed employee salary information

pub mod employee;
pub mod stock;

pub use employee::EmployeeTools;
pub use stock::{Company, Stock, StockTools};
