#![doc = "The `todohub` library crate."]
#![doc = ""]
#![doc = "Core business logic for a multi-user todo service: account management"]
#![doc = "with JWT sessions, owner-scoped category and todo stores with derived"]
#![doc = "views (search, completion, due-date windows, statistics), the REST"]
#![doc = "routing configuration, and the shared error taxonomy. The binary in"]
#![doc = "`main.rs` wires these parts into a running server; the integration"]
#![doc = "tests wire them into an in-memory one."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
