#![doc = "The `taskdesk` library crate."]
#![doc = ""]
#![doc = "Accounts with cookie-carried session tokens, per-user task lists with sorting,"]
#![doc = "filtering and search, and a confirm-before-delete flow. The binary (`main.rs`)"]
#![doc = "reads the configuration, prepares the database and serves `routes::config`."]

pub mod auth;
pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
