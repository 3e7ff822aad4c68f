pub mod balance;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod fetch;
pub mod history;
pub mod markets;
pub mod normalize;
pub mod positions;
pub mod routes;
pub mod server;
pub mod stats;
pub mod types;
