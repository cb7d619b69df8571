//! Backend for the University Week score tabulation system.
//!
//! All of the business rules (accounts, campuses, events, awards and the
//! ranking summaries) live in stored procedures inside the MySQL database.
//! This crate exposes them to the browser through a single RPC endpoint
//! (see [`rpc`]), relays one-time passwords over SMTP (see [`email`]) and
//! provides typed helpers for decoding what the procedures return
//! (see [`client`], [`model`] and [`procedures`]).

pub mod client;
pub mod config;
pub mod email;
pub mod model;
pub mod permission;
pub mod procedures;
pub mod rpc;
pub mod settings;
pub mod standings;
pub mod state;
pub mod util_resp;

#[cfg(test)]
mod test;
