// --- File: crates/slotbook_gcal/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;
#[cfg(test)]
mod routes_test;
pub mod service;
