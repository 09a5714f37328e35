//! Groundwire Balance Adapter Library
//!
//! Serves the balance checker of the Groundwire softphone from a VoIP.ms account:
//! the caller is admitted, the balance is fetched from the VoIP.ms REST API and
//! reshaped into the JSON contract Groundwire expects.
//!
//! # Modules
//!
//! - `integrations`: External service integrations.
//! - `auth`: Client signature and bearer token checks.
//! - `balance_client`: VoIP.ms `getBalance` client.
//! - `config`: Configuration management.
//! - `errors`: Error taxonomy and HTTP mapping.
//! - `formatter`: Success and error wire responses.
//! - `handlers`: HTTP handlers and router.
//! - `ip_resolver`: Outbound address lookup for diagnostics.
//! - `models`: Request, upstream and response data models.

pub mod integrations;

pub mod auth;
pub mod balance_client;
pub mod config;
pub mod errors;
pub mod formatter;
pub mod handlers;
pub mod ip_resolver;
pub mod models;
