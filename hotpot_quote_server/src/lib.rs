//! # Hotpot quote server
//! This module hosts the HTTP front end for hotpot quote confirmations. It is responsible for:
//! Receiving quote submissions from the ordering page.
//! Handing them to the [`hotpot_quote_engine::QuoteFlowApi`] for validation, export and logging.
//! Serving previously generated spreadsheet exports.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /api/hotpot-quote`: Submit a quote.
//! * `GET /api/hotpot-quote/{id}/excel`: Download the spreadsheet for a quote.
//!
//! Every response carries permissive CORS headers, and `OPTIONS` requests to any path are answered with an empty 200.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
