//! Codespeed results server library.
//!
//! This library provides the core functionality for the results server:
//! authentication of submitters, result ingestion, report generation and
//! the HTTP API around them.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
