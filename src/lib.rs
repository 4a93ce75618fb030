//! Vitrine Library
//!
//! Core of a touchscreen product kiosk: scanning a folder tree into a
//! catalog, the navigation, idle and session state machines, the assistant
//! panel, and the HTTP API that drives the frontend.

// Module declarations
pub mod branding;
pub mod cli;
pub mod config;
pub mod constants;
pub mod doctor;
pub mod kiosk;
pub mod models;
pub mod scanner;
pub mod services;

#[cfg(feature = "web")]
pub mod web;
