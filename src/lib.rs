//! Installs the form-1 field mapping of the Gravity Forms Siren Autocomplete
//! plugin on a remote WordPress site and reports on its configuration, by
//! running WP-CLI over SSH.

pub mod auth;
pub mod config;
pub mod error;
pub mod executor;
pub mod form_mapping;
pub mod installer;
pub mod models;
pub mod report;
pub mod security;
pub mod ssh_client;
pub mod wp_cli;
