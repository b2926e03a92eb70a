//! Library exports for stockdesk, shared between the binary and tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod render;
pub mod screens;
pub mod session;
pub mod startup;
pub mod state;
pub mod utils;
