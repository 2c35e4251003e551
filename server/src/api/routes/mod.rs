//! HTTP route handlers

pub mod chat;
pub mod files;
pub mod models;
