// ABOUTME: Quoordinates bot library: HTTP gateway, platform transport, and collaborators
// ABOUTME: Orchestration logic lives in quoordinates-core

pub mod app;
pub mod books;
pub mod commands;
pub mod gateway;
pub mod openai;
pub mod platform;
pub mod quote_search;

pub use quoordinates_core::{config, metrics, paths};
