//! Short-link manager on top of a key-value table.
//!
//! Two surfaces share one store: a Basic-auth protected admin page and a
//! Telegram bot webhook that creates links through a short dialog.

pub mod admin;
pub mod auth;
pub mod config;
pub mod conversation;
pub mod handler;
pub mod html;
pub mod model;
pub mod store;
pub mod telegram;
pub mod util;
pub mod webhook;
