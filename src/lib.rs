//! Library crate for user-center-tui.
//!
//! This crate exposes the building blocks of the console:
//! - Backend client and wire types (`api`)
//! - Application state, config files and the update loop (`app`)
//! - Error and result types (`error`)
//! - Form drafts and modal state machines (`form`)
//! - The user record and its display helpers (`model`)
//! - Screen view-models driven by key presses (`screens`)
//! - The signed-in user context (`session`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `user-center-tui` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod error;
pub mod form;
pub mod model;
pub mod screens;
pub mod session;
pub mod ui;

/// Convenient error and result types shared across the crate.
pub use error::{ApiError, ApiResult};
