//! # Farm Advisor
//!
//! A small service that stores farm and market records in SQLite, serves
//! them over a JSON HTTP API, and composes per-farm advisories from stored
//! data, a local chat model, and web/image search links.
//!
//! ## Architecture
//!
//! ```text
//!  HTTP (axum) ──▶ validate ──▶ store ──▶ SQLite
//!       │                         ▲
//!       └──▶ advisor ─────────────┘
//!               ├──▶ chat   (Ollama /api/chat)
//!               └──▶ images (Unsplash search)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! farm-advisor init                  # create database
//! farm-advisor serve                 # start HTTP server
//! farm-advisor advise 1              # one advisory, printed as JSON
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Record and advisory types |
//! | [`error`] | Error types |
//! | [`validate`] | Type-level validation of uploads |
//! | [`store`] | Storage trait and SQLite implementation |
//! | [`chat`] | Chat model abstraction (Ollama) |
//! | [`images`] | Image search providers |
//! | [`advisor`] | Advisory composition |
//! | [`server`] | HTTP API |
//! | [`list`] | Record listing for the CLI |
//! | [`db`] | Database connection |
//! | [`migrate`] | Table creation |

pub mod advisor;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod list;
pub mod migrate;
pub mod models;
pub mod server;
pub mod store;
pub mod validate;
