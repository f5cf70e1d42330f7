//! # Connect Four
//!
//! Connect Four (6×7 board, four in a row) with two modes: two humans at one
//! terminal, or human versus a remote AI reached over HTTP. The rules engine
//! and turn sequencing live in the library; the terminal front end only
//! renders state and forwards input.
//!
//! ## Modules
//!
//! - [`game`] — Board representation, move legality, win/draw detection
//! - [`session`] — Game sessions, turn sequencing, two-phase remote-move flow
//! - [`ai`] — Move-provider contract and the HTTP client for the move service
//! - [`config`] — TOML configuration loading and validation
//! - [`ui`] — Terminal UI built with Ratatui
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod ui;
