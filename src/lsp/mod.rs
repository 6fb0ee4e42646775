//! LSP (Language Server Protocol) implementation layer
//!
//! This module handles communication with editors via LSP and provides
//! code lenses for catalog dependency versions.
//!
//! # Modules
//!
//! - [`backend`]: Main LSP backend implementing `LanguageServer` trait
//! - [`code_lens`]: Builds lenses and the update command from suggestions
//! - [`prefetch`]: Background metadata prefetch for opened documents
//! - [`server`]: LSP server initialization and logging

pub mod backend;
pub mod code_lens;
pub mod prefetch;
pub mod server;
