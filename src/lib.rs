pub mod check;
pub mod config;
pub mod host;
pub mod lsp;
pub mod parser;
pub mod version;
