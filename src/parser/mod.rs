//! Parser layer
//! - traits.rs: Parser trait definition
//! - types.rs: Common types (PackageInfo, QuoteStyle)
//! - pnpm_workspace.rs: pnpm-workspace.yaml catalog parser

pub mod pnpm_workspace;
pub mod traits;
pub mod types;

pub use pnpm_workspace::PnpmWorkspaceParser;
pub use traits::{ParseError, Parser};
pub use types::{PackageInfo, QuoteStyle};
