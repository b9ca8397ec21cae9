//! # orca-tools
//!
//! Tool catalogs backing the engine's `ToolRegistry` and `ToolExecutor`
//! contracts. [`LocalToolCatalog`] serves in-process [`ToolHandler`]s and can
//! fall through to a remote catalog; [`RemoteToolService`] talks to an HTTP
//! tool-dispatch service.

pub mod builtin;
pub mod catalog;
pub mod handler;
pub mod remote;

pub use builtin::KvStoreTool;
pub use catalog::LocalToolCatalog;
pub use handler::ToolHandler;
pub use remote::RemoteToolService;
