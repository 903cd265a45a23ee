//! # Router
//!
//! Routing and delegated execution.
//!
//! - `dispatch`: selector resolution, authorization, facet execution
//! - `journal`: staged writes for one invocation
//! - `context`: the handle a facet runs against
//! - `proxy`: the proxy aggregate that owns committed state

pub mod context;
pub mod dispatch;
pub mod journal;
pub mod proxy;

pub use context::ProxyContext;
pub use dispatch::{DispatchEngine, Dispatched};
pub use journal::StateJournal;
pub use proxy::SelectorProxy;
