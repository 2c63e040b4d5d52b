//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use loadstone::prelude::*;
//! ```

pub use crate::assets::{AssetEvent, Assets};
pub use crate::error::AssetServerError;
pub use crate::events::Events;
pub use crate::handle::{Handle, UntypedHandle};
pub use crate::handle_id::HandleId;
pub use crate::io::{AssetIo, AssetIoError, AssetServerSettings, FileAssetIo};
pub use crate::loader::{AssetLoader, LoadedAsset};
pub use crate::server::{AssetServer, LoadState};
pub use crate::task_pool::TaskPool;
pub use crate::Asset;
