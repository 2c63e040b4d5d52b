// Copyright 2025 Loadstone Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Loadstone - reference-counted asset loading
//!
//! Resolves paths and synthetic ids to typed handles, decodes on background
//! tasks, coalesces duplicate loads, and reclaims unreferenced assets at
//! safe points in the host's tick loop.
//!
//! # Tick integration
//!
//! Once per tick, in this order, before anything reads the maps:
//!
//! ```no_run
//! # use loadstone::prelude::*;
//! # struct Sprite;
//! # let server = AssetServer::from_settings(&AssetServerSettings::default());
//! # let mut sprites: Assets<Sprite> = server.register_asset_type();
//! # let mut sprite_events = Events::new();
//! server.update_asset_ref_count();
//! server.update_assets(&mut sprites); // once per registered type
//! sprites.update_events(&mut sprite_events);
//! ```

pub mod assets;
pub mod error;
pub mod events;
pub mod handle;
pub mod handle_id;
pub mod io;
pub mod loader;
pub mod prelude;
pub mod ref_change;
pub mod server;
pub mod task_pool;

pub use assets::*;
pub use error::*;
pub use events::*;
pub use handle::*;
pub use handle_id::*;
pub use io::*;
pub use loader::*;
pub use ref_change::*;
pub use server::*;
pub use task_pool::*;

/// Anything storable as an asset: sent across the loader thread boundary
/// and shared behind the server's tables
pub trait Asset: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Asset for T {}
