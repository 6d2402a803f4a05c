//! wmforge Command Engine
//!
//! Compiles an [`EditSettings`](wmforge_edit_model::EditSettings) value into
//! ffmpeg text. Nothing here performs I/O or runs ffmpeg; every function is a
//! pure mapping from settings to strings.
//!
//! # Pipeline Architecture
//!
//! ```text
//! EditSettings
//!      │
//!      ├── filter_graph   wm prep ─► overlay ─► [speed] ─► [crop] ─► [scale]
//!      │                                        (label threaded through)
//!      ▼
//! command          ffmpeg [-ss] [-t] -i %INPUT% -i wm -filter_complex ... %OUTPUT%
//!      │
//!      ▼
//! script           single command │ Windows .bat loop │ POSIX .sh loop
//!      │
//!      ▼
//!    text
//! ```

pub mod command;
pub mod compile;
pub mod filter_graph;
pub mod script;

pub use command::*;
pub use compile::*;
pub use filter_graph::*;
pub use script::*;
