//! Keyboard-driven command menus: a declarative layout of prefixes,
//! suffixes and infixes, compiled once and instantiated per invocation, with
//! a session that routes keys, keeps a stack of suspended menus and
//! persists values, history and levels.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod incompat;
pub mod instance;
pub mod key;
pub mod layout;
pub mod literal;
pub mod model;
pub mod object;
pub mod registry;
pub mod render;
pub mod stack;
pub mod store;
pub mod tui;

pub use config::EngineConfig;
pub use dispatch::{Behavior, Session, State};
pub use error::{MenuError, Result};
pub use host::{Action, Host, ReadRequest};
pub use model::Arg;
pub use registry::Registry;
pub use store::Store;
