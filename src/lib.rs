#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
// The ultimate strictness: catches things like missing documentation or overflow risks
#![warn(clippy::restriction)]
pub mod core;

pub use crate::core::alerts::engine::AlertEngine;
pub use crate::core::alerts::model::{Alert, AlertPolicy, AlertType, Severity};
pub use crate::core::config::{ConfigManager, Settings};
pub use crate::core::dispatch::{
    DispatchConfig, Dispatcher, NotificationPayload, NotificationSink, SinkError,
};
pub use crate::core::model::InventoryItem;
pub use crate::core::rbac::{resolve, Capability, Role};
pub use crate::core::session::{run_poll_loop, InventorySource, Session, SourceError};
