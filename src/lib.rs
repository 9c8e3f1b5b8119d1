//! # plugin-bootstrap
//!
//! Marker-driven dependency injection and auto-registration for
//! game-server plugins.
//!
//! ## Features
//!
//! - **Scoped manager registry**: singleton and prototype managers with a
//!   three-phase lifecycle (construct, wire, activate)
//! - **Circular wiring detection**: fails fast with the full resolution
//!   path instead of handing out half-wired instances
//! - **Command auto-registration**: scan command and tab-completer marker
//!   classes and bind them into the host's dispatch table, with
//!   `%command%` attribute templating
//! - **Listener auto-registration**: scan, construct, wire, and hand
//!   listeners to the host's event bus
//! - **Pluggable discovery**: an explicit [`ClassIndex`] or the link-time
//!   [`LinkedClasses`] registry fed by the `submit_*!` macros
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use plugin_bootstrap::{
//!     ClassIndex, HostInstance, Managed, Manager, ManagerRegistry, RegResult,
//! };
//! # use plugin_bootstrap::{CommandMap, EventBus, HostPlugin, Listener};
//! # struct Bus;
//! # impl EventBus for Bus {
//! #     fn register(&self, _l: Arc<dyn Listener>) {}
//! # }
//! # struct MyPlugin { bus: Bus }
//! # impl HostPlugin for MyPlugin {
//! #     fn name(&self) -> &str { "MyPlugin" }
//! #     fn command_map(&self) -> Option<&dyn CommandMap> { None }
//! #     fn event_bus(&self) -> &dyn EventBus { &self.bus }
//! # }
//!
//! // A manager with an injected dependency and a post-construct hook.
//! struct ConfigManager {
//!     prefix: String,
//! }
//!
//! impl Managed for ConfigManager {
//!     fn construct(_host: &HostInstance) -> RegResult<Self> {
//!         Ok(ConfigManager { prefix: "[plugin] ".to_string() })
//!     }
//! }
//!
//! impl Manager for ConfigManager {}
//!
//! struct ChatManager {
//!     config: Option<Arc<ConfigManager>>,
//! }
//!
//! impl Managed for ChatManager {
//!     fn construct(_host: &HostInstance) -> RegResult<Self> {
//!         Ok(ChatManager { config: None })
//!     }
//!
//!     fn wire(&mut self, registry: &ManagerRegistry) -> RegResult<()> {
//!         self.config = Some(registry.get_or_create::<ConfigManager>()?);
//!         Ok(())
//!     }
//! }
//!
//! impl Manager for ChatManager {}
//!
//! let mut index = ClassIndex::new();
//! index.manager::<ConfigManager>().manager::<ChatManager>();
//!
//! let host = HostInstance::new(Arc::new(MyPlugin { bus: Bus }));
//! let registry = ManagerRegistry::builder(host).scanner(&index).build();
//!
//! let chat = registry.get_or_create::<ChatManager>().unwrap();
//! assert_eq!(chat.config.as_ref().unwrap().prefix, "[plugin] ");
//! ```
//!
//! ## Manager Scopes
//!
//! - **Singleton**: constructed once per registry and shared through `Arc`
//! - **Prototype**: constructed fresh on every resolution, never cached
//!
//! ## Auto-Registration
//!
//! [`AutoCommandRegistrar`] and [`AutoEventRegistrar`] drive the command
//! and listener scans at startup. Per-class failures are logged and
//! skipped, so one broken class never blocks the rest of the plugin; the
//! sorted name lists they return feed the startup report.

pub mod commands;
pub mod error;
pub mod events;
pub mod host;
pub mod lifecycle;
pub mod markers;
pub mod registry;
pub mod scanner;
pub mod scope;

// Re-exported for the `submit_*!` macros.
pub use linkme;

pub use commands::{AutoCommandRegistrar, RegisterableCommand};
pub use error::{RegResult, RegistryError};
pub use events::AutoEventRegistrar;
pub use host::{
    CommandBinding, CommandExecutor, CommandMap, CommandSender, EventBus, HostInstance,
    HostPlugin, Listener, TabCompleter,
};
pub use lifecycle::Managed;
pub use markers::{
    AutoCommand, AutoListener, AutoTabCompleter, CommandMarker, ListenerMarker, Manager,
    ManagerOptions, TabCompleterMarker,
};
pub use registry::{ManagerRegistry, ManagerRegistryBuilder};
pub use scanner::{
    BuiltCommand, ClassIndex, ClassScanner, CommandClass, CompleterClass, LinkedClasses,
    ListenerClass, ManagedClass,
};
pub use scope::ManagerScope;
