//! Manager scope definitions.

/// Scope of a registry-managed instance, controlling caching behavior.
///
/// # Examples
///
/// ```rust
/// use plugin_bootstrap::{ManagerOptions, ManagerScope};
///
/// // Default marker options: lazy singleton
/// let opts = ManagerOptions::DEFAULT;
/// assert_eq!(opts.scope, ManagerScope::Singleton);
///
/// // Prototype services are rebuilt on every resolution
/// let opts = ManagerOptions::DEFAULT.prototype();
/// assert_eq!(opts.scope, ManagerScope::Prototype);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerScope {
    /// Single instance per registry, cached for the registry's lifetime.
    ///
    /// Singleton managers are constructed once when first requested and
    /// shared through `Arc` by everything that injects them.
    Singleton,
    /// New instance per resolution, never cached.
    ///
    /// Prototype managers are constructed, wired, and activated fresh on
    /// every resolution. Two resolutions never share state.
    Prototype,
}
