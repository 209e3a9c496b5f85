//! Logging facilities for Horizon Adapter.
//!
//! Horizon Adapter uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_adapter=debug,horizon_adapter_core=info")
//!         .init();
//! }
//! ```
//!
//! Levels follow one convention across the workspace:
//!
//! - `trace`: every emitted or forwarded change notification
//! - `debug`: structural changes (pieces merged, offsets recomputed, adapters
//!   bound, holder cache misses)
//! - `warn`: recoverable oddities, such as a forwarded event from a piece that
//!   is no longer registered

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_adapter_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_adapter_core::signal";
    /// Change notifier target.
    pub const NOTIFIER: &str = "horizon_adapter_core::notifier";
    /// Transaction gate target.
    pub const TRANSACTION: &str = "horizon_adapter_core::transaction";
    /// UI-thread dispatcher target.
    pub const DISPATCH: &str = "horizon_adapter_core::dispatch";
    /// Observable list target.
    pub const LIST: &str = "horizon_adapter::list";
    /// Framed (header/body/footer) adapter target.
    pub const FRAMED: &str = "horizon_adapter::framed";
    /// Composite adapter target.
    pub const COMPOSITE: &str = "horizon_adapter::composite";
    /// Platform glue target (tag stores, holder recycling).
    pub const PLATFORM: &str = "horizon_adapter::platform";
}
