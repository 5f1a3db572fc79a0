/// Verbosity requested from resources constructed by the pool.
///
/// The pool itself does not log through this setting; it is forwarded verbatim to every
/// constructor call so that resources backed by external libraries can configure their own
/// logging.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum LogLevel {
    /// Everything, including per-frame details.
    Debug,

    /// Informational messages and above.
    Info,

    /// Warnings and errors.
    Warn,

    /// Errors only. This is the default.
    #[default]
    Error,

    /// Nothing at all.
    None,
}

/// Pool-level configuration handed to every resource constructor.
///
/// # Example
///
/// ```
/// use keyed_pool::{KeyedPool, LogLevel};
///
/// let pool = KeyedPool::<String>::builder()
///     .device_id(1)
///     .log_level(LogLevel::Warn)
///     .build();
///
/// assert_eq!(pool.resource_config().device_id(), 1);
/// assert_eq!(pool.resource_config().log_level(), LogLevel::Warn);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResourceConfig {
    device_id: u16,
    log_level: LogLevel,
}

impl ResourceConfig {
    pub(crate) const fn new(device_id: u16, log_level: LogLevel) -> Self {
        Self {
            device_id,
            log_level,
        }
    }

    /// The device that resources should be bound to.
    #[must_use]
    pub const fn device_id(&self) -> u16 {
        self.device_id
    }

    /// The log verbosity that resources should use.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        self.log_level
    }
}
