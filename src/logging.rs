//! Internal logging helpers for structured projector events.

/// Single logging target for the projector.
pub(crate) const LOG_TARGET: &str = "druid_projector";

/// Optional common key/value fields appended to all logs in a scope.
#[derive(Clone, Debug, Default)]
pub(crate) struct LogContext {
    common_kv: String,
}

impl LogContext {
    /// Build a context that appends the provided key/value pairs.
    pub(crate) fn new(common_kv: impl Into<String>) -> Self {
        Self {
            common_kv: common_kv.into(),
        }
    }

    pub(crate) fn common_kv(&self) -> Option<&str> {
        if self.common_kv.is_empty() {
            None
        } else {
            Some(&self.common_kv)
        }
    }
}

macro_rules! projector_log {
    ($level:expr, ctx: $ctx:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            if let Some(common_kv) = $ctx.common_kv() {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {} {}",
                    $event,
                    common_kv,
                    format_args!($fmt $(, $args)*)
                );
            } else {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {}",
                    $event,
                    format_args!($fmt $(, $args)*)
                );
            }
        }
    }};
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use projector_log;
