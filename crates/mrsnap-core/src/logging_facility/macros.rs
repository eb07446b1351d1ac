//! Operation boundary macros
//!
//! Every logged operation emits a `start` event and then exactly one of
//! `end` or `end_error`, all carrying `component` and `op`. Extra fields are
//! passed through to `tracing` unchanged.

#[doc(hidden)]
#[macro_export]
macro_rules! __op_event {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::$event,
            $($($field)*)?
        )
    };
}

/// Operation started
///
/// ```
/// # use mrsnap_core::log_op_start;
/// log_op_start!("parse_manifest");
/// log_op_start!("resolve_commit", project = "build");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Operation finished; `duration_ms` is required
///
/// ```
/// # use mrsnap_core::log_op_end;
/// log_op_end!("parse_manifest", duration_ms = 42u64, project_count = 3u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(info, $op, EVENT_END, duration_ms = $duration $(, $($field)*)?)
    };
}

/// Operation failed with an `ExError`, logged with its kind and stable code
///
/// The error is borrowed so the caller can still return it.
///
/// ```
/// # use mrsnap_core::log_op_error;
/// # use mrsnap_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Manifest);
/// log_op_error!("parse_manifest", &err, duration_ms = 10u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: &$crate::errors::ExError = $err;
        $crate::__op_event!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = %ex_err
            $(, $($field)*)?
        )
    }};
}
