//! Operation events for rule commands
//!
//! Each command logs a `start` event, then one `end` or `end_error` event.
//! The `rule = <id>` form tags an event with the rule it acts on, so one
//! rule can be followed through create, update and publish. Durations are
//! measured from the `Instant` the caller took before `log_op_start!`.

#[doc(hidden)]
#[macro_export]
macro_rules! __op_event {
    ($level:ident, $op:expr, $event:expr, $($field:tt)*) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($field)*
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use ruledesk_core::log_op_start;
/// log_op_start!("list_rules");
/// log_op_start!("publish_rule", rule = "r1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::__op_event!(info, $op, ruledesk_core_types::schema::EVENT_START,)
    };
    ($op:expr, rule = $rule:expr) => {
        $crate::__op_event!(
            info,
            $op,
            ruledesk_core_types::schema::EVENT_START,
            rule_id = %$rule,
        )
    };
}

/// Log the successful end of an operation started at `$start`
///
/// ```
/// # use ruledesk_core::log_op_end;
/// let start = std::time::Instant::now();
/// log_op_end!("publish_rule", start, rule = "r1", core_id = "CORE-000001");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, $start:expr) => {
        $crate::__op_event!(
            info,
            $op,
            ruledesk_core_types::schema::EVENT_END,
            duration_ms = $start.elapsed().as_millis() as u64,
        )
    };
    ($op:expr, $start:expr, rule = $rule:expr) => {
        $crate::log_op_end!($op, $start, rule = $rule,)
    };
    ($op:expr, $start:expr, rule = $rule:expr, $($field:tt)*) => {
        $crate::__op_event!(
            info,
            $op,
            ruledesk_core_types::schema::EVENT_END,
            duration_ms = $start.elapsed().as_millis() as u64,
            rule_id = %$rule,
            $($field)*
        )
    };
}

/// Log a failed operation; `$err` is anything convertible into `ExError`
///
/// ```
/// # use ruledesk_core::{log_op_error, errors::RuleError};
/// let start = std::time::Instant::now();
/// let err = RuleError::RuleNotFound { rule_id: "r1".to_string() };
/// log_op_error!("get_rule", err, start, rule = "r1");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, $start:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__op_event!(
            error,
            $op,
            ruledesk_core_types::schema::EVENT_END_ERROR,
            duration_ms = $start.elapsed().as_millis() as u64,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
        )
    }};
    ($op:expr, $err:expr, $start:expr, rule = $rule:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__op_event!(
            error,
            $op,
            ruledesk_core_types::schema::EVENT_END_ERROR,
            duration_ms = $start.elapsed().as_millis() as u64,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            rule_id = %$rule,
        )
    }};
}
