//! Resolution counters.
//!
//! # Metrics
//! - `router_bind_total` (counter): bind calls by `access_type`
//! - `router_executions_total` (counter): handlers run, by `kind`
//!   (`default`, `route`, `detour`)
//! - `router_aborts_total` (counter): aborts, by `renderer`
//!   (`handler` or `builtin`)
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! the calls are no-ops.

use metrics::counter;

use crate::request::AccessType;

pub fn record_bind(access_type: AccessType) {
    counter!("router_bind_total", "access_type" => access_type.as_str()).increment(1);
}

pub fn record_execution(kind: &'static str) {
    counter!("router_executions_total", "kind" => kind).increment(1);
}

pub fn record_abort(renderer: &'static str) {
    counter!("router_aborts_total", "renderer" => renderer).increment(1);
}
