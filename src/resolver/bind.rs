//! Path-source selection.

use std::ops::ControlFlow;

use crate::exec::Flow;
use crate::observability::metrics;
use crate::request::{detect, split_segments, AccessType, Detection, InputValue, Origin};
use crate::resolver::{Misroute, Resolver};

impl Resolver {
    /// Bind the request parameter `name` read from `origin`.
    ///
    /// Falls back to the request URI when the parameter is absent and
    /// automatic detection is on. Returns whether a path was received, or
    /// the termination of a detour or abort.
    pub fn bind(&mut self, name: &str, origin: Origin) -> Flow<bool> {
        self.segments.clear();
        self.params.clear();
        self.access_type = AccessType::None;
        self.received = false;
        self.bound_name.clear();

        let name = name.trim();
        if name.is_empty() {
            return ControlFlow::Continue(false);
        }

        if let Some(value) = self.input.lookup(origin, name).and_then(InputValue::as_text) {
            self.segments = split_segments(value);
            self.access_type = origin.access_type();
            self.received = true;
        }

        if !self.received && self.settings.auto_detect {
            match detect(self.meta.as_ref(), &self.settings) {
                Detection::NoPath => {}
                Detection::DocumentRoot => {
                    tracing::debug!("Request addressed the document root");
                }
                Detection::Detour => {
                    return ControlFlow::Break(self.detour(None));
                }
                Detection::Uri(segments) => {
                    self.segments = segments;
                    self.access_type = AccessType::Uri;
                    self.received = true;
                }
                Detection::Unresolvable(path) => {
                    return ControlFlow::Break(self.abort_misroute(Misroute::Unresolvable(path)));
                }
            }
        }

        self.bound_name = name.to_string();
        if self.received {
            self.params.insert(name.to_string(), self.segments.join("/"));
        }

        metrics::record_bind(self.access_type);
        tracing::debug!(
            param = name,
            access_type = %self.access_type,
            segments = ?self.segments,
            received = self.received,
            "Request bound"
        );

        ControlFlow::Continue(self.received)
    }
}
