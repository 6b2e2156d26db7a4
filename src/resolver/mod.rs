//! Request resolution.
//!
//! # Data Flow
//! ```text
//! resolve(name, origin, keep_going)
//!     → bind.rs     : input → server metadata → segments + access type
//!                     (may detour or abort)
//!     → run.rs      : default handler, then [uri] entries in order
//!                     → include (exists? execute with RouteScope)
//!     → fallback.rs : abort (custom handler or built-in render), detour
//!     → Flow<bool>  : Continue(matched) or Break(Termination)
//! ```
//!
//! # State Machine (per pass)
//! ```text
//! unbound → bound-via-input | bound-via-uri | unbound-fallback
//!         → detour (terminal) | aborted (terminal)
//! bound   → matched-executed (terminal unless keep_going) | no-match
//! ```
//!
//! # Design Decisions
//! - Segments, access type and params belong to the current pass and are
//!   replaced by the next `bind`
//! - At most one handler runs per pass unless `keep_going` is set
//! - Termination is returned, never performed here

mod bind;
mod fallback;
mod run;

use std::fmt;
use std::ops::ControlFlow;
use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::config::ResolverSettings;
use crate::exec::{Flow, ScriptHost};
use crate::render::{CriticalRenderer, HtmlBox};
use crate::request::{AccessType, CgiEnv, Origin, RequestInput, ServerMeta};
use crate::routing::{ParamsMap, RouteTable};

pub use fallback::Misroute;

/// Reference label of the default handler.
pub const DEFAULT_REFERENCE: &str = "default";
/// Reference label of the abort handler.
pub const ABORT_REFERENCE: &str = "abort";

/// Resolves one request to a handler and runs it.
pub struct Resolver {
    table: RouteTable,
    settings: ResolverSettings,
    input: RequestInput,
    meta: Box<dyn ServerMeta>,
    host: Box<dyn ScriptHost>,
    renderer: Box<dyn CriticalRenderer>,
    before_detour: Option<Box<dyn FnMut()>>,

    segments: Vec<String>,
    access_type: AccessType,
    received: bool,
    bound_name: String,
    params: ParamsMap,
}

/// Serializable view of the current pass.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub received: bool,
    pub access_type: AccessType,
    pub bound_name: String,
    pub segments: Vec<String>,
    pub params: ParamsMap,
}

impl Resolver {
    /// Create a resolver reading the CGI environment and rendering aborts
    /// to stdout.
    pub fn new(table: RouteTable, settings: ResolverSettings, host: Box<dyn ScriptHost>) -> Self {
        Self {
            table,
            settings,
            input: RequestInput::default(),
            meta: Box::new(CgiEnv),
            host,
            renderer: Box::new(HtmlBox::stdout()),
            before_detour: None,
            segments: Vec::new(),
            access_type: AccessType::None,
            received: false,
            bound_name: String::new(),
            params: ParamsMap::new(),
        }
    }

    pub fn with_input(mut self, input: RequestInput) -> Self {
        self.input = input;
        self
    }

    pub fn with_meta(mut self, meta: Box<dyn ServerMeta>) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn CriticalRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Register a callback that runs right before a detoured script.
    pub fn on_detour(mut self, callback: impl FnMut() + 'static) -> Self {
        self.before_detour = Some(Box::new(callback));
        self
    }

    /// Bind `name` and evaluate the route table in one pass.
    pub fn resolve(&mut self, name: &str, origin: Origin, keep_going: bool) -> Flow<bool> {
        let pass_id = Uuid::new_v4();
        let span = tracing::info_span!("resolve", %pass_id, param = name);
        let _guard = span.enter();

        if let ControlFlow::Break(termination) = self.bind(name, origin) {
            return ControlFlow::Break(termination);
        }
        let flow = self.run(keep_going);
        if let ControlFlow::Continue(false) = flow {
            tracing::info!(segments = ?self.segments, "No route matched");
        }
        flow
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    pub fn params(&self) -> &ParamsMap {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn bound_name(&self) -> &str {
        &self.bound_name
    }

    /// Whether the last `bind` found a request path.
    pub fn received(&self) -> bool {
        self.received
    }

    pub fn input(&self) -> &RequestInput {
        &self.input
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Replace the abort handler. `None` restores the built-in render.
    pub fn set_abort_handler(&mut self, handler: Option<PathBuf>) {
        self.table.set_abort_handler(handler);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            received: self.received,
            access_type: self.access_type,
            bound_name: self.bound_name.clone(),
            segments: self.segments.clone(),
            params: self.params.clone(),
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("routes", &self.table.len())
            .field("access_type", &self.access_type)
            .field("bound_name", &self.bound_name)
            .field("segments", &self.segments)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
