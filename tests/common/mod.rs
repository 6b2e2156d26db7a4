//! Shared utilities for resolver integration tests.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use script_router::config::ResolverSettings;
use script_router::exec::{FnHost, HandlerOutcome, Invocation};
use script_router::render::CriticalRenderer;
use script_router::request::{AccessType, RequestInput, StaticMeta};
use script_router::routing::{ParamsMap, RouteTable};
use script_router::Resolver;

/// What a recorded handler saw when it ran.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Call {
    pub script: PathBuf,
    pub workdir: Option<PathBuf>,
    pub reference: Option<String>,
    pub access_type: Option<AccessType>,
    pub params: Option<ParamsMap>,
    pub exported: Option<String>,
}

#[allow(dead_code)]
pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Records every execution and completes with `code`.
#[allow(dead_code)]
pub fn recorder(log: &CallLog, code: i32) -> impl Fn(&Invocation<'_>) -> HandlerOutcome + 'static {
    let log = Rc::clone(log);
    move |inv: &Invocation<'_>| {
        log.borrow_mut().push(Call {
            script: inv.script.to_path_buf(),
            workdir: inv.workdir.map(|dir| dir.to_path_buf()),
            reference: inv.scope.map(|s| s.reference().to_string()),
            access_type: inv.scope.map(|s| s.access_type()),
            params: inv.scope.map(|s| s.params().clone()),
            exported: inv.scope.and_then(|s| {
                s.input()
                    .lookup(script_router::request::Origin::Request, "app")
                    .and_then(|v| v.as_text())
                    .map(str::to_string)
            }),
        });
        HandlerOutcome::Completed(code)
    }
}

/// Host with a recording handler for each script.
#[allow(dead_code)]
pub fn recording_host(scripts: &[&str], log: &CallLog) -> FnHost {
    let mut host = FnHost::new();
    for script in scripts {
        host.register(*script, recorder(log, 0));
    }
    host
}

/// Renderer that keeps what it was asked to show.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub rendered: Rc<RefCell<Vec<(String, String)>>>,
}

impl CriticalRenderer for RecordingRenderer {
    fn render_critical(&mut self, title: &str, message: &str) {
        self.rendered
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

/// Settings rooted at `/app/`.
pub fn app_settings() -> ResolverSettings {
    ResolverSettings {
        document_root: "/app/".to_string(),
        base_dir: "/app/".to_string(),
        ..ResolverSettings::default()
    }
}

/// Resolver with explicit input and metadata and a recording renderer.
#[allow(dead_code)]
pub fn build(
    table: RouteTable,
    host: FnHost,
    input: RequestInput,
    meta: StaticMeta,
    renderer: &RecordingRenderer,
) -> Resolver {
    Resolver::new(table, app_settings(), Box::new(host))
        .with_input(input)
        .with_meta(Box::new(meta))
        .with_renderer(Box::new(renderer.clone()))
}
