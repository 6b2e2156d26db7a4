//! End-to-end resolution tests.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use script_router::config::ResolverSettings;
use script_router::exec::{FnHost, HandlerOutcome, Termination, ABORT_EXIT_CODE};
use script_router::request::{AccessType, Origin, RequestInput, StaticMeta};
use script_router::routing::RouteTable;
use script_router::Resolver;

mod common;

use common::{build, recorder, recording_host, CallLog, RecordingRenderer};

fn no_meta() -> StaticMeta {
    StaticMeta::default()
}

fn post_route(route: &str) -> RequestInput {
    RequestInput::new().with_post("route", route)
}

#[test]
fn test_capture_reaches_handler() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let table = RouteTable::new().with_route("projects/edit/?app", "edit.cgi");
    let mut r = build(
        table,
        recording_host(&["edit.cgi"], &log),
        post_route("projects/edit/holamundo"),
        no_meta(),
        &renderer,
    );

    let flow = r.resolve("route", Origin::Post, false);

    assert_eq!(
        flow,
        ControlFlow::Break(Termination::Completed {
            reference: "projects/edit/?app".into(),
            script: PathBuf::from("edit.cgi"),
            code: 0,
        })
    );
    let calls = log.borrow();
    assert_eq!(calls.len(), 1);
    let params = calls[0].params.as_ref().unwrap();
    assert_eq!(params.get("app").map(String::as_str), Some("holamundo"));
    assert_eq!(params.get("route").map(String::as_str), Some("projects/edit"));
    assert_eq!(calls[0].access_type, Some(AccessType::Post));
    assert!(calls[0].workdir.is_none());
}

#[test]
fn test_default_runs_when_nothing_received() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let table = RouteTable::new()
        .with_default("home.cgi")
        .with_route("?anything", "catch_all.cgi");
    let mut r = build(
        table,
        recording_host(&["home.cgi", "catch_all.cgi"], &log),
        RequestInput::new(),
        no_meta(),
        &renderer,
    );

    let flow = r.resolve("route", Origin::Request, false);

    assert!(matches!(flow, ControlFlow::Break(Termination::Completed { ref reference, .. }) if reference == "default"));
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].script, Path::new("home.cgi"));
    assert_eq!(log.borrow()[0].access_type, Some(AccessType::None));
}

#[test]
fn test_default_is_skipped_once_a_path_is_received() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let table = RouteTable::new()
        .with_default("home.cgi")
        .with_route("about", "about.cgi");
    let mut r = build(
        table,
        recording_host(&["home.cgi", "about.cgi"], &log),
        post_route("about"),
        no_meta(),
        &renderer,
    );

    let _ = r.resolve("route", Origin::Post, false);
    assert_eq!(log.borrow()[0].script, Path::new("about.cgi"));
}

#[test]
fn test_document_root_neither_detours_nor_aborts() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let meta = StaticMeta::new(Some("/var/www/app/index.cgi"), Some("/app/"));
    let mut r = build(
        RouteTable::new().with_route("about", "about.cgi"),
        recording_host(&["about.cgi", "/var/www/app/index.cgi"], &log),
        RequestInput::new(),
        meta,
        &renderer,
    );

    assert_eq!(r.resolve("route", Origin::Request, false), ControlFlow::Continue(false));
    assert!(!r.received());
    assert!(log.borrow().is_empty());
    assert!(renderer.rendered.borrow().is_empty());
}

#[test]
fn test_auto_detected_uri_routes() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let meta = StaticMeta::new(Some("/var/www/app/index.cgi"), Some("/app/Projects/List?page=3"));
    let mut r = build(
        RouteTable::new().with_route("projects/list", "list.cgi"),
        recording_host(&["list.cgi"], &log),
        RequestInput::new(),
        meta,
        &renderer,
    );

    let flow = r.resolve("route", Origin::Get, false);

    assert!(matches!(flow, ControlFlow::Break(Termination::Completed { .. })));
    assert_eq!(log.borrow()[0].access_type, Some(AccessType::Uri));
    assert_eq!(r.param("route"), Some("projects/list"));
}

#[test]
fn test_permissive_fallthrough_when_matched_handler_is_missing() {
    // A structurally matching entry whose handler is gone is skipped and a
    // later entry may still run. Deliberately permissive.
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let table = RouteTable::new()
        .with_route("projects/?id", "gone.cgi")
        .with_route("?path", "fallback.cgi");
    let mut r = build(
        table,
        recording_host(&["fallback.cgi"], &log),
        post_route("projects/42"),
        no_meta(),
        &renderer,
    );

    let flow = r.resolve("route", Origin::Post, false);

    assert!(matches!(flow, ControlFlow::Break(Termination::Completed { ref reference, .. }) if reference == "?path"));
    assert_eq!(r.param("path"), Some("projects/42"));
    assert!(r.param("id").is_none());
}

#[test]
fn test_unmatched_request_returns_to_caller() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let mut r = build(
        RouteTable::new().with_route("projects/list", "list.cgi"),
        recording_host(&["list.cgi"], &log),
        post_route("projects/listing"),
        no_meta(),
        &renderer,
    );

    assert_eq!(r.resolve("route", Origin::Post, false), ControlFlow::Continue(false));
    assert!(log.borrow().is_empty());
    assert!(renderer.rendered.borrow().is_empty());
}

#[test]
fn test_keep_going_allows_a_second_pass() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let input = RequestInput::new()
        .with_post("route", "about")
        .with_get("next", "contact");
    let table = RouteTable::new()
        .with_route("about", "about.cgi")
        .with_route("contact", "contact.cgi");
    let mut r = build(
        table,
        recording_host(&["about.cgi", "contact.cgi"], &log),
        input,
        no_meta(),
        &renderer,
    );

    assert_eq!(r.resolve("route", Origin::Post, true), ControlFlow::Continue(true));
    assert_eq!(r.resolve("next", Origin::Get, true), ControlFlow::Continue(true));

    let scripts: Vec<PathBuf> = log.borrow().iter().map(|c| c.script.clone()).collect();
    assert_eq!(scripts, vec![PathBuf::from("about.cgi"), PathBuf::from("contact.cgi")]);
    assert_eq!(r.access_type(), AccessType::Get);
    assert!(r.param("route").is_none());
}

#[test]
fn test_export_copies_params_into_combined_input() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let settings = ResolverSettings {
        export: true,
        ..common::app_settings()
    };
    let mut r = Resolver::new(
        RouteTable::new().with_route("projects/edit/?app", "edit.cgi"),
        settings,
        Box::new(FnHost::new().with("edit.cgi", recorder(&log, 0))),
    )
    .with_input(post_route("projects/edit/demo"))
    .with_meta(Box::new(no_meta()))
    .with_renderer(Box::new(renderer.clone()));

    let _ = r.resolve("route", Origin::Post, false);

    assert_eq!(log.borrow()[0].exported.as_deref(), Some("demo"));
    assert!(r.input().lookup(Origin::Post, "app").is_none());
}

#[test]
fn test_abort_runs_registered_handler() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let meta = StaticMeta::new(Some("/var/www/app/index.cgi"), Some("/elsewhere"));
    let host = FnHost::new().with("oops.cgi", recorder(&log, 5));
    let mut r = build(
        RouteTable::new().with_abort("oops.cgi"),
        host,
        RequestInput::new(),
        meta,
        &renderer,
    );

    let flow = r.resolve("route", Origin::Request, false);

    match flow {
        ControlFlow::Break(Termination::Aborted { title, code, .. }) => {
            assert_eq!(title, "Request not understood");
            assert_eq!(code, 5);
        }
        other => panic!("expected abort, got {other:?}"),
    }
    let calls = log.borrow();
    assert_eq!(calls.len(), 1);
    let params = calls[0].params.as_ref().unwrap();
    assert_eq!(params.get("title").map(String::as_str), Some("Request not understood"));
    assert!(params["message"].contains("/elsewhere"));
    assert_eq!(calls[0].reference.as_deref(), Some("abort"));
    assert!(renderer.rendered.borrow().is_empty());
}

#[test]
fn test_abort_without_handler_renders_builtin_message() {
    let renderer = RecordingRenderer::default();
    let mut r = build(
        RouteTable::new().with_abort("missing.cgi"),
        FnHost::new(),
        RequestInput::new(),
        no_meta(),
        &renderer,
    );

    let termination = r.abort("Maintenance", "Back soon");

    assert_eq!(termination.exit_code(), ABORT_EXIT_CODE);
    assert_eq!(
        *renderer.rendered.borrow(),
        vec![("Maintenance".to_string(), "Back soon".to_string())]
    );
}

#[test]
fn test_abort_handler_setter() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let host = FnHost::new().with("custom.cgi", recorder(&log, 2));
    let mut r = build(RouteTable::new(), host, RequestInput::new(), no_meta(), &renderer);

    r.set_abort_handler(Some(PathBuf::from("custom.cgi")));
    assert_eq!(r.abort("t", "m").exit_code(), 2);

    r.set_abort_handler(None);
    assert_eq!(r.abort("t", "m").exit_code(), ABORT_EXIT_CODE);
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(renderer.rendered.borrow().len(), 1);
}

#[test]
fn test_handler_can_request_abort() {
    let renderer = RecordingRenderer::default();
    let host = FnHost::new().with("admin.cgi", |inv| {
        let scope = inv.scope.expect("routed handler has a scope");
        scope.abort("Forbidden", format!("no access to {}", scope.param("section").unwrap_or("")))
    });
    let mut r = build(
        RouteTable::new().with_route("admin/?section", "admin.cgi"),
        host,
        post_route("admin/users"),
        no_meta(),
        &renderer,
    );

    let flow = r.resolve("route", Origin::Post, true);

    assert!(matches!(flow, ControlFlow::Break(Termination::Aborted { .. })));
    assert_eq!(
        *renderer.rendered.borrow(),
        vec![("Forbidden".to_string(), "no access to users".to_string())]
    );
}

#[test]
fn test_nested_abort_falls_back_to_builtin() {
    let renderer = RecordingRenderer::default();
    let host = FnHost::new().with("oops.cgi", |inv| {
        inv.scope.expect("abort handler has a scope").abort("again", "again")
    });
    let mut r = build(RouteTable::new().with_abort("oops.cgi"), host, RequestInput::new(), no_meta(), &renderer);

    let termination = r.abort("First", "first failure");

    assert_eq!(termination.exit_code(), ABORT_EXIT_CODE);
    assert_eq!(renderer.rendered.borrow()[0].0, "First");
}

#[test]
fn test_detour_runs_script_in_its_directory_without_scope() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let paused = Rc::new(Cell::new(false));
    let flag = Rc::clone(&paused);
    let meta = StaticMeta::new(Some("/var/www/app/tools/report.cgi"), Some("/app/tools/report.cgi"));
    let host = FnHost::new().with("/var/www/app/tools/report.cgi", recorder(&log, 0));
    let mut r = build(RouteTable::new().with_default("home.cgi"), host, RequestInput::new(), meta, &renderer)
        .on_detour(move || flag.set(true));

    let flow = r.resolve("route", Origin::Request, true);

    assert_eq!(
        flow,
        ControlFlow::Break(Termination::Detoured {
            script: PathBuf::from("/var/www/app/tools/report.cgi"),
            code: 0,
        })
    );
    assert!(paused.get());
    let calls = log.borrow();
    assert_eq!(calls[0].workdir.as_deref(), Some(Path::new("/var/www/app/tools")));
    assert!(calls[0].params.is_none());
}

#[test]
fn test_detour_rejects_non_script() {
    let renderer = RecordingRenderer::default();
    let meta = StaticMeta::new(Some("/var/www/app/style.css"), Some("/app/style.css"));
    let order = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&order);
    let mut r = build(RouteTable::new(), FnHost::new(), RequestInput::new(), meta, &renderer)
        .on_detour(move || seen.borrow_mut().push("detour"));

    let flow = r.resolve("route", Origin::Request, false);

    match flow {
        ControlFlow::Break(Termination::Aborted { title, .. }) => assert_eq!(title, "Routing failure"),
        other => panic!("expected abort, got {other:?}"),
    }
    assert!(order.borrow().is_empty());
}

#[test]
fn test_detour_missing_file() {
    let renderer = RecordingRenderer::default();
    let mut r = build(RouteTable::new(), FnHost::new(), RequestInput::new(), no_meta(), &renderer);

    let termination = r.detour(Some(Path::new("/var/www/app/gone.php")));

    assert!(matches!(termination, Termination::Aborted { ref title, .. } if title == "File not found"));
    assert_eq!(renderer.rendered.borrow().len(), 1);
}

#[test]
fn test_handler_can_hand_off_to_another_script() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let host = FnHost::new()
        .with("legacy.cgi", |inv| {
            let scope = inv.scope.expect("routed handler has a scope");
            scope.detour(format!("/var/www/app/old/{}.cgi", scope.param("page").unwrap_or("index")))
        })
        .with("/var/www/app/old/report.cgi", recorder(&log, 5));
    let mut r = build(
        RouteTable::new().with_route("legacy/?page", "legacy.cgi"),
        host,
        post_route("legacy/report"),
        no_meta(),
        &renderer,
    );

    let flow = r.resolve("route", Origin::Post, true);

    assert_eq!(
        flow,
        ControlFlow::Break(Termination::Detoured {
            script: PathBuf::from("/var/www/app/old/report.cgi"),
            code: 5,
        })
    );
    let calls = log.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].workdir.as_deref(), Some(Path::new("/var/www/app/old")));
    assert!(calls[0].params.is_none());
    assert!(renderer.rendered.borrow().is_empty());
}

#[test]
fn test_handler_detour_to_missing_script_aborts() {
    let renderer = RecordingRenderer::default();
    let host = FnHost::new().with("legacy.cgi", |inv| {
        inv.scope.expect("routed handler has a scope").detour("/var/www/app/old/gone.cgi")
    });
    let mut r = build(
        RouteTable::new().with_route("legacy", "legacy.cgi"),
        host,
        post_route("legacy"),
        no_meta(),
        &renderer,
    );

    let flow = r.resolve("route", Origin::Post, false);

    assert!(matches!(flow, ControlFlow::Break(Termination::Aborted { ref title, .. }) if title == "File not found"));
    assert_eq!(renderer.rendered.borrow().len(), 1);
}

#[test]
fn test_detoured_script_cannot_detour_again() {
    let renderer = RecordingRenderer::default();
    let host = FnHost::new().with("/var/www/app/a.cgi", |_| {
        HandlerOutcome::Detour(PathBuf::from("/var/www/app/b.cgi"))
    });
    let mut r = build(RouteTable::new(), host, RequestInput::new(), no_meta(), &renderer);

    let termination = r.detour(Some(Path::new("/var/www/app/a.cgi")));

    assert!(matches!(termination, Termination::Aborted { ref title, .. } if title == "Routing failure"));
}

#[test]
fn test_reference_with_surrounding_slashes_routes() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let table = RouteTable::new()
        .with_route("/about/", "about.cgi")
        .with_route("projects/?id/", "project.cgi");
    let mut r = build(
        table,
        recording_host(&["about.cgi", "project.cgi"], &log),
        post_route("projects/42"),
        no_meta(),
        &renderer,
    );

    let flow = r.resolve("route", Origin::Post, false);

    assert!(matches!(flow, ControlFlow::Break(Termination::Completed { ref reference, .. }) if reference == "projects/?id/"));
    assert_eq!(r.param("id"), Some("42"));
    assert_eq!(r.param("route"), Some("projects"));
}

#[test]
fn test_params_after_unmatched_pass_hold_only_the_bound_path() {
    let renderer = RecordingRenderer::default();
    let table = RouteTable::new()
        .with_route("projects/?id", "gone.cgi")
        .with_route("projects/list", "list.cgi");
    let mut r = build(table, FnHost::new(), post_route("projects/listing"), no_meta(), &renderer);

    assert_eq!(r.resolve("route", Origin::Post, false), ControlFlow::Continue(false));

    let params: Vec<(&str, &str)> = r.params().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(params, vec![("route", "projects/listing")]);
}

#[test]
fn test_rebind_replaces_segments_params_and_access_type() {
    let log = CallLog::default();
    let renderer = RecordingRenderer::default();
    let input = RequestInput::new()
        .with_post("a", "projects/edit/x")
        .with_get("b", "about");
    let mut r = build(
        RouteTable::new().with_route("projects/edit/?app", "edit.cgi"),
        recording_host(&["edit.cgi"], &log),
        input,
        no_meta(),
        &renderer,
    );

    let _ = r.bind("a", Origin::Post);
    assert_eq!(r.run(true), ControlFlow::Continue(true));
    assert_eq!(r.param("app"), Some("x"));

    let _ = r.bind("b", Origin::Get);
    assert_eq!(r.segments(), ["about"]);
    assert_eq!(r.access_type(), AccessType::Get);
    assert!(r.param("app").is_none());
    assert_eq!(r.param("b"), Some("about"));
}

#[test]
fn test_snapshot_serializes() {
    let renderer = RecordingRenderer::default();
    let mut r = build(RouteTable::new(), FnHost::new(), post_route("a/b"), no_meta(), &renderer);
    let _ = r.bind("route", Origin::Post);

    let json = serde_json::to_value(r.snapshot()).unwrap();
    assert_eq!(json["access_type"], "post");
    assert_eq!(json["segments"], serde_json::json!(["a", "b"]));
    assert_eq!(json["params"]["route"], "a/b");
}
