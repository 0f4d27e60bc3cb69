//! Transport-surface tests over the committed fixture suite: wrapper
//! rendering (snapshotted), exposure checks, static serving, and the
//! canned harness resources.

use wptrun::{ServerOptions, TestServer};

const SUITE: &str = "tests/fixtures/suite";

fn server() -> TestServer {
    TestServer::new(ServerOptions::new(SUITE)).unwrap()
}

#[test]
fn any_html_wrapper_document() {
    let response = server().handle("/b.any.html");
    assert_eq!(response.status, 200);
    assert!(
        response
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "text/html")
    );

    insta::assert_snapshot!(response.text().trim_end(), @r###"
<!doctype html>
<meta charset=utf-8>
<title>b</title>
<script>
self.GLOBAL = {
  isWindow: function() { return true; },
  isWorker: function() { return false; },
};
</script>
<script src="/resources/testharness.js"></script>
<script src="/resources/testharnessreport.js"></script>

<div id=log></div>
<script src="/b.any.js"></script>
"###);
}

#[test]
fn window_wrapper_document_with_injections() {
    let response = server().handle("/c.window.html");
    assert_eq!(response.status, 200);

    insta::assert_snapshot!(response.text().trim_end(), @r###"
<!doctype html>
<meta charset=utf-8>
<title>A&amp;B</title>
<meta name="timeout" content="long">
<script src="/resources/testharness.js"></script>
<script src="/resources/testharnessreport.js"></script>
<script src="/common/helper.js"></script>
<div id=log></div>
<script src="/c.window.js"></script>
"###);
}

#[test]
fn window_wrapper_references_backing_script() {
    let response = server().handle("/c.window.html");
    assert!(response.text().contains("<script src=\"/c.window.js\"></script>"));
    // The declared title is HTML-escaped.
    assert!(response.text().contains("<title>A&amp;B</title>"));
}

#[test]
fn wrapper_forwards_query_string() {
    let response = server().handle("/b.any.html?case=3");
    assert_eq!(response.status, 200);
    assert!(response.text().contains("<script src=\"/b.any.js?case=3\"></script>"));
}

#[test]
fn excluded_global_is_not_exposed() {
    let response = server().handle("/excluded.any.html");
    assert_eq!(response.status, 404);
    assert!(
        response
            .text()
            .contains("This test cannot be loaded in window mode")
    );
}

#[test]
fn missing_backing_script_is_a_server_error() {
    // The window wrapper has no exposure phase, so the read fault surfaces
    // during rendering as a 500.
    let response = server().handle("/ghost.window.html");
    assert_eq!(response.status, 500);
    assert!(response.text().contains("ghost.window.js"));
}

#[test]
fn missing_backing_script_fails_exposure_first_for_any_html() {
    // The any-html wrapper reads metadata during its exposure check; a
    // missing backing script is reported as not-found.
    let response = server().handle("/ghost.any.html");
    assert_eq!(response.status, 404);
    assert!(response.text().contains("ghost.any.js"));
}

#[test]
fn static_files_are_served_with_content_type() {
    let srv = server();

    let page = srv.handle("/a.html");
    assert_eq!(page.status, 200);
    assert!(
        page.headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "text/html")
    );
    assert!(page.text().contains("a passes"));

    let script = srv.handle("/b.any.js");
    assert_eq!(script.status, 200);
    assert!(
        script
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "text/javascript")
    );
}

#[test]
fn static_serving_respects_url_base() {
    let srv = TestServer::new(ServerOptions {
        root: SUITE.into(),
        url_base: "dom/nodes".to_string(),
        harness_script: None,
    })
    .unwrap();

    assert_eq!(srv.url_base(), "/dom/nodes/");
    assert_eq!(srv.handle("/dom/nodes/a.html").status, 200);
    assert_eq!(srv.handle("/dom/nodes/b.any.html").status, 200);
}

#[test]
fn configured_harness_script_is_served() {
    let srv = TestServer::new(ServerOptions {
        root: SUITE.into(),
        url_base: "/".to_string(),
        // Any readable file works; the suite's helper stands in.
        harness_script: Some(format!("{SUITE}/resources/helper.js").into()),
    })
    .unwrap();

    let response = srv.handle("/resources/testharness.js");
    assert_eq!(response.status, 200);
    assert!(response.text().contains("suiteHelperLoaded"));
}

#[test]
fn missing_harness_script_fails_construction() {
    let err = TestServer::new(ServerOptions {
        root: SUITE.into(),
        url_base: "/".to_string(),
        harness_script: Some("tests/fixtures/no-such-harness.js".into()),
    })
    .unwrap_err();
    assert!(err.to_string().contains("no-such-harness.js"));
}

#[test]
fn wrapper_routes_take_precedence_over_static() {
    // b.any.html does not exist on disk; the wrapper answers anyway.
    let response = server().handle("/b.any.html");
    assert_eq!(response.status, 200);
    assert!(response.text().contains("self.GLOBAL"));
}
