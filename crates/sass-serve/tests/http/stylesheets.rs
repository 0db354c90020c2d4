//! Serving compiled stylesheets over HTTP

use crate::harness::TestServer;
use sass_serve::RunMode;

fn header<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

#[test_log::test(tokio::test)]
async fn serves_compressed_css_with_cache_header_in_production() {
    let server = TestServer::start(RunMode::Production).await;

    let response = server.get("/styles/test.css").await;
    assert_eq!(response.status(), 200);
    assert!(
        header(&response, "content-type").is_some_and(|ct| ct.starts_with("text/css")),
        "content-type: {:?}",
        header(&response, "content-type")
    );
    assert_eq!(
        header(&response, "cache-control"),
        Some("public, max-age=86400")
    );

    let css = response.text().await.unwrap();
    assert!(css.contains("body{color:red}"), "got: {css}");
    assert!(!css.contains("sourceMappingURL"), "got: {css}");
}

#[test_log::test(tokio::test)]
async fn development_embeds_source_map_without_cache_header() {
    let server = TestServer::start(RunMode::Development).await;

    let response = server.get("/styles/test.css").await;
    assert_eq!(response.status(), 200);
    assert_eq!(header(&response, "cache-control"), None);

    let css = response.text().await.unwrap();
    assert!(css.contains("color: red;"), "got: {css}");
    assert!(
        css.contains("sourceMappingURL=data:application/json"),
        "got: {css}"
    );
}

#[test_log::test(tokio::test)]
async fn embed_src_map_in_prod_keeps_source_map() {
    let server = TestServer::start_with(RunMode::Production, |options| {
        options.embed_src_map_in_prod = true;
    })
    .await;

    let css = server.get("/styles/test.css").await.text().await.unwrap();
    assert!(css.contains("body{color:red}"), "got: {css}");
    assert!(css.contains("sourceMappingURL"), "got: {css}");
}

#[test_log::test(tokio::test)]
async fn name_without_css_suffix_is_served() {
    let server = TestServer::start(RunMode::Production).await;

    let response = server.get("/styles/test").await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("body{color:red}"));
}

#[test_log::test(tokio::test)]
async fn partials_are_resolved() {
    let server = TestServer::start(RunMode::Production).await;

    let response = server.get("/styles/test2.css").await;
    assert_eq!(response.status(), 200);

    let css = response.text().await.unwrap();
    assert!(css.contains("#3498db"), "got: {css}");
    assert!(!css.contains("$brand"), "got: {css}");
}

#[test_log::test(tokio::test)]
async fn tilde_imports_need_resolve_tildes() {
    let plain = TestServer::start(RunMode::Production).await;
    assert_eq!(plain.get("/styles/widgets.css").await.status(), 500);

    let server = TestServer::start_with(RunMode::Production, |options| {
        options.resolve_tildes = true;
    })
    .await;
    let response = server.get("/styles/widgets.css").await;
    assert_eq!(response.status(), 200);

    let css = response.text().await.unwrap();
    assert!(css.contains(".button{padding:4px 8px}"), "got: {css}");
}

#[test_log::test(tokio::test)]
async fn compile_errors_surface_as_server_errors() {
    let server = TestServer::start(RunMode::Development).await;

    let response = server.get("/styles/broken.css").await;
    assert_eq!(response.status(), 500);
    assert!(header(&response, "cache-control").is_none());
}

#[test_log::test(tokio::test)]
async fn missing_and_escaping_names_are_not_found() {
    let server = TestServer::start(RunMode::Development).await;

    assert_eq!(server.get("/styles/nope.css").await.status(), 404);
    assert_eq!(server.get("/styles/..%2Ftest.css").await.status(), 404);
    assert_eq!(
        server.get("/styles/partials%2F_colors.css").await.status(),
        404
    );
}

#[test_log::test(tokio::test)]
async fn edits_are_picked_up_on_next_request() {
    let server = TestServer::start(RunMode::Production).await;
    assert!(
        server
            .get("/styles/test.css")
            .await
            .text()
            .await
            .unwrap()
            .contains("color:red")
    );

    fs_err::write(server.root.join("scss/test.scss"), "body { color: blue; }\n").unwrap();

    let css = server.get("/styles/test.css").await.text().await.unwrap();
    assert!(css.contains("body{color:blue}"), "got: {css}");
}
