//! Static markup versus the client's first paint.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use folio_build::{
    BundleRequest, BundleTarget, Bundler, ClientApp, NativeBundler, NullSearch, ServerEntry,
    SiteData, parity, site_modules,
};
use folio_config::Config;
use folio_site::RouteCatalog;
use pretty_assertions::assert_eq;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Build a server entry and the matching site snapshot for `docs/`.
fn server_entry(root: &Path, config: &Config) -> (Box<dyn ServerEntry>, Arc<SiteData>) {
    let catalog = RouteCatalog::build(&root.join("docs")).unwrap();
    let data = SiteData::new(&config.site, &catalog);

    let entry = root.join("entry-server.js");
    fs::write(&entry, "export const render = () => {};\n").unwrap();
    let bundler = NativeBundler::new();
    let output = bundler
        .bundle(&BundleRequest {
            target: BundleTarget::Server,
            entry,
            modules: site_modules(&data, &NullSearch).unwrap(),
            out_dir: root.join("server"),
            base: config.site.base.clone(),
        })
        .unwrap();
    (bundler.load_server(&output).unwrap(), Arc::new(data))
}

fn config() -> Config {
    let mut config = Config::default();
    config.site.title = "Parity".to_owned();
    config.site.base = "/handbook/".to_owned();
    config.site.locales = vec!["en".to_owned(), "ja".to_owned()];
    config.settle().unwrap();
    config
}

#[test]
fn test_plain_route_matches_first_paint() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "docs/index.md", "# Home\n");
    write(temp.path(), "docs/en/guide.md", "# Guide\n\n## Install\n\nRun `make`.\n");
    write(temp.path(), "docs/ja/guide.md", "# ガイド\n");
    let config = config();
    let (entry, data) = server_entry(temp.path(), &config);

    let server = entry.render("/en/guide").unwrap().markup;
    let client = ClientApp::new(Arc::clone(&data), Arc::new(NullSearch), "/handbook/en/guide")
        .render()
        .unwrap()
        .to_html();

    assert_eq!(server, client);
    assert!(server.contains(
        "<button type=\"button\" class=\"search-button\" aria-controls=\"search\" aria-expanded=\"false\">Search</button>"
    ));
    assert!(server.contains("<a href=\"/handbook/en/guide\" aria-current=\"page\">Guide</a>"));
    assert!(server.contains("<a href=\"/handbook/ja/guide\" hreflang=\"ja\">ja</a>"));
}

#[test]
fn test_every_route_matches_first_paint() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "docs/index.md", "# Home\n\n:::tabs\n@tab One\n1\n@tab Two\n2\n:::\n");
    write(temp.path(), "docs/en/steps.md", ":::steps\n1. First\n2. Second\n:::\n");
    write(temp.path(), "docs/en/tree.md", ":::files\nsrc/\n  lib.rs\n:::\n");
    let config = config();
    let (entry, data) = server_entry(temp.path(), &config);

    for route in &data.routes {
        let server = entry.render(&route.url_path).unwrap().markup;
        let client = ClientApp::new(
            Arc::clone(&data),
            Arc::new(NullSearch),
            &data.meta.href(&route.url_path),
        )
        .first_paint()
        .unwrap();
        assert_eq!(parity::compare(&server, &client), Ok(()), "route {}", route.url_path);
    }
}

#[test]
fn test_interaction_breaks_parity() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "docs/index.md", "# Home\n");
    let config = config();
    let (entry, data) = server_entry(temp.path(), &config);
    let server = entry.render("/").unwrap().markup;

    let mut app = ClientApp::new(data, Arc::new(NullSearch), "/handbook/");
    app.mount();
    app.open_search("install");
    let mismatch = parity::compare(&server, &app.render().unwrap().to_html()).unwrap_err();

    assert!(mismatch.server.contains("aria-expanded=\"false\""));
    assert!(mismatch.client.contains("aria-expanded=\"true\""));
}
