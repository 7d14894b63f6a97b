mod common;

use assert2::{check, let_assert};
use common::{IsolatedIndex, TempWorkspace, isolated_index, reference_payload};
use docindex_mcp::tools::{
    ListPagesRequest, LoadIndexRequest, ReadSectionRequest, ValidateRequest, handle_list_pages,
    handle_load_index, handle_read_section, handle_validate,
};
use docindex_mcp::{Config, IndexState};
use rstest::rstest;
use std::sync::Arc;

async fn load(state: &Arc<IndexState>, path: &std::path::Path) -> String {
    let request = LoadIndexRequest {
        path: path.display().to_string(),
    };
    let result = handle_load_index(state, request).await;
    let_assert!(Ok(output) = result);
    output
}

fn read(location: &str, page: Option<&str>) -> ReadSectionRequest {
    ReadSectionRequest {
        location: location.to_string(),
        page: page.map(str::to_string),
        index: None,
    }
}

// --- load_index ---

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_index_summarises_the_payload(isolated_index: IsolatedIndex) {
    let output = load(&isolated_index.state, &isolated_index.payload).await;

    check!(output.contains("Loaded search index 'Deconvolution.jl'"));
    check!(output.contains("Records: 68"));
    check!(output.contains("Pages: 1"));
    check!(output.contains("page: 52"));
    check!(output.contains("section: 16"));
    check!(!output.contains("⚠"));
    check!(isolated_index.state.active().await.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_index_accepts_a_build_directory(isolated_index: IsolatedIndex) {
    let build_dir = isolated_index.workspace.path().join("build");
    let output = load(&isolated_index.state, &build_dir).await;
    check!(output.contains("Records: 68"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_index_prefers_the_dev_build(isolated_index: IsolatedIndex) {
    let workspace = &isolated_index.workspace;
    workspace.copy_file(&reference_payload(), "site/dev/search_index.js");
    workspace.create_file(
        "site/v0.1.0/search_index.js",
        r#"var documenterSearchIndex = {"docs":[{"location":"","page":"Old","title":"Old","text":"","category":"page"}]}"#,
    );

    let output = load(&isolated_index.state, &workspace.path().join("site")).await;
    check!(output.contains("Records: 68"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_index_warns_about_malformed_entries(isolated_index: IsolatedIndex) {
    let path = isolated_index.workspace.create_file(
        "broken/search_index.js",
        r##"var documenterSearchIndex = {"docs":[
{"location":"#A","page":"P","title":"A","text":"","category":"section"},
{"location":"#A","page":"P","title":"A again","text":"","category":"section"},
{"page":"P","title":"no location","text":"","category":"page"}
]}"##,
    );

    let output = load(&isolated_index.state, &path).await;
    check!(output.contains("Records: 2"));
    check!(output.contains("1 malformed entry"));
    check!(output.contains("1 location(s) are used more than once"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_index_reports_missing_files(isolated_index: IsolatedIndex) {
    let request = LoadIndexRequest {
        path: isolated_index.workspace.path().join("nope.js").display().to_string(),
    };
    let_assert!(Err(message) = handle_load_index(&isolated_index.state, request).await);
    check!(message.contains("Failed to load index"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_index_rejects_non_json_payloads(isolated_index: IsolatedIndex) {
    let path = isolated_index
        .workspace
        .create_file("bad/search_index.js", "var documenterSearchIndex = {\"docs\": [}");
    let request = LoadIndexRequest {
        path: path.display().to_string(),
    };
    check!(handle_load_index(&isolated_index.state, request).await.is_err());
    check!(isolated_index.state.active().await.is_none());
}

// --- list_pages ---

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_pages_outlines_sections(isolated_index: IsolatedIndex) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let_assert!(Ok(output) = handle_list_pages(&isolated_index.state, ListPagesRequest::default()).await);
    check!(output.contains("# Deconvolution.jl (16 sections, 68 records)"));
    check!(output.contains("  • Installation `#Installation`"));
    check!(output.contains("  • Blurred image `#Blurred-image-2`"));
    check!(!output.contains("→"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_pages_links_sections_to_the_site() {
    let workspace = TempWorkspace::new();
    let config = Config {
        base_url: Some("https://example.org/Deconvolution.jl/dev/".to_string()),
        reload_interval_secs: 0,
        cache_dir: Some(workspace.path().join("cache")),
        ..Config::default()
    };
    let state = Arc::new(IndexState::new(config));
    load(&state, &reference_payload()).await;

    let_assert!(Ok(output) = handle_list_pages(&state, ListPagesRequest::default()).await);
    check!(output.contains("→ https://example.org/Deconvolution.jl/dev/#Usage"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_pages_suggests_similar_titles(isolated_index: IsolatedIndex) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let request = ListPagesRequest {
        page: Some("Deconvolution.jj".to_string()),
        index: None,
    };
    let_assert!(Err(message) = handle_list_pages(&isolated_index.state, request).await);
    check!(message.contains("Did you mean 'Deconvolution.jl'?"));
}

// --- read_section ---

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_section_joins_body_records(isolated_index: IsolatedIndex) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let_assert!(Ok(output) = handle_read_section(&isolated_index.state, read("#Installation", None)).await);
    check!(output.starts_with("# Installation\nPage: Deconvolution.jl\n"));
    check!(output.contains("pkg> add Deconvolution\n\nOlder versions are also available"));
    check!(!output.contains("#Usage"));
}

#[rstest]
#[case("#Deconvolution.jl")]
#[case("#Wiener-deconvolution")]
#[tokio::test(flavor = "multi_thread")]
async fn read_section_without_prose(isolated_index: IsolatedIndex, #[case] location: &str) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let_assert!(Ok(output) = handle_read_section(&isolated_index.state, read(location, None)).await);
    check!(output.contains("(This section has no prose of its own.)"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_section_filters_by_page(isolated_index: IsolatedIndex) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let request = read("#License", Some("deconvolution.jl"));
    let_assert!(Ok(output) = handle_read_section(&isolated_index.state, request).await);
    check!(output.contains("Mosè Giordano"));

    let elsewhere = read("#License", Some("Other page"));
    check!(handle_read_section(&isolated_index.state, elsewhere).await.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_section_suggests_close_anchors(isolated_index: IsolatedIndex) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let_assert!(Err(message) = handle_read_section(&isolated_index.state, read("#Instalation", None)).await);
    check!(message.contains("Location '#Instalation' not found"));
    check!(message.contains("• #Installation"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_section_empty_location_needs_a_page(isolated_index: IsolatedIndex) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let_assert!(Err(message) = handle_read_section(&isolated_index.state, read("", None)).await);
    check!(message.contains("give the page title"));

    // The reference page opens with a heading, so its introduction is empty.
    let request = read("", Some("Deconvolution.jl"));
    let_assert!(Ok(output) = handle_read_section(&isolated_index.state, request).await);
    check!(output.trim_end() == "# Deconvolution.jl");
}

// --- validate_index ---

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn validate_reports_a_clean_index(isolated_index: IsolatedIndex) {
    load(&isolated_index.state, &isolated_index.payload).await;

    let_assert!(Ok(output) = handle_validate(&isolated_index.state, ValidateRequest::default()).await);
    check!(output.starts_with("Validation of 'Deconvolution.jl'"));
    check!(output.contains("No problems found."));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn validate_lists_duplicates_of_an_explicit_index(isolated_index: IsolatedIndex) {
    let path = isolated_index.workspace.create_file(
        "dup/search_index.js",
        r##"[{"location":"#A","page":"P","title":"A","text":"","category":"section"},
{"location":"#A","page":"P","title":"A","text":"","category":"section"}]"##,
    );
    let request = ValidateRequest {
        index: Some(path.display().to_string()),
    };
    let_assert!(Ok(output) = handle_validate(&isolated_index.state, request).await);
    check!(output.contains("'#A' on page 'P'"));
}

// --- reload ---

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rebuilt_payload_replaces_the_active_index(isolated_index: IsolatedIndex) {
    let state = &isolated_index.state;
    load(state, &isolated_index.payload).await;
    let_assert!(Some(before) = state.active().await);
    check!(before.index.record_count() == 68);

    let_assert!(Ok(false) = state.refresh_active().await);

    // Regenerated docs: same framing, one page record dropped.
    let source = std::fs::read_to_string(&isolated_index.payload).unwrap();
    let trimmed = source.replacen(
        r#",{"location":"","page":"Deconvolution.jl","title":"Deconvolution.jl","text":"","category":"page"}"#,
        "",
        1,
    );
    check!(trimmed.len() < source.len());
    std::fs::write(&isolated_index.payload, trimmed).unwrap();

    let_assert!(Ok(true) = state.refresh_active().await);
    let_assert!(Some(after) = state.active().await);
    check!(after.index.record_count() == 67);
    // The old snapshot is untouched.
    check!(before.index.record_count() == 68);
}
