//! Embedded source maps.
//!
//! grass does not emit mappings, so the map carries the original source
//! (`sourcesContent`) without segment mappings. Browsers still show the
//! stylesheet source in devtools.

use base64::Engine as _;
use camino::Utf8Path;
use facet::Facet;

/// Source map v3
#[derive(Debug, Facet)]
#[facet(rename_all = "camelCase")]
struct SourceMap {
    version: u8,
    file: String,
    sources: Vec<String>,
    sources_content: Vec<String>,
    names: Vec<String>,
    mappings: String,
}

/// Build the `/*# sourceMappingURL=data:... */` comment for `source_path`.
pub fn embedded_comment(source_path: &Utf8Path, source: &str, css_file: &str) -> Option<String> {
    let map = SourceMap {
        version: 3,
        file: css_file.to_string(),
        sources: vec![format!("file://{source_path}")],
        sources_content: vec![source.to_string()],
        names: Vec::new(),
        mappings: String::new(),
    };
    let json = match facet_json::to_string(&map) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(%source_path, "failed to serialize source map: {e}");
            return None;
        }
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(json.as_bytes());
    Some(format!(
        "/*# sourceMappingURL=data:application/json;charset=utf-8;base64,{encoded} */"
    ))
}

/// Append the embedded map comment on its own line.
pub fn embed(css: &mut String, source_path: &Utf8Path, source: &str, css_file: &str) {
    let Some(comment) = embedded_comment(source_path, source, css_file) else {
        return;
    };
    if !css.is_empty() && !css.ends_with('\n') {
        css.push('\n');
    }
    css.push_str(&comment);
    css.push('\n');
}
