// In-page find helpers - pure string building, no Tauri imports.
// Webviews expose no native find API, so the active surface evaluates these scripts.

/// Script that highlights the next match of `term`, wrapping at the end of the page.
///
/// An empty term only clears the selection, matching a find for "" in a browser.
pub fn find_script(term: &str) -> String {
    // serde_json quoting makes the term a safe JS string literal.
    let literal = serde_json::to_string(term).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"(function() {{
    var term = {literal};
    var sel = window.getSelection();
    if (!term) {{ if (sel) sel.removeAllRanges(); return false; }}
    if (window.__lilgptFindTerm !== term) {{
        if (sel) sel.removeAllRanges();
        window.__lilgptFindTerm = term;
    }}
    return window.find(term, false, false, true, false, false, false);
}})();"#
    )
}

/// Script that ends a find session and clears the highlighted selection.
pub fn stop_find_script() -> &'static str {
    r#"(function() {
    window.__lilgptFindTerm = undefined;
    var sel = window.getSelection();
    if (sel) sel.removeAllRanges();
})();"#
}
