//! The search page: the DOM surface the panel binds to, plus its bootstrap.

use crate::config::ServerConfig;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>livesearch</title>
<link rel="stylesheet" href="/static/livesearch.css">
</head>
<body>
%HEADER%
<div id="searcharea">
  <input type="text" id="searchbox" name="q" autocomplete="off" autofocus placeholder="Search code">
  <select id="case-sensitivity-toggle" name="fold_case" aria-label="Case sensitivity">
    <option value="auto">auto case</option>
    <option value="false">match case</option>
    <option value="true">ignore case</option>
  </select>
  <button type="button" id="toggle-regex" name="regex" data-selected="false">regex</button>
  <button type="button" id="toggle-context" name="context" data-selected="true">context</button>
</div>
<div id="resultarea">
  <div id="results"></div>
</div>
%FOOTER%
<script type="module">
import wasmInit, { init } from "/static/pkg/livesearch_web.js";
await wasmInit();
init(%INIT_DATA%);
</script>
</body>
</html>
"#;

/// JSON handed to the panel's `init`.
pub fn init_data(config: &ServerConfig) -> String {
    let data = serde_json::json!({ "results_path": config.results_path });
    // Keep the payload from closing the surrounding <script>.
    data.to_string().replace("</", "<\\/")
}

/// Render the page once; it only depends on configuration.
pub fn render_search_page(config: &ServerConfig) -> String {
    PAGE_TEMPLATE
        .replace("%HEADER%", &config.header_html)
        .replace("%FOOTER%", &config.footer_html)
        .replace("%INIT_DATA%", &init_data(config))
}
