//! HTML index page

use std::collections::BTreeMap;
use std::fmt::Write;

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const SCRIPT: &str = r#"
document.getElementById("translate-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const output = document.getElementById("output");
  output.textContent = "Translating...";
  const response = await fetch("/translate", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({
      src_lang: document.getElementById("src_lang").value,
      tgt_lang: document.getElementById("tgt_lang").value,
      text: document.getElementById("text").value,
    }),
  });
  const body = await response.json();
  output.textContent = response.ok ? body.translated_text : "Error: " + body.error;
});
"#;

/// Render the index page listing the supported languages
pub fn render_index(languages: &BTreeMap<String, String>) -> String {
    let mut options = String::new();
    let mut rows = String::new();
    for (code, name) in languages {
        let (code, name) = (escape_html(code), escape_html(name));
        let _ = writeln!(options, r#"<option value="{code}">{name}</option>"#);
        let _ = writeln!(rows, "<tr><td><code>{code}</code></td><td>{name}</td></tr>");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Translator</title>
</head>
<body>
<h1>Translator</h1>
<form id="translate-form">
<label>From <select id="src_lang">
{options}</select></label>
<label>To <select id="tgt_lang">
{options}</select></label>
<br>
<textarea id="text" rows="8" cols="80"></textarea>
<br>
<button type="submit">Translate</button>
</form>
<pre id="output"></pre>
<h2>Supported languages</h2>
<table>
<tr><th>Code</th><th>Language</th></tr>
{rows}</table>
<script>{script}</script>
</body>
</html>
"#,
        script = SCRIPT
    )
}
