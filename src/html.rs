//! Admin page markup.

use std::fmt::Write as _;

use crate::model::LinkEntry;

const LIST_SLOT: &str = "__KV_LIST_FORM__";
pub const EMPTY_PLACEHOLDER: &str = "<p>No key-value pairs found.</p>";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>KV Manager</title>
    <style>
        body { background-color: #121212; color: #e0e0e0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; margin: 0; padding: 20px; }
        .container { max-width: 800px; margin: 0 auto; }
        h1 { color: #ffffff; border-bottom: 2px solid #333; padding-bottom: 10px; }
        .form-container, .kv-item, .bulk-actions-container { background-color: #1e1e1e; border: 1px solid #333; border-radius: 8px; padding: 20px; margin-bottom: 20px; }
        input[type="text"], input[type="url"] { width: 100%; padding: 10px; margin: 5px 0 15px 0; background-color: #333; border: 1px solid #555; border-radius: 4px; color: #e0e0e0; box-sizing: border-box; }
        .btn { padding: 10px 15px; border: none; border-radius: 4px; cursor: pointer; font-size: 16px; }
        .btn-primary { background-color: #007bff; color: white; }
        .btn-danger { background-color: #dc3545; color: white; }
        .kv-item { display: flex; align-items: center; }
        .kv-content { flex-grow: 1; margin-left: 15px; }
        .kv-key { font-weight: bold; font-size: 1.1em; color: #bb86fc; }
        .kv-value { word-break: break-all; color: #a0a0a0; }
        .kv-checkbox { transform: scale(1.5); }
        .bulk-actions-container { display: flex; align-items: center; }
    </style>
</head>
<body>
    <div class="container">
        <h1>KV Namespace Manager</h1>
        <div class="form-container">
            <form method="POST">
                <input type="text" name="key" placeholder="Key" required>
                <input type="url" name="value" placeholder="Value (URL)" required>
                <button type="submit" class="btn btn-primary">Add/Update Entry</button>
            </form>
        </div>
        __KV_LIST_FORM__
    </div>
    <script>
        const selectAll = document.getElementById('select-all');
        if (selectAll) {
            selectAll.addEventListener('change', function () {
                document.querySelectorAll('.kv-checkbox').forEach(cb => { cb.checked = this.checked; });
            });
        }
    </script>
</body>
</html>
"#;

/// Escapes text for both element content and quoted attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_list(entries: &[LinkEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    let mut rows = String::new();
    for e in entries {
        let key = escape(&e.key);
        let _ = write!(
            rows,
            r#"<div class="kv-item"><input type="checkbox" name="keys_to_delete" value="{key}" class="kv-checkbox"><div class="kv-content"><div class="kv-key">{key}</div><div class="kv-value">{value}</div></div></div>"#,
            value = escape(&e.value),
        );
    }

    format!(
        r#"<form method="POST"><input type="hidden" name="action" value="bulk_delete"><div class="bulk-actions-container"><input type="checkbox" id="select-all" class="kv-checkbox" style="margin-right: 10px;"><label for="select-all" style="margin-right: 20px;">Select All</label><button type="submit" class="btn btn-danger">Delete Selected</button></div>{rows}</form>"#
    )
}

pub fn render_page(entries: &[LinkEntry]) -> String {
    PAGE_TEMPLATE.replace(LIST_SLOT, &render_list(entries))
}
