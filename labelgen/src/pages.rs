//! Static detail/index pages. Thin display wrappers: they render the row
//! they are given and carry no state of their own.

use label_core::{Row, scalar_text};

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Fields for one detail page: preferred fields first (those present in
/// the row), then the remaining fields in row order. Blank cells render
/// as empty inputs rather than being dropped.
pub fn ordered_fields(row: &Row, prefer: &[String]) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(row.len());
    let mut used: Vec<&str> = Vec::new();
    for key in prefer {
        if let Some(value) = row.get(key) {
            out.push((key.clone(), scalar_text(value).unwrap_or_default()));
            used.push(key);
        }
    }
    for (key, value) in row {
        if !used.contains(&key.as_str()) {
            out.push((key.clone(), scalar_text(value).unwrap_or_default()));
        }
    }
    out
}

pub fn detail_page(title: &str, fields: &[(String, String)]) -> String {
    let mut form_rows = String::new();
    for (name, value) in fields {
        form_rows.push_str(&format!(
            r#"
        <div class="mb-3 row">
          <label class="col-sm-3 col-form-label fw-semibold">{}</label>
          <div class="col-sm-9">
            <input type="text" class="form-control" value="{}" readonly>
          </div>
        </div>"#,
            html_escape(name),
            html_escape(value)
        ));
    }
    format!(
        r#"<!doctype html>
<html lang="th">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet">
    <style>
      body{{background:#f8fafc}}
      .card{{max-width:880px;margin:32px auto;border-radius:16px;box-shadow:0 6px 24px rgba(0,0,0,.06)}}
      .card-header{{background:#0d6efd;color:white;border-top-left-radius:16px;border-top-right-radius:16px}}
      .col-form-label{{color:#334155}}
      .form-control[readonly]{{background:#fff}}
    </style>
  </head>
  <body>
    <div class="card">
      <div class="card-header">
        <h4 class="m-0">{title}</h4>
      </div>
      <div class="card-body">
        {form_rows}
      </div>
    </div>
  </body>
</html>"#,
        title = html_escape(title),
        form_rows = form_rows
    )
}

/// Index page over `(identifier, file name)` pairs, in batch order.
pub fn index_page(entries: &[(String, String)]) -> String {
    let mut out = String::from(
        "<!doctype html><meta charset='utf-8'><title>Asset labels – index</title>\
         <h2>Asset labels</h2><ol>",
    );
    for (identifier, file_name) in entries {
        out.push_str(&format!(
            "<li><a href='{}'>{}</a></li>",
            html_escape(file_name),
            html_escape(identifier)
        ));
    }
    out.push_str("</ol>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(json: &str) -> Row {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn preferred_fields_come_first_then_row_order() {
        let r = row(r#"{"z": "1", "Name": "scope", "a": null, "AssetID": "LAB-1"}"#);
        let prefer = vec!["AssetID".to_string(), "Name".to_string(), "Gone".to_string()];
        let fields = ordered_fields(&r, &prefer);
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["AssetID", "Name", "z", "a"]);
        assert_eq!(fields[3].1, "");
    }

    #[test]
    fn detail_page_escapes_values() {
        let html = detail_page("A<b>", &[("f".to_string(), "x & y".to_string())]);
        assert!(html.contains("A&lt;b&gt;"));
        assert!(html.contains("x &amp; y"));
        assert!(!html.contains("A<b>"));
    }

    #[test]
    fn index_links_every_entry_in_order() {
        let html = index_page(&[
            ("LAB-1".to_string(), "LAB-1.html".to_string()),
            ("LAB 1".to_string(), "LAB-1-2.html".to_string()),
        ]);
        assert!(html.contains("href='LAB-1.html'>LAB-1<"));
        assert!(html.contains("href='LAB-1-2.html'>LAB 1<"));
    }
}
