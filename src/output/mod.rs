pub mod table;

use crate::api::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Xml,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".xml") {
        return Some(OutputFormat::Xml);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Explicit format wins, then the file extension, then plain text.
pub fn resolve_format(explicit: Option<&str>, path: &str) -> Result<OutputFormat, String> {
    match explicit {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or xml")),
        None => Ok(infer_format_from_path(path).unwrap_or(OutputFormat::Text)),
    }
}

pub fn render(format: OutputFormat, records: &[Record]) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(records),
        OutputFormat::Json => render_json(records),
        OutputFormat::Xml => render_xml(records),
    }
}

pub fn render_text(records: &[Record]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&r.id.to_string());
        out.push('\t');
        out.push_str(&r.title);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(records: &[Record]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_xml(records: &[Record]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str("<artworks>\n");
    for r in records {
        out.push_str(&format!("  <artwork id=\"{}\">\n", r.id));
        let fields = [
            ("title", &r.title),
            ("place_of_origin", &r.place_of_origin),
            ("artist_display", &r.artist_display),
            ("inscriptions", &r.inscriptions),
            ("date_start", &r.date_start),
            ("date_end", &r.date_end),
        ];
        for (name, value) in fields {
            out.push_str(&format!("    <{name}>{}</{name}>\n", escape_xml(value)));
        }
        out.push_str("  </artwork>\n");
    }
    out.push_str("</artworks>\n");
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::record;

    #[test]
    fn format_resolution_prefers_explicit() {
        assert_eq!(resolve_format(Some("xml"), "out.json"), Ok(OutputFormat::Xml));
        assert_eq!(resolve_format(None, "out.JSON"), Ok(OutputFormat::Json));
        assert_eq!(resolve_format(None, "selection"), Ok(OutputFormat::Text));
        assert!(resolve_format(Some("html"), "out.html").is_err());
    }

    #[test]
    fn text_lists_id_and_title() {
        let mut r = record(7);
        r.title = "Nighthawks".to_string();
        assert_eq!(render_text(&[r]), b"7\tNighthawks\n".to_vec());
    }

    #[test]
    fn json_keeps_api_field_names() {
        let out = String::from_utf8(render_json(&[record(3)])).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["id"], 3);
        assert!(parsed[0].get("place_of_origin").is_some());
    }

    #[test]
    fn xml_escapes_text() {
        let mut r = record(1);
        r.inscriptions = "signed <l.r.> \"A & B\"".to_string();
        let out = String::from_utf8(render_xml(&[r])).unwrap();
        assert!(out.contains("<inscriptions>signed &lt;l.r.&gt; &quot;A &amp; B&quot;</inscriptions>"));
        assert!(out.contains("<artwork id=\"1\">"));
    }
}
