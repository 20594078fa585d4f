use std::collections::HashSet;

/// Parses `1,2, 3` into identifiers, keeping first-seen order and dropping
/// repeats.
pub fn parse_id_list_csv(value: &str) -> Result<Vec<u64>, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("id list is empty".to_string());
    }
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for part in raw.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        let id: u64 = item.parse().map_err(|_| format!("invalid id '{item}'"))?;
        if seen.insert(id) {
            out.push(id);
        }
    }
    if out.is_empty() {
        return Err("id list is empty".to_string());
    }
    Ok(out)
}

pub fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
