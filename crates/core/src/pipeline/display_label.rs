use std::path::Path;

/// Derives a display name from an uploaded filename.
///
/// Strips the directory and extension, turns `_`/`-` separators into
/// spaces, and title-cases each word. `"Unknown"` when nothing usable
/// remains.
pub fn label_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned = stem.replace(['_', '-'], " ");
    let words: Vec<String> = cleaned.split_whitespace().map(title_case).collect();

    if words.is_empty() {
        "Unknown".to_string()
    } else {
        words.join(" ")
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
