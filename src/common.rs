use std::path::{Path, PathBuf};

/// `<dir>/<stem><suffix>.tsv` next to the input file.
pub fn sibling_output_path(input_path: &Path, suffix: &str) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|x| x.to_str())
        .unwrap_or("output");
    input_path.with_file_name(format!("{stem}{suffix}.tsv"))
}

pub fn temp_path_for(output_path: &Path) -> PathBuf {
    let file_name = output_path
        .file_name()
        .and_then(|x| x.to_str())
        .unwrap_or("output.tsv");
    output_path.with_file_name(format!("{file_name}.tmp"))
}

pub fn truncate_for_log(text: &str) -> String {
    let trimmed = text.trim();
    let max_len = 300usize;
    match trimmed.char_indices().nth(max_len) {
        None => trimmed.to_string(),
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
    }
}
