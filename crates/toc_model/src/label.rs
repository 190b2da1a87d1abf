//! Labels shown for bookmark items

use crate::TocItem;
use std::path::Path;

/// Text a tree view shows for an item: the title followed by its page
/// range and, for documents, the file name.
pub fn display_label(item: &TocItem) -> String {
    let start = item.page_number();
    if start == 0 {
        return item.title().to_string();
    }
    let end = item.end_page_number();
    let file = item
        .kind()
        .source_path()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned());

    match (file, end > start) {
        (Some(file), true) => format!("{} [file: {}, pages {}-{}]", item.title(), file, start, end),
        (Some(file), false) => format!("{} [file: {}, page {}]", item.title(), file, start),
        (None, true) => format!("{} [pages {}-{}]", item.title(), start, end),
        (None, false) => format!("{} [page {}]", item.title(), start),
    }
}
