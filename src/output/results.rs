//! Search result rendering

use crate::storage::SearchPage;

/// Number of content characters shown per result
const SNIPPET_CHARS: usize = 160;

/// Formats one page of search results as plain text
pub fn format_search_page(page: &SearchPage) -> String {
    let mut out = String::new();

    if page.items.is_empty() {
        out.push_str(&format!("No results for \"{}\"\n", page.query));
        return out;
    }

    out.push_str(&format!(
        "{} results for \"{}\" (page {} of {})\n\n",
        page.total,
        page.query,
        page.page,
        page.page_count()
    ));

    let first = u64::from(page.page.saturating_sub(1)) * u64::from(page.page_size);
    for (idx, item) in page.items.iter().enumerate() {
        let title = item.title.as_deref().unwrap_or(&item.url);
        out.push_str(&format!("{}. {}\n", first + idx as u64 + 1, title));
        out.push_str(&format!("   {}\n", item.url));

        let summary = item
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&item.content);
        if !summary.is_empty() {
            out.push_str(&format!("   {}\n", snippet(summary)));
        }
    }

    if page.has_next() {
        out.push_str(&format!("\nMore results on page {}\n", page.page + 1));
    }

    out
}

/// Prints one page of search results to stdout
pub fn print_search_page(page: &SearchPage) {
    print!("{}", format_search_page(page));
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{IndexedPage, SearchQuery};

    fn item(url: &str, title: Option<&str>, content: &str) -> IndexedPage {
        IndexedPage {
            id: 1,
            url: url.to_string(),
            title: title.map(str::to_string),
            content: content.to_string(),
            description: None,
            keywords: None,
            language: None,
            group: String::new(),
            content_type: None,
            indexed_at: "2024-01-01T00:00:00+00:00".to_string(),
            run_id: 1,
        }
    }

    #[test]
    fn test_no_results() {
        let page = SearchPage::empty(&SearchQuery::new("luya", 10));
        assert_eq!(format_search_page(&page), "No results for \"luya\"\n");
    }

    #[test]
    fn test_numbering_continues_across_pages() {
        let query = SearchQuery::new("luya", 2).with_page(2);
        let page = SearchPage {
            total: 5,
            items: vec![
                item("https://example.com/c", Some("Third"), "body"),
                item("https://example.com/d", None, ""),
            ],
            ..SearchPage::empty(&query)
        };

        let text = format_search_page(&page);

        assert!(text.starts_with("5 results for \"luya\" (page 2 of 3)"));
        assert!(text.contains("3. Third\n   https://example.com/c\n   body\n"));
        assert!(text.contains("4. https://example.com/d\n"));
        assert!(text.ends_with("More results on page 3\n"));
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "ä".repeat(SNIPPET_CHARS + 5);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), SNIPPET_CHARS + 3);
        assert!(cut.ends_with("..."));
    }
}
