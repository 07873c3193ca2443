//! Turns a chain answer into the HTML bullet list returned by `/api/chat`.

use crate::config::CitationStyle;
use crate::models::{ScoredChunk, SourceRef};

/// Prepended to every question before it reaches the chain.
pub const BULLET_INSTRUCTION: &str = "Answer the following question in bullet points. \
For each point, mention the file and page number if available.";

pub fn bullet_prompt(question: &str) -> String {
    format!("{}\n\nQuestion: {}", BULLET_INSTRUCTION, question)
}

/// One citation per retrieved chunk, in rank order.
pub fn sources_for(chunks: &[ScoredChunk]) -> Vec<SourceRef> {
    chunks
        .iter()
        .filter(|c| !c.chunk.metadata.source.is_empty())
        .map(|c| SourceRef::from_metadata(&c.chunk.metadata))
        .collect()
}

/// Render the answer as `<ul>` items with source links.
///
/// Blank lines are dropped and bullet markers (`-`, `*`, `•`) stripped.
/// With [`CitationStyle::Positional`] line `i` links to `sources[i]`; the
/// two lists are not otherwise related. If nothing is left after cleanup
/// the raw answer is returned.
pub fn format_answer(answer: &str, sources: &[SourceRef], style: CitationStyle) -> String {
    let lines: Vec<&str> = answer
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(strip_bullet)
        .collect();

    if lines.is_empty() {
        return answer.to_string();
    }

    let mut items: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut point = html_escape::encode_text(line).into_owned();
            if style == CitationStyle::Positional {
                if let Some(src) = sources.get(i) {
                    point.push(' ');
                    point.push_str(&format!("({})", source_link(src)));
                }
            }
            format!("<li>{}</li>", point)
        })
        .collect();

    if style == CitationStyle::Appended && !sources.is_empty() {
        let mut seen: Vec<&SourceRef> = Vec::new();
        for src in sources {
            if !seen.iter().any(|s| s.file == src.file && s.page == src.page) {
                seen.push(src);
            }
        }
        let links: Vec<String> = seen.iter().map(|s| source_link(s)).collect();
        items.push(format!("<li>Sources: {}</li>", links.join(", ")));
    }

    format!("<ul>\n{}\n</ul>", items.join("\n"))
}

fn source_link(src: &SourceRef) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\">{} p.{}</a>",
        html_escape::encode_double_quoted_attribute(&src.link),
        html_escape::encode_text(&src.file),
        src.page
    )
}

fn strip_bullet(line: &str) -> &str {
    line.trim_matches(|c| matches!(c, '-' | '*' | '•' | ' '))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, PageMetadata};

    fn src(file: &str, page: u32) -> SourceRef {
        SourceRef::from_metadata(&PageMetadata {
            source: file.to_string(),
            page,
        })
    }

    #[test]
    fn test_bullet_prompt() {
        assert_eq!(
            bullet_prompt("What is RAG?"),
            "Answer the following question in bullet points. For each point, mention the file \
             and page number if available.\n\nQuestion: What is RAG?"
        );
    }

    #[test]
    fn test_source_link_format() {
        let s = src("guide.pdf", 7);
        assert_eq!(s.link, "/files/guide.pdf#page=7");
    }

    #[test]
    fn test_positional_pairing() {
        let answer = "- First point\n\n* Second point\n• Third point";
        let sources = vec![src("a.pdf", 1), src("b.pdf", 2)];
        let html = format_answer(answer, &sources, CitationStyle::Positional);
        assert_eq!(
            html,
            "<ul>\n\
             <li>First point (<a href=\"/files/a.pdf#page=1\" target=\"_blank\">a.pdf p.1</a>)</li>\n\
             <li>Second point (<a href=\"/files/b.pdf#page=2\" target=\"_blank\">b.pdf p.2</a>)</li>\n\
             <li>Third point</li>\n\
             </ul>"
        );
    }

    #[test]
    fn test_blank_answer_returned_raw() {
        assert_eq!(format_answer("  \n\n", &[], CitationStyle::Positional), "  \n\n");
        assert_eq!(format_answer("", &[src("a.pdf", 1)], CitationStyle::Appended), "");
    }

    #[test]
    fn test_appended_style_dedupes_sources() {
        let sources = vec![src("a.pdf", 1), src("a.pdf", 1), src("b.pdf", 3)];
        let html = format_answer("one\ntwo", &sources, CitationStyle::Appended);
        assert!(html.contains("<li>one</li>\n<li>two</li>"));
        assert_eq!(html.matches("a.pdf p.1").count(), 1);
        assert!(html.contains("<li>Sources: <a href=\"/files/a.pdf#page=1\""));
        assert!(html.contains("b.pdf p.3"));
    }

    #[test]
    fn test_answer_text_is_escaped() {
        let html = format_answer("use <script> & run", &[], CitationStyle::Positional);
        assert_eq!(html, "<ul>\n<li>use &lt;script&gt; &amp; run</li>\n</ul>");
    }

    #[test]
    fn test_file_names_escaped_in_links() {
        let sources = vec![src("a&b \"q\".pdf", 2)];
        let html = format_answer("point", &sources, CitationStyle::Positional);
        assert!(html.contains("href=\"/files/a%26b%20%22q%22.pdf#page=2\""), "{}", html);
        assert!(html.contains(">a&amp;b \"q\".pdf p.2</a>"), "{}", html);
    }

    #[test]
    fn test_sources_for_keeps_rank_order() {
        let chunks = vec![
            ScoredChunk {
                chunk: Chunk {
                    text: "x".into(),
                    metadata: PageMetadata {
                        source: "z.pdf".into(),
                        page: 9,
                    },
                },
                score: 0.9,
            },
            ScoredChunk {
                chunk: Chunk {
                    text: "y".into(),
                    metadata: PageMetadata {
                        source: "a.pdf".into(),
                        page: 1,
                    },
                },
                score: 0.5,
            },
        ];
        let sources = sources_for(&chunks);
        assert_eq!(sources, vec![src("z.pdf", 9), src("a.pdf", 1)]);
    }
}
