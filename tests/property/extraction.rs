//! Property-based tests for response extraction

use playgen::extraction::{BlockExtractor, CLOSING_MARKER};
use proptest::prelude::*;

const HEADING: &str = "## Интерактивный пример";

fn block(code: &str) -> String {
    format!(
        "{HEADING}\n\n<Sandpack\n  template=\"vanilla\"\n  files={{{{\n    \"/index.html\": `\n{code}\n`\n  }}}}\n/>"
    )
}

/// Source text that is safe inside a template literal, including stray `/>`
fn code_strategy() -> impl Strategy<Value = String> {
    "[a-z <>/=;\n]{0,60}"
}

fn prose_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z ,.!]{0,40}"
}

proptest! {
    #[test]
    fn output_without_closing_marker_is_rejected(raw in "\\PC{0,200}") {
        prop_assume!(!raw.contains(CLOSING_MARKER));
        prop_assert!(BlockExtractor::default().extract(&raw).is_err());
    }

    #[test]
    fn truncated_block_is_rejected(code in code_strategy(), cut in 0usize..1000) {
        let full = block(&code);
        let body_end = full.len() - CLOSING_MARKER.len();
        let boundaries: Vec<usize> = full
            .char_indices()
            .map(|(i, _)| i)
            .filter(|i| *i < body_end)
            .collect();
        let truncated = &full[..boundaries[cut % boundaries.len()]];
        prop_assert!(BlockExtractor::default().extract(truncated).is_err());
    }

    #[test]
    fn fencing_and_prose_do_not_change_the_block(
        code in code_strategy(),
        before in prose_strategy(),
        after in prose_strategy(),
        language in prop::sample::select(vec!["", "mdx", "jsx", "html", "markdown"]),
    ) {
        let extractor = BlockExtractor::default();
        let raw = block(&code);
        let plain = extractor.extract(&raw);
        prop_assert!(plain.is_ok());

        let fenced = format!("```{language}\n{raw}\n```");
        prop_assert_eq!(&extractor.extract(&fenced), &plain);

        let wrapped = format!("{before}\n\n```{language}\n{raw}\n```\n\n{after}");
        prop_assert_eq!(&extractor.extract(&wrapped), &plain);
    }

    #[test]
    fn extracted_block_always_ends_with_marker(code in code_strategy()) {
        let extracted = BlockExtractor::default().extract(&block(&code)).unwrap();
        prop_assert!(extracted.text().ends_with(CLOSING_MARKER));
        prop_assert!(extracted.text().starts_with("\n\n"));
    }
}
