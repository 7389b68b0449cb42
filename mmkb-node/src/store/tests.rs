#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::models::SourceDocument;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, KnowledgeStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path().join("knowledge_base.db"));
        store.init().unwrap();
        (dir, store)
    }

    fn seeded_store() -> (TempDir, KnowledgeStore) {
        let (dir, store) = test_store();
        store.add("forest.txt", "Forests cover 31% of land.").unwrap();
        store.add("ocean.txt", "Oceans cover most of Earth.").unwrap();
        (dir, store)
    }

    struct BrokenMatcher;

    impl Matcher for BrokenMatcher {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn find(&self, conn: &Connection, _query: &str, _limit: usize) -> rusqlite::Result<Vec<SourceDocument>> {
            conn.prepare("SELECT file_name FROM missing_index")?;
            Ok(vec![])
        }
    }

    mod sanitize_tests {
        use super::*;

        #[test]
        fn test_sanitize_strips_punctuation() {
            assert_eq!(sanitize_query("What's   the (forest) cover?"), "What s the forest cover");
            assert_eq!(sanitize_query("  multi\n\tline  "), "multi line");
        }

        #[test]
        fn test_sanitize_empty_uses_placeholder() {
            assert_eq!(sanitize_query(""), PLACEHOLDER_QUERY);
            assert_eq!(sanitize_query("???"), "data");
            assert_eq!(sanitize_query("  \n "), "data");
        }

        #[test]
        fn test_sanitize_keeps_unicode_letters() {
            assert_eq!(sanitize_query("chính sách!"), "chính sách");
        }
    }

    mod store_tests {
        use super::*;

        #[test]
        fn test_init_is_idempotent() {
            let (_dir, store) = test_store();
            store.add("doc1", "hello world").unwrap();

            store.init().unwrap();
            store.init().unwrap();

            assert_eq!(store.all_text().unwrap(), "hello world");
        }

        #[test]
        fn test_add_then_search_round_trip() {
            let (_dir, store) = test_store();
            store.add("doc1", "hello world").unwrap();

            let results = store.search("hello", 5).unwrap();
            assert!(results.contains(&SourceDocument::new("doc1", "hello world")));
        }

        #[test]
        fn test_duplicate_names_are_kept() {
            let (_dir, store) = test_store();
            store.add("notes.txt", "first draft about rivers").unwrap();
            store.add("notes.txt", "second draft about rivers").unwrap();

            let results = store.search("rivers", 5).unwrap();
            assert_eq!(results.len(), 2);
        }

        #[test]
        fn test_search_respects_limit() {
            let (_dir, store) = test_store();
            for i in 0..8 {
                store.add(&format!("doc{}", i), "shared keyword").unwrap();
            }

            assert_eq!(store.search("keyword", 5).unwrap().len(), 5);
            assert_eq!(store.search("keyword", 3).unwrap().len(), 3);
        }

        #[test]
        fn test_forest_ocean_scenario() {
            let (_dir, store) = seeded_store();

            let results = store.search("forest", 5).unwrap();
            assert_eq!(
                results,
                vec![SourceDocument::new("forest.txt", "Forests cover 31% of land.")]
            );

            assert!(store.search("xyz123", 5).unwrap().is_empty());
        }

        #[test]
        fn test_empty_and_punctuation_queries_match_placeholder() {
            let (_dir, store) = seeded_store();
            store.add("data.csv", "raw data export").unwrap();

            let placeholder = store.search("data", 5).unwrap();
            assert!(!placeholder.is_empty());
            assert_eq!(store.search("", 5).unwrap(), placeholder);
            assert_eq!(store.search("???", 5).unwrap(), placeholder);
        }

        #[test]
        fn test_all_text_in_storage_order() {
            let (_dir, store) = seeded_store();
            assert_eq!(
                store.all_text().unwrap(),
                "Forests cover 31% of land. Oceans cover most of Earth."
            );
        }

        #[test]
        fn test_add_with_source_writes_metadata() {
            let (_dir, store) = test_store();
            store
                .add_with_source("talk.mp3", "/uploads/talk.mp3", "transcribed talk")
                .unwrap();

            assert_eq!(
                store.sources().unwrap(),
                vec![("talk.mp3".to_string(), "/uploads/talk.mp3".to_string())]
            );
            assert_eq!(store.search("transcribed", 5).unwrap().len(), 1);
        }

        #[test]
        fn test_search_before_init_returns_empty() {
            let dir = tempfile::tempdir().unwrap();
            let store = KnowledgeStore::new(dir.path().join("fresh.db"));

            // Both tiers fail on the missing table; the result is still a list
            assert!(store.search("anything", 5).unwrap().is_empty());
        }
    }

    mod degradation_tests {
        use super::*;

        #[test]
        fn test_broken_primary_falls_back_to_substring() {
            let dir = tempfile::tempdir().unwrap();
            let db_path = dir.path().join("kb.db");
            let store = KnowledgeStore::with_search(
                &db_path,
                TieredSearch::new(Box::new(BrokenMatcher), Box::new(SubstringMatcher)),
            );
            store.init().unwrap();
            store.add("forest.txt", "Forests cover 31% of land.").unwrap();
            store.add("ocean.txt", "Oceans cover most of Earth.").unwrap();

            let results = store.search("cover!", 5).unwrap();

            let conn = store.connect().unwrap();
            let expected = SubstringMatcher.find(&conn, "cover", 5).unwrap();
            assert_eq!(results, expected);
            assert_eq!(results.len(), 2);
        }

        #[test]
        fn test_operator_only_query_degrades() {
            let (_dir, store) = test_store();
            store.add("a.txt", "salt AND pepper").unwrap();
            store.add("b.txt", "just salt").unwrap();

            // A bare FTS5 operator is a syntax error for the index
            let results = store.search("AND", 5).unwrap();

            let conn = store.connect().unwrap();
            let expected = SubstringMatcher.find(&conn, "AND", 5).unwrap();
            assert_eq!(results, expected);
            assert_eq!(results, vec![SourceDocument::new("a.txt", "salt AND pepper")]);
        }

        #[test]
        fn test_substring_matcher_is_independent() {
            let (_dir, store) = seeded_store();
            let conn = store.connect().unwrap();

            let results = SubstringMatcher.find(&conn, "Earth", 5).unwrap();
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].name, "ocean.txt");
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_context_renders_matches() {
            let (_dir, store) = seeded_store();
            let builder = ContextBuilder::new(store);

            assert_eq!(
                builder.build_context("forest"),
                "From forest.txt:\nForests cover 31% of land.\n"
            );
        }

        #[test]
        fn test_context_joins_matches_with_newline() {
            let (_dir, store) = seeded_store();
            let builder = ContextBuilder::new(store);

            assert_eq!(
                builder.build_context("cover"),
                "From forest.txt:\nForests cover 31% of land.\n\nFrom ocean.txt:\nOceans cover most of Earth.\n"
            );
        }

        #[test]
        fn test_context_falls_back_to_corpus() {
            let (_dir, store) = seeded_store();
            let builder = ContextBuilder::new(store);

            assert_eq!(
                builder.build_context("xyz123"),
                "Forests cover 31% of land. Oceans cover most of Earth."
            );
        }

        #[test]
        fn test_context_empty_store() {
            let (_dir, store) = test_store();
            let builder = ContextBuilder::new(store);

            let context = builder.build_context_with("anything", 10);
            assert!(context.chars().count() <= 10);
            assert_eq!(context, "");
        }

        #[test]
        fn test_context_truncation_is_bounded_and_deterministic() {
            let (_dir, store) = test_store();
            for name in ["one.txt", "two.txt", "three.txt"] {
                store.add(name, &format!("keyword {}", "lorem ipsum ".repeat(40))).unwrap();
            }
            let builder = ContextBuilder::new(store);

            let first = builder.build_context_with("keyword", 1000);
            let second = builder.build_context_with("keyword", 1000);
            assert_eq!(first.chars().count(), 1000);
            assert_eq!(first, second);
            assert!(first.starts_with("From one.txt:\nkeyword lorem"));
        }

        #[test]
        fn test_truncate_chars_respects_char_boundaries() {
            assert_eq!(context::truncate_chars("héllo wörld", 7), "héllo w");
            assert_eq!(context::truncate_chars("short", 3000), "short");
            assert_eq!(context::truncate_chars("", 5), "");
        }
    }
}
