use chartsmith::StatementSanitizer;
use proptest::prelude::*;

fn bound_count(text: &str) -> usize {
    text.to_uppercase().matches("FETCH FIRST").count()
}

proptest! {
    #[test]
    fn output_never_carries_a_separator(raw in any::<String>()) {
        let out = StatementSanitizer::default().sanitize(&raw);
        prop_assert!(!out.as_str().contains(';'), "got {:?}", out.as_str());
    }

    #[test]
    fn unbounded_input_gets_exactly_one_bound(raw in any::<String>()) {
        prop_assume!(!raw.to_uppercase().contains("FETCH FIRST"));

        let out = StatementSanitizer::default().sanitize(&raw);
        prop_assert_eq!(bound_count(out.as_str()), 1, "got {:?}", out.as_str());
    }

    #[test]
    fn keyword_free_text_gets_the_fallback(raw in "[^sS]{0,200}") {
        let out = StatementSanitizer::default().sanitize(&raw);
        prop_assert_eq!(
            out.as_str(),
            "SELECT * FROM DUAL FETCH FIRST 100 ROWS ONLY"
        );
    }

    #[test]
    fn only_text_before_the_first_separator_survives(
        column in "[a-z]{1,12}",
        junk in "[A-Za-z0-9 ]{0,40}"
    ) {
        prop_assume!(!junk.to_uppercase().contains("DROP"));

        let raw = format!("SELECT {column} FROM t; DROP TABLE users; {junk}");
        let out = StatementSanitizer::default().sanitize(&raw);

        let expected_prefix = format!("SELECT {column} FROM t");
        prop_assert!(out.as_str().starts_with(&expected_prefix));
        prop_assert!(!out.as_str().to_uppercase().contains("DROP TABLE"));
    }

    #[test]
    fn well_formed_statement_is_a_fixed_point(
        column in "[a-z]{1,12}",
        table in "[a-z]{1,12}",
        rows in 1u32..5000
    ) {
        let statement = format!("SELECT {column} FROM {table} FETCH FIRST {rows} ROWS ONLY");
        let sanitizer = StatementSanitizer::default();

        let once = sanitizer.sanitize(&statement);
        prop_assert_eq!(once.as_str(), statement.as_str());

        let twice = sanitizer.sanitize(once.as_str());
        prop_assert_eq!(twice.as_str(), once.as_str());
    }
}
