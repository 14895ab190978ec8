/// Edge case tests for statement extraction and value tokenizing.
///
/// These tests cover:
/// - Batch separators in odd positions and casing
/// - Statements spanning many lines
/// - Bracketed and schema-qualified identifiers
/// - Quotes, doubled quotes and commas inside literals
/// - Malformed values blocks

#[cfg(test)]
mod edge_case_tests {
    use crate::parser::{
        classify, extract, split_batches, split_fields, split_tuples, Literal, ParseError,
    };

    // =========================================================================
    // A. Batch splitting
    // =========================================================================

    mod batch_tests {
        use super::*;

        #[test]
        fn test_lowercase_go_separates() {
            let dump = "SELECT 1;\ngo\nSELECT 2;\n";
            assert_eq!(split_batches(dump), vec!["SELECT 1;", "SELECT 2;"]);
        }

        #[test]
        fn test_go_with_trailing_spaces_and_crlf() {
            let dump = "SELECT 1;\r\nGO  \r\nSELECT 2;\r\n";
            assert_eq!(split_batches(dump).len(), 2);
        }

        #[test]
        fn test_indented_go_separates() {
            let dump = "SELECT 1;\n\tGO\nSELECT 2;";
            assert_eq!(split_batches(dump).len(), 2);
        }

        #[test]
        fn test_consecutive_separators_yield_no_empty_batches() {
            let dump = "GO\nGO\nSELECT 1;\nGO\nGO\n";
            assert_eq!(split_batches(dump), vec!["SELECT 1;"]);
        }

        #[test]
        fn test_go_inside_literal_line_is_kept() {
            let dump = "INSERT INTO users (role) VALUES ('GO home');";
            assert_eq!(split_batches(dump).len(), 1);
        }

        #[test]
        fn test_empty_dump() {
            assert!(split_batches("").is_empty());
            assert!(extract("   \n\n").is_empty());
        }
    }

    // =========================================================================
    // B. Statement extraction
    // =========================================================================

    mod extract_tests {
        use super::*;

        #[test]
        fn test_multiline_statement() {
            let dump = "insert   into\n  Patients\n(\n full_name,\n gender\n)\nvalues\n(N'An', 'Nam'),\n(N'Linh', N'Nữ');";
            let stmts = extract(dump);
            assert_eq!(stmts.len(), 1);
            assert_eq!(stmts[0].table, "Patients");
            assert_eq!(stmts[0].columns, vec!["full_name", "gender"]);
            assert!(stmts[0].values_block.starts_with("(N'An'"));
            assert!(stmts[0].values_block.ends_with("N'Nữ')"));
        }

        #[test]
        fn test_schema_prefix_and_brackets_dropped() {
            let dump = "INSERT INTO [dbo].[Users] ([email], [role]) VALUES ('a@x.io', 'admin');";
            let stmts = extract(dump);
            assert_eq!(stmts[0].table, "Users");
            assert_eq!(stmts[0].columns, vec!["email", "role"]);
        }

        #[test]
        fn test_unbracketed_schema_prefix() {
            let dump = "INSERT INTO dbo.HeartRecords (age) VALUES (50);";
            assert_eq!(extract(dump)[0].table, "HeartRecords");
        }

        #[test]
        fn test_only_first_insert_per_batch() {
            let dump = "INSERT INTO users (email) VALUES ('a');\nINSERT INTO users (email) VALUES ('b');";
            let stmts = extract(dump);
            assert_eq!(stmts.len(), 1);
            assert_eq!(stmts[0].values_block, "('a')");
        }

        #[test]
        fn test_one_insert_per_batch_across_batches() {
            let dump = "INSERT INTO users (email) VALUES ('a');\nGO\nINSERT INTO users (email) VALUES ('b');\nGO";
            let stmts = extract(dump);
            assert_eq!(stmts.len(), 2);
            assert_eq!(stmts[1].values_block, "('b')");
        }

        #[test]
        fn test_setup_batches_skipped() {
            let dump = "USE HeartCareDB;\nGO\nSET IDENTITY_INSERT Users ON;\nGO\n-- comment only\nGO\nINSERT INTO users (email) VALUES ('a');";
            let stmts = extract(dump);
            assert_eq!(stmts.len(), 1);
            assert_eq!(stmts[0].table, "users");
        }

        #[test]
        fn test_missing_terminator_does_not_match() {
            let dump = "INSERT INTO users (email) VALUES ('a')";
            assert!(extract(dump).is_empty());
        }

        #[test]
        fn test_missing_column_list_does_not_match() {
            let dump = "INSERT INTO users VALUES ('a');";
            assert!(extract(dump).is_empty());
        }

        #[test]
        fn test_semicolon_in_literal_truncates_block() {
            // Known limitation: the block ends at the first `;`
            let dump = "INSERT INTO users (role) VALUES ('a;b');";
            let stmts = extract(dump);
            assert_eq!(stmts[0].values_block, "('a");
            assert!(split_tuples(&stmts[0].values_block).is_err());
        }
    }

    // =========================================================================
    // C. Tuple splitting
    // =========================================================================

    mod tuple_tests {
        use super::*;

        #[test]
        fn test_leading_values_keyword() {
            let tuples = split_tuples("VALUES (1), (2)").unwrap();
            assert_eq!(tuples, vec!["1", "2"]);
        }

        #[test]
        fn test_newlines_and_tabs_between_groups() {
            let tuples = split_tuples("(1, 'a')\n,\n\t(2, 'b') ,(3, 'c')").unwrap();
            assert_eq!(tuples, vec!["1, 'a'", "2, 'b'", "3, 'c'"]);
        }

        #[test]
        fn test_nested_parens_stay_in_tuple() {
            let tuples = split_tuples("(1, (2)), (3)").unwrap();
            assert_eq!(tuples, vec!["1, (2)", "3"]);
        }

        #[test]
        fn test_no_groups() {
            assert!(split_tuples("").unwrap().is_empty());
            assert!(split_tuples("VALUES").unwrap().is_empty());
            assert!(split_tuples("1, 2, 3").unwrap().is_empty());
        }

        #[test]
        fn test_unclosed_group_is_error() {
            let err = split_tuples("(1, 2), (3").unwrap_err();
            assert!(matches!(err, ParseError::UnbalancedParens { depth: 1, .. }));
        }

        #[test]
        fn test_stray_close_is_error() {
            let err = split_tuples("(1), 2)").unwrap_err();
            assert!(matches!(err, ParseError::UnbalancedParens { depth: -1, .. }));
        }
    }

    // =========================================================================
    // D. Field splitting and classification
    // =========================================================================

    mod field_tests {
        use super::*;

        #[test]
        fn test_comma_inside_quotes() {
            let fields = split_fields("'Hà Nội, Việt Nam', 2").unwrap();
            assert_eq!(fields, vec!["'Hà Nội, Việt Nam'", "2"]);
        }

        #[test]
        fn test_doubled_quote_stays_in_field() {
            let fields = split_fields("'O''Brien, J', 1").unwrap();
            assert_eq!(fields, vec!["'O''Brien, J'", "1"]);
            assert_eq!(classify(&fields[0]), Literal::Text("O'Brien, J".into()));
        }

        #[test]
        fn test_other_quote_char_inside_quote() {
            let fields = split_fields("'say \"hi\", ok', 2").unwrap();
            assert_eq!(fields.len(), 2);
            assert_eq!(classify(&fields[0]), Literal::Text("say \"hi\", ok".into()));
        }

        #[test]
        fn test_double_quoted_field_kept_raw() {
            let fields = split_fields("\"a,b\", 1").unwrap();
            assert_eq!(fields, vec!["\"a,b\"", "1"]);
            // Only single quotes denote text
            assert_eq!(classify(&fields[0]), Literal::Text("\"a,b\"".into()));
        }

        #[test]
        fn test_unterminated_quote_is_error() {
            let err = split_fields("1, 'abc").unwrap_err();
            assert_eq!(err, ParseError::UnterminatedQuote { quote: '\'' });
        }

        #[test]
        fn test_empty_field_between_commas() {
            let fields = split_fields("1,,2").unwrap();
            assert_eq!(fields, vec!["1", "", "2"]);
            assert_eq!(classify(&fields[1]), Literal::Text(String::new()));
        }

        #[test]
        fn test_negative_and_exponent_numbers() {
            assert_eq!(classify("-42"), Literal::Integer(-42));
            assert_eq!(classify("-0.5"), Literal::Float(-0.5));
            assert_eq!(classify("1e3"), Literal::Float(1000.0));
        }

        #[test]
        fn test_leading_plus_is_not_an_integer() {
            assert_eq!(classify("+5"), Literal::Float(5.0));
            assert_eq!(classify("+2.5"), Literal::Float(2.5));
            assert_eq!(classify("+"), Literal::Text("+".into()));
        }

        #[test]
        fn test_non_numeric_words_stay_text() {
            assert_eq!(classify("inf"), Literal::Text("inf".into()));
            assert_eq!(classify("NaN"), Literal::Text("NaN".into()));
            assert_eq!(classify("GETDATE()"), Literal::Text("GETDATE()".into()));
        }

        #[test]
        fn test_unterminated_prefixed_literal_kept_verbatim() {
            assert_eq!(classify(" N'abc "), Literal::Text("N'abc".into()));
        }

        #[test]
        fn test_empty_quoted_string() {
            assert_eq!(classify("''"), Literal::Text(String::new()));
            assert_eq!(classify("N''"), Literal::Text(String::new()));
        }

        #[test]
        fn test_quoted_null_is_text() {
            assert_eq!(classify("'NULL'"), Literal::Text("NULL".into()));
        }
    }
}
