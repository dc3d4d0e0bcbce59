//! Output formatting tests for query command.

#[cfg(test)]
mod tests {
    use super::super::execute::{QueryColumn, QueryOutput};
    use crate::value::RowValue;
    use num_bigint::BigInt;
    use rstest::{fixture, rstest};

    const TWO_ROWS_TABLE: &str = "\
Query: SELECT * FROM t

id (BIGINT) | label (VARCHAR)
------------+----------------
1           | a
2           | NULL

2 rows";

    #[fixture]
    fn two_rows() -> QueryOutput {
        QueryOutput {
            sql: "SELECT * FROM t".to_string(),
            columns: vec![
                QueryColumn {
                    name: "id".to_string(),
                    type_name: "BIGINT".to_string(),
                },
                QueryColumn {
                    name: "label".to_string(),
                    type_name: "VARCHAR".to_string(),
                },
            ],
            rows: vec![
                vec![RowValue::Int(1), RowValue::Str("a".to_string())],
                vec![RowValue::Int(2), RowValue::Null],
            ],
            row_count: 2,
            rows_changed: 0,
            truncated: false,
        }
    }

    #[fixture]
    fn truncated_hugeint() -> QueryOutput {
        QueryOutput {
            sql: "SELECT * FROM big".to_string(),
            columns: vec![QueryColumn {
                name: "h".to_string(),
                type_name: "HUGEINT".to_string(),
            }],
            rows: vec![vec![RowValue::HugeInt(BigInt::from(i128::MAX))]],
            row_count: 40,
            rows_changed: 0,
            truncated: true,
        }
    }

    #[fixture]
    fn insert_output() -> QueryOutput {
        QueryOutput {
            sql: "INSERT INTO t VALUES (?)".to_string(),
            columns: vec![QueryColumn {
                name: "Count".to_string(),
                type_name: "BIGINT".to_string(),
            }],
            rows: vec![vec![RowValue::Int(1)]],
            row_count: 1,
            rows_changed: 1,
            truncated: false,
        }
    }

    #[fixture]
    fn no_columns() -> QueryOutput {
        QueryOutput {
            sql: "CREATE TABLE t (h HUGEINT)".to_string(),
            ..QueryOutput::default()
        }
    }

    // =========================================================================
    // Table format tests
    // =========================================================================

    crate::output_table_test! {
        test_name: test_to_table_two_rows,
        fixture: two_rows,
        fixture_type: QueryOutput,
        expected: TWO_ROWS_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_no_columns,
        fixture: no_columns,
        fixture_type: QueryOutput,
        expected: "Query: CREATE TABLE t (h HUGEINT)\n\nNo columns.",
    }

    crate::output_table_contains_test! {
        test_name: test_to_table_truncated_summary,
        fixture: truncated_hugeint,
        fixture_type: QueryOutput,
        contains: ["h (HUGEINT)", "170141183460469231731687303715884105727", "1 of 40 rows"],
    }

    crate::output_table_contains_test! {
        test_name: test_to_table_rows_changed,
        fixture: insert_output,
        fixture_type: QueryOutput,
        contains: ["1 rows, 1 changed"],
    }

    // =========================================================================
    // JSON format tests
    // =========================================================================

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: two_rows,
        fixture_type: QueryOutput,
        assertions: {
            "sql": "SELECT * FROM t",
            "row_count": 2,
            "rows": serde_json::json!([[1, "a"], [2, null]]),
        },
    }

    crate::output_json_test! {
        test_name: test_format_json_column_types,
        fixture: two_rows,
        fixture_type: QueryOutput,
        assertions: {
            "columns": serde_json::json!([
                {"name": "id", "type": "BIGINT"},
                {"name": "label", "type": "VARCHAR"}
            ]),
        },
    }

    crate::output_json_test! {
        test_name: test_format_json_hugeint_as_string,
        fixture: truncated_hugeint,
        fixture_type: QueryOutput,
        assertions: {
            "rows": serde_json::json!([["170141183460469231731687303715884105727"]]),
            "truncated": true,
        },
    }

    #[rstest]
    fn test_format_json_omits_defaults(two_rows: QueryOutput) {
        use crate::output::{OutputFormat, Outputable};
        let output = two_rows.format(OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed.get("rows_changed").is_none());
        assert!(parsed.get("truncated").is_none());
    }

    // =========================================================================
    // Toon format tests
    // =========================================================================

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: two_rows,
        fixture_type: QueryOutput,
        contains: ["SELECT * FROM t", "row_count: 2"],
    }
}
