//! Tests for interval command execution.

#[cfg(test)]
mod tests {
    use super::super::{IntervalAction, IntervalCmd};
    use crate::commands::Execute;
    use crate::connection::Database;
    use rstest::{fixture, rstest};

    #[fixture]
    fn db() -> Database {
        Database::open_in_memory().expect("in-memory database should open")
    }

    fn parse(input: &str) -> IntervalCmd {
        IntervalCmd {
            action: IntervalAction::Parse {
                input: input.to_string(),
            },
        }
    }

    crate::execute_test! {
        test_name: test_parse_full_duration,
        fixture: db,
        cmd: parse("P1Y2M3DT4H5M6.7S"),
        assertions: |result| {
            assert_eq!(result.input.as_deref(), Some("P1Y2M3DT4H5M6.7S"));
            assert_eq!(result.months, 14);
            assert_eq!(result.days, 3);
            assert_eq!(result.micros, 14_706_700_000);
            assert_eq!(result.iso8601, "P1Y2M3DT4H5M6.7S");
        },
    }

    crate::execute_test! {
        test_name: test_parse_truncates_fraction,
        fixture: db,
        cmd: parse("P1Y2M3DT4H5M6.000007S"),
        assertions: |result| {
            assert_eq!(result.micros, 14_706_000_007);
        },
    }

    crate::execute_test! {
        test_name: test_parse_negated_duration,
        fixture: db,
        cmd: parse("-P1DT1S"),
        assertions: |result| {
            assert_eq!((result.months, result.days, result.micros), (0, -1, -1_000_000));
            assert_eq!(result.iso8601, "P-1DT-1S");
        },
    }

    crate::execute_test! {
        test_name: test_format_triple,
        fixture: db,
        cmd: IntervalCmd {
            action: IntervalAction::Format { months: 0, days: 32, micros: 0 },
        },
        assertions: |result| {
            assert_eq!(result.input, None);
            assert_eq!(result.iso8601, "P32D");
        },
    }

    crate::execute_test! {
        test_name: test_format_zero,
        fixture: db,
        cmd: IntervalCmd {
            action: IntervalAction::Format { months: 0, days: 0, micros: 0 },
        },
        assertions: |result| {
            assert_eq!(result.iso8601, "PT0S");
        },
    }

    crate::execute_error_test! {
        test_name: test_parse_malformed_input,
        fixture: db,
        cmd: parse("1Y2M3DT4H5M6.7"),
        contains: "The argument `1Y2M3DT4H5M6.7` can't be parsed as an ISO 8601 duration",
    }

    #[rstest]
    fn test_parse_rejects_weeks(db: Database) {
        assert!(parse("P1W").execute(&db).is_err());
    }
}
