//! End-to-end binding and fetching through the bundled DuckDB engine.
//!
//! Every test opens its own database, prepares a statement, binds host values
//! and reads the result cells back as row values.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use num_bigint::BigInt;
use rstest::{fixture, rstest};
use uuid::Uuid;

use duckbind::value::{DateValue, TimestampTzValue, TimestampValue};
use duckbind::{Database, DuckError, HostValue, IntervalValue, RowValue};

#[fixture]
fn db() -> Database {
    Database::open_in_memory().expect("in-memory database should open")
}

/// Run `sql` with `params` and return the single cell of the first row.
fn single_cell(db: &Database, sql: &str, params: &[HostValue]) -> RowValue {
    let mut conn = db.connect().unwrap();
    let result = conn.query(sql, params).unwrap();
    assert_eq!(result.row_count(), 1);
    result.fetch_row(0, 0).unwrap()
}

// ============================================================================
// Wide integers
// ============================================================================

#[rstest]
fn test_hugeint_max_stored_through_string_fallback(db: Database) {
    let max = BigInt::from(i128::MAX);
    let mut conn = db.connect().unwrap();
    conn.query("CREATE TABLE t (h HUGEINT)", &[]).unwrap();

    let inserted = conn.query("INSERT INTO t VALUES (?)", &[max.clone().into()]).unwrap();
    assert_eq!(inserted.rows_changed(), 1);

    let result = conn.query("SELECT * FROM t", &[]).unwrap();
    assert_eq!(result.column_names(), vec!["h"]);
    assert_eq!(result.fetch_row(0, 0).unwrap(), RowValue::HugeInt(max));
}

#[rstest]
fn test_hugeint_just_past_bigint_stored_and_read_back(db: Database) {
    let value: BigInt = BigInt::from(i64::MAX) + 1;
    let mut conn = db.connect().unwrap();
    conn.query("CREATE TABLE wide (id INTEGER, h HUGEINT)", &[]).unwrap();
    conn.query("INSERT INTO wide VALUES (?, ?)", &[HostValue::from(1), value.clone().into()])
        .unwrap();

    let result = conn.query("SELECT h FROM wide WHERE id = 1", &[]).unwrap();
    assert_eq!(result.column_type(0).unwrap().to_string(), "HUGEINT");
    assert_eq!(result.fetch_row(0, 0).unwrap(), RowValue::HugeInt(value));
}

#[rstest]
#[case(-1)]
#[case(i64::MIN)]
fn test_negative_to_uhugeint_fails_at_bind(db: Database, #[case] value: i64) {
    let mut conn = db.connect().unwrap();
    let mut statement = conn.prepare("SELECT ?::UHUGEINT AS u").unwrap();
    let err = statement.bind(1, value).unwrap_err();
    assert!(matches!(err, DuckError::Range { .. }));
    assert_eq!(err.to_string(), format!("value {} is out of range for UHUGEINT", value));
}

#[rstest]
fn test_bind_hugeint_directly(db: Database) {
    let min = BigInt::from(i128::MIN);
    let mut conn = db.connect().unwrap();
    let mut statement = conn.prepare("SELECT ?::HUGEINT AS h").unwrap();
    statement.bind_hugeint(1, &min).unwrap();
    let result = statement.execute().unwrap();
    assert_eq!(result.fetch_row(0, 0).unwrap(), RowValue::HugeInt(min));
}

#[rstest]
fn test_integer_beyond_hugeint_rejected(db: Database) {
    let too_big = BigInt::from(i128::MAX) + 1;
    let mut conn = db.connect().unwrap();
    let mut statement = conn.prepare("SELECT ?::HUGEINT AS h").unwrap();
    let err = statement.bind(1, too_big).unwrap_err();
    assert!(matches!(err, DuckError::Range { .. }));
    assert!(err.to_string().contains("out of range for HUGEINT"));
}

// ============================================================================
// Decimals
// ============================================================================

#[rstest]
#[case("123.4565", "123.457")]
#[case("-0.0005", "-0.001")]
#[case("42", "42.000")]
fn test_decimal_rounds_half_away_from_zero(db: Database, #[case] input: &str, #[case] expected: &str) {
    let value = BigDecimal::from_str(input).unwrap();
    let cell = single_cell(&db, "SELECT ?::DECIMAL(18,3) AS d", &[value.into()]);
    assert_eq!(cell, RowValue::Decimal(BigDecimal::from_str(expected).unwrap()));
}

#[rstest]
fn test_wide_decimal_uses_hugeint_storage(db: Database) {
    let value = BigDecimal::from_str("12345678901234567890123456.789").unwrap();
    let cell = single_cell(&db, "SELECT ?::DECIMAL(38,3) AS d", &[value.clone().into()]);
    assert_eq!(cell, RowValue::Decimal(value));
}

#[rstest]
fn test_decimal_too_wide_for_width_rejected(db: Database) {
    let mut conn = db.connect().unwrap();
    let mut statement = conn.prepare("SELECT ?::DECIMAL(4,2) AS d").unwrap();
    let err = statement.bind(1, BigDecimal::from_str("123.45").unwrap()).unwrap_err();
    assert!(matches!(err, DuckError::Range { .. }));
}

// ============================================================================
// Temporal values
// ============================================================================

#[rstest]
fn test_date_round_trip(db: Database) {
    let date = NaiveDate::from_ymd_opt(1969, 7, 20).unwrap();
    let cell = single_cell(&db, "SELECT ?::DATE AS d", &[date.into()]);
    assert_eq!(cell, RowValue::Date(DateValue::Date(date)));
}

#[rstest]
fn test_timestamp_round_trip(db: Database) {
    let ts = NaiveDateTime::parse_from_str("2024-02-29 12:34:56.789012", "%Y-%m-%d %H:%M:%S%.f").unwrap();
    let cell = single_cell(&db, "SELECT ?::TIMESTAMP AS t", &[ts.into()]);
    assert_eq!(cell, RowValue::Timestamp(TimestampValue::Timestamp(ts)));
}

#[rstest]
fn test_timestamptz_rendered_in_session_zone() {
    let db = Database::open_in_memory().unwrap().with_time_zone(Tz::America__New_York);
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap();
    let cell = single_cell(&db, "SELECT ?::TIMESTAMPTZ AS t", &[instant.fixed_offset().into()]);

    let expected = instant.with_timezone(&Tz::America__New_York);
    assert_eq!(cell, RowValue::TimestampTz(TimestampTzValue::Timestamp(expected)));
    assert_eq!(cell.to_string(), "2024-01-15 12:00:00-05:00");
}

#[rstest]
#[case("P1Y2M3DT4H5M6.7S", IntervalValue::new(14, 3, 14_706_700_000))]
#[case("P-1Y-2M-3DT-12H-34M-56.987654S", IntervalValue::new(-14, -3, -45_296_987_654))]
#[case("P32D", IntervalValue::new(0, 32, 0))]
fn test_interval_round_trip(db: Database, #[case] text: &str, #[case] expected: IntervalValue) {
    let parsed = IntervalValue::parse_iso8601(text).unwrap();
    assert_eq!(parsed, expected);
    let cell = single_cell(&db, "SELECT ?::INTERVAL AS i", &[parsed.into()]);
    assert_eq!(cell, RowValue::Interval(expected));
}

// ============================================================================
// Other scalars
// ============================================================================

#[rstest]
fn test_uuid_binds_through_text(db: Database) {
    let uuid = Uuid::parse_str("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11").unwrap();
    let cell = single_cell(&db, "SELECT ?::UUID AS u", &[uuid.into()]);
    assert_eq!(cell, RowValue::Uuid(uuid));
}

#[rstest]
fn test_null_and_untyped_params(db: Database) {
    let mut conn = db.connect().unwrap();
    let result = conn
        .query("SELECT ?::INTEGER AS a, ? AS b", &[HostValue::Null, HostValue::from(true)])
        .unwrap();
    assert_eq!(result.row(0).unwrap(), vec![RowValue::Null, RowValue::Bool(true)]);
}

#[rstest]
fn test_double_param(db: Database) {
    let cell = single_cell(&db, "SELECT ?::DOUBLE AS d", &[1.5f64.into()]);
    assert_eq!(cell, RowValue::Float(1.5));
}

// ============================================================================
// Nested results
// ============================================================================

#[rstest]
fn test_list_column_keeps_null_elements(db: Database) {
    let mut conn = db.connect().unwrap();
    let result = conn
        .query(
            "SELECT l FROM (VALUES (1, [3, 4, NULL]::INTEGER[]), (2, []::INTEGER[])) t(o, l) ORDER BY o",
            &[],
        )
        .unwrap();
    assert_eq!(result.column_type(0).unwrap().to_string(), "INTEGER[]");
    assert_eq!(
        result.fetch_row(0, 0).unwrap(),
        RowValue::List(vec![RowValue::Int(3), RowValue::Int(4), RowValue::Null])
    );
    assert_eq!(result.fetch_row(1, 0).unwrap(), RowValue::List(Vec::new()));
}

#[rstest]
fn test_rows_span_chunks(db: Database) {
    let mut conn = db.connect().unwrap();
    let result = conn
        .query(
            "SELECT CASE WHEN range % 3 = 1 THEN NULL ELSE 'value-' || range::VARCHAR END AS s \
             FROM range(3000) ORDER BY range",
            &[],
        )
        .unwrap();
    assert_eq!(result.row_count(), 3000);
    let cells: Vec<RowValue> = result
        .rows()
        .skip(2047)
        .take(3)
        .map(|row| row.unwrap().remove(0))
        .collect();
    assert_eq!(
        cells,
        vec![
            RowValue::Null,
            RowValue::Str("value-2048".to_string()),
            RowValue::Str("value-2049".to_string()),
        ]
    );
    assert_eq!(result.fetch_row(2999, 0).unwrap(), RowValue::Str("value-2999".to_string()));
    assert!(result.fetch_row(3000, 0).is_err());
}

// ============================================================================
// Bind errors
// ============================================================================

#[rstest]
#[case(0)]
#[case(3)]
fn test_bind_index_out_of_range(db: Database, #[case] index: usize) {
    let mut conn = db.connect().unwrap();
    let mut statement = conn.prepare("SELECT ?::INTEGER AS a, ?::INTEGER AS b").unwrap();
    let err = statement.bind(index, 1).unwrap_err();
    assert!(matches!(err, DuckError::Range { .. }));
    assert_eq!(
        err.to_string(),
        format!("parameter index {} is out of range (statement has 2 parameters)", index)
    );
}

#[rstest]
fn test_failed_bind_clears_all_bindings(db: Database) {
    let mut conn = db.connect().unwrap();
    let mut statement = conn.prepare("SELECT ?::INTEGER AS a, ?::TINYINT AS b").unwrap();
    statement.bind(1, 7).unwrap();
    assert!(statement.bind(2, 1000).is_err());

    let err = statement.execute().unwrap_err();
    assert!(err.engine_error().is_some(), "{}", err);
}

#[rstest]
fn test_list_param_is_unsupported(db: Database) {
    let mut conn = db.connect().unwrap();
    let mut statement = conn.prepare("SELECT ?::INTEGER AS a").unwrap();
    let err = statement
        .bind(1, HostValue::List(vec![HostValue::from(1)]))
        .unwrap_err();
    assert!(matches!(err, DuckError::UnsupportedType { .. }));
}

#[rstest]
fn test_parameter_types_reported(db: Database) {
    let mut conn = db.connect().unwrap();
    let statement = conn.prepare("SELECT ?::HUGEINT AS h, ? AS x").unwrap();
    assert_eq!(statement.parameter_count(), 2);
    assert_eq!(statement.parameter_type(1).unwrap().to_string(), "HUGEINT");
    assert_eq!(statement.parameter_type(2).unwrap().to_string(), "UNKNOWN");
    assert!(statement.parameter_type(3).is_err());
}

#[rstest]
fn test_engine_errors_are_verbatim(db: Database) {
    let mut conn = db.connect().unwrap();
    let err = conn.prepare("SELECT * FROM missing").err().unwrap();
    assert!(err.engine_error().is_some());
    assert!(err
        .to_string()
        .starts_with("Catalog Error: Table with name missing does not exist!"));
}
