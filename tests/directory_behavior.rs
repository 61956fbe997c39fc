//! Behavior tests for loading and querying the ticker directory.

use std::io::Write;

use rstest::{fixture, rstest};
use tempfile::NamedTempFile;
use tradetalk_core::{DirectoryConfig, ErrorKind, TickerDirectory, ValidationError};
use tradetalk_tests::fixture_path;

fn sheet(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write sheet");
    file.flush().expect("flush sheet");
    file
}

#[fixture]
fn small_sheet() -> NamedTempFile {
    sheet(
        ".csv",
        "Apple Inc.,AAPL\nMicrosoft Corp.,MSFT\nAlphabet Inc.,GOOGL\nApplied Materials,AMAT\n",
    )
}

// =============================================================================
// Directory: Loading
// =============================================================================

#[rstest]
fn loading_same_sheet_twice_gives_same_directory(small_sheet: NamedTempFile) {
    // Given: A four-row sheet with the expected row count
    let config = DirectoryConfig::new(small_sheet.path(), Some(4));

    // When: The directory is loaded twice
    let first = TickerDirectory::load(&config).expect("loads");
    let second = TickerDirectory::load(&config).expect("loads");

    // Then: Both loads agree and names map to symbols
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert_eq!(
        first.get("Microsoft Corp.").map(|symbol| symbol.as_str()),
        Some("MSFT")
    );
}

#[rstest]
fn expected_rows_limits_what_is_read(small_sheet: NamedTempFile) {
    let directory =
        TickerDirectory::load(&DirectoryConfig::new(small_sheet.path(), Some(2))).expect("loads");

    assert_eq!(directory.len(), 2);
    assert!(directory.get("Alphabet Inc.").is_none());
}

#[rstest]
fn unbounded_config_reads_every_row(small_sheet: NamedTempFile) {
    let directory =
        TickerDirectory::load(&DirectoryConfig::new(small_sheet.path(), None)).expect("loads");

    assert_eq!(directory.len(), 4);
}

#[rstest]
fn when_sheet_is_short_load_is_configuration_error(small_sheet: NamedTempFile) {
    // Given: A sheet with fewer rows than required
    let config = DirectoryConfig::new(small_sheet.path(), Some(505));

    // When / Then: Startup fails with a configuration error
    let error = TickerDirectory::load(&config).expect_err("too few rows");
    assert_eq!(error.kind(), ErrorKind::Configuration);
    assert!(error.to_string().contains("expected 505"), "{error}");
}

#[test]
fn missing_file_is_configuration_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = DirectoryConfig::new(dir.path().join("cname.xls"), Some(505));

    let error = TickerDirectory::load(&config).expect_err("missing");

    assert_eq!(error.kind(), ErrorKind::Configuration);
}

#[test]
fn unreadable_workbook_is_configuration_error() {
    let file = sheet(".xls", "this is not a spreadsheet");

    let error = TickerDirectory::load(&DirectoryConfig::new(file.path(), None))
        .expect_err("not a workbook");

    assert_eq!(error.kind(), ErrorKind::Configuration);
}

// =============================================================================
// Directory: Workbooks
// =============================================================================

#[test]
fn xlsx_workbook_maps_first_sheet_rows() {
    // Given: A five-row workbook whose Toyota symbol is a numeric cell
    let config = DirectoryConfig::new(fixture_path("companies_sample.xlsx"), Some(5));

    // When: The directory is loaded
    let directory = TickerDirectory::load(&config).expect("loads workbook");

    // Then: Every row maps, numeric cells included
    assert_eq!(directory.len(), 5);
    let lookup = |name: &str| directory.get(name).map(|symbol| symbol.as_str().to_owned());
    assert_eq!(lookup("Toyota Motor").as_deref(), Some("7203"));
    assert_eq!(lookup("Reliance Industries").as_deref(), Some("RELIANCE.BO"));
    assert_eq!(lookup("Tencent Holdings").as_deref(), Some("0700.HK"));
}

#[rstest]
#[case::first_two(Some(2), 2)]
#[case::all_rows(None, 5)]
fn xlsx_workbook_honours_expected_rows(#[case] expected: Option<usize>, #[case] len: usize) {
    let config = DirectoryConfig::new(fixture_path("companies_sample.xlsx"), expected);

    let directory = TickerDirectory::load(&config).expect("loads workbook");

    assert_eq!(directory.len(), len);
    assert!(directory.get("Apple Inc.").is_some());
}

#[test]
fn short_xlsx_workbook_is_configuration_error() {
    let config = DirectoryConfig::new(fixture_path("companies_sample.xlsx"), Some(505));

    let error = TickerDirectory::load(&config).expect_err("five rows only");

    assert_eq!(error.kind(), ErrorKind::Configuration);
    assert!(error.to_string().contains("has 5 rows, expected 505"), "{error}");
}

#[rstest]
#[case::empty_name(",AAPL\nMicrosoft,MSFT\n", "row 1")]
#[case::empty_symbol("Apple,AAPL\nMicrosoft,\n", "row 2")]
#[case::bad_symbol("Apple,AAPL\nMicrosoft,MS FT\n", "row 2")]
fn malformed_rows_name_the_offending_row(#[case] contents: &str, #[case] row: &str) {
    let file = sheet(".csv", contents);

    let error = TickerDirectory::load(&DirectoryConfig::new(file.path(), None))
        .expect_err("malformed row");

    assert_eq!(error.kind(), ErrorKind::Configuration);
    assert!(error.to_string().contains(row), "{error}");
}

#[test]
fn duplicate_company_names_keep_last_symbol() {
    let file = sheet(".csv", "Alphabet Inc.,GOOGL\nAlphabet Inc.,GOOG\n");

    let directory =
        TickerDirectory::load(&DirectoryConfig::new(file.path(), Some(2))).expect("loads");

    assert_eq!(directory.len(), 1);
    assert_eq!(
        directory.get("Alphabet Inc.").map(|symbol| symbol.as_str()),
        Some("GOOG")
    );
}

// =============================================================================
// Directory: Lookup
// =============================================================================

#[rstest]
fn find_is_case_insensitive_substring(small_sheet: NamedTempFile) {
    let directory =
        TickerDirectory::load(&DirectoryConfig::new(small_sheet.path(), None)).expect("loads");

    let names: Vec<&str> = directory.find("APPL").into_iter().map(|(name, _)| name).collect();

    assert_eq!(names, vec!["Apple Inc.", "Applied Materials"]);
}

#[rstest]
fn resolve_prefers_exact_name_then_unique_match(small_sheet: NamedTempFile) {
    let directory =
        TickerDirectory::load(&DirectoryConfig::new(small_sheet.path(), None)).expect("loads");

    let (name, symbol) = directory.resolve("Apple Inc.").expect("exact");
    assert_eq!((name, symbol.as_str()), ("Apple Inc.", "AAPL"));

    let (name, symbol) = directory.resolve("alphabet").expect("unique");
    assert_eq!((name, symbol.as_str()), ("Alphabet Inc.", "GOOGL"));
}

#[rstest]
fn resolve_reports_unknown_and_ambiguous_queries(small_sheet: NamedTempFile) {
    let directory =
        TickerDirectory::load(&DirectoryConfig::new(small_sheet.path(), None)).expect("loads");

    assert!(matches!(
        directory.resolve("Tesla"),
        Err(ValidationError::UnknownCompany { .. })
    ));
    assert!(matches!(
        directory.resolve("appl"),
        Err(ValidationError::AmbiguousCompany { matches: 2, .. })
    ));
}
