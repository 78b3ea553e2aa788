//! Spreadsheet ingestion tests
//!
//! Exercise the loader and the pipeline against real xlsx documents.

mod common;

use std::sync::Arc;

use common::{Cell, Sheet, xlsx};
use schemamap::mapping::{MappingClient, MappingError, MappingRequest, MappingResult};
use schemamap::pipeline::{Phase, Pipeline, PipelineError, Slot, SlotState};
use schemamap::table::{self, LoadError, UploadedFile};

fn workbook(name: &str, sheets: &[Sheet]) -> UploadedFile {
    UploadedFile::new(name, xlsx(sheets))
}

fn two_sheets() -> UploadedFile {
    workbook(
        "catalog.xlsx",
        &[
            Sheet::text("Summary", &[&["Note"], &["generated"]]),
            Sheet::text("Products", &[&["Product_Code", "Title"], &["A-1", "Widget"]]),
        ],
    )
}

/// Never reached: these tests stop before mapping
struct Unreachable;

#[async_trait::async_trait]
impl MappingClient for Unreachable {
    async fn submit(&self, _request: &MappingRequest) -> Result<MappingResult, MappingError> {
        Err(MappingError::Transport("not expected".to_string()))
    }
}

// =============================================================================
// Loader
// =============================================================================

#[test]
fn test_sheet_names_in_workbook_order() {
    let sheets = table::sheet_names(&two_sheets()).expect("sheet names");
    assert_eq!(sheets, vec!["Summary", "Products"]);
}

#[test]
fn test_sheet_names_of_csv_is_empty() {
    let file = UploadedFile::new("a.csv", b"x,y\n".to_vec());
    assert!(table::sheet_names(&file).expect("sheet names").is_empty());
}

#[test]
fn test_multi_sheet_requires_selection() {
    let err = table::load(&two_sheets(), None).expect_err("selection required");
    match err {
        LoadError::SheetSelectionRequired { file, sheets } => {
            assert_eq!(file, "catalog.xlsx");
            assert_eq!(sheets, vec!["Summary", "Products"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_explicit_sheet_is_read() {
    let table = table::load(&two_sheets(), Some("Products")).expect("load sheet");
    assert_eq!(table::extract(&table).as_slice(), &["Product_Code", "Title"]);
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.row(0), Some(vec!["A-1", "Widget"]));
}

#[test]
fn test_unknown_sheet() {
    let err = table::load(&two_sheets(), Some("Prices")).expect_err("unknown sheet");
    assert!(matches!(err, LoadError::SheetNotFound { ref sheet, .. } if sheet == "Prices"));
    assert!(err.to_string().contains("Summary, Products"));
}

#[test]
fn test_single_sheet_needs_no_selection() {
    let file = workbook("one.xlsx", &[Sheet::text("Data", &[&["SKU", "Name"], &["1", "a"]])]);
    let table = table::load(&file, None).expect("load");
    assert_eq!(table::extract(&table).as_slice(), &["SKU", "Name"]);
}

#[test]
fn test_typed_cells_become_text() {
    let file = workbook(
        "typed.xlsx",
        &[Sheet::new(
            "Data",
            vec![
                vec![
                    Cell::Text("Qty"),
                    Cell::Text("Price"),
                    Cell::Text("Active"),
                    Cell::Text("Since"),
                    Cell::Text("Note"),
                ],
                vec![
                    Cell::Number(3.0),
                    Cell::Number(2.5),
                    Cell::Bool(true),
                    Cell::Date(45292.0),
                    Cell::Empty,
                ],
            ],
        )],
    );

    let table = table::load(&file, None).expect("load");
    assert_eq!(table.row(0), Some(vec!["3", "2.5", "true", "2024-01-01", ""]));
}

#[test]
fn test_numeric_and_blank_headers() {
    let file = workbook(
        "headers.xlsx",
        &[Sheet::new(
            "Data",
            vec![vec![Cell::Number(2024.0), Cell::Empty, Cell::Text("Name"), Cell::Text("Name")]],
        )],
    );

    let table = table::load(&file, None).expect("load");
    assert_eq!(
        table::extract(&table).as_slice(),
        &["2024", "Unnamed: 1", "Name", "Name.1"]
    );
    assert_eq!(table.row_count(), 0);
}

#[test]
fn test_corrupt_workbook() {
    let file = UploadedFile::new("broken.xlsx", b"PK\x03\x04 not really".to_vec());
    assert!(matches!(table::load(&file, None), Err(LoadError::Parse { .. })));
}

// =============================================================================
// Pipeline with workbooks
// =============================================================================

#[test]
fn test_pipeline_waits_for_sheet_then_loads() {
    let mut pipeline = Pipeline::new(Arc::new(Unreachable));

    let err = pipeline
        .upload(Slot::Destination, two_sheets(), None)
        .expect_err("sheet selection");
    let (slot, sheets) = err.pending_sheets().expect("pending sheets");
    assert_eq!(slot, Slot::Destination);
    assert_eq!(sheets, &["Summary".to_string(), "Products".to_string()]);
    assert!(matches!(pipeline.state().destination, SlotState::AwaitingSheet { .. }));
    assert_eq!(pipeline.state().phase(), Phase::Idle);

    let columns = pipeline
        .select_sheet(Slot::Destination, "Products")
        .expect("select sheet");
    assert_eq!(columns.as_slice(), &["Product_Code", "Title"]);
    assert_eq!(pipeline.state().phase(), Phase::DestinationLoaded);
    match &pipeline.state().destination {
        SlotState::Loaded { sheet, .. } => assert_eq!(sheet.as_deref(), Some("Products")),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[test]
fn test_pipeline_bad_sheet_choice_keeps_waiting() {
    let mut pipeline = Pipeline::new(Arc::new(Unreachable));
    let _ = pipeline.upload(Slot::Source, two_sheets(), None);

    let err = pipeline
        .select_sheet(Slot::Source, "Prices")
        .expect_err("unknown sheet");
    assert!(matches!(
        err,
        PipelineError::Load {
            source: LoadError::SheetNotFound { .. },
            ..
        }
    ));
    assert!(matches!(pipeline.state().source, SlotState::AwaitingSheet { .. }));

    pipeline
        .select_sheet(Slot::Source, "Summary")
        .expect("second choice works");
    assert!(pipeline.state().source.is_ready());
}
