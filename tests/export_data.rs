//! Tests for the data export driver in chunked and query-file modes.

use std::io::Write;

use db_export::database::SqlValue;
use db_export::error_handling::ExportError;
use db_export::export::{export_data, DataExportSummary, DataSource, ExportPhase};
use db_export::Dialect;

#[path = "helpers.rs"]
mod helpers;

use helpers::{chunked_config, rows, text, FakeSource, Scripted};

#[tokio::test]
async fn test_chunked_export_2500_rows() {
    let mut source = FakeSource::numbered(2500);
    let config = chunked_config("users", Dialect::Mysql, 1000);
    let mut out = Vec::new();

    let summary = export_data(&mut source, &config, &mut out).await.unwrap();

    assert_eq!(
        summary,
        DataExportSummary {
            chunks: 3,
            statements: 3,
            rows: 2500
        }
    );
    assert_eq!(
        source.statements,
        vec![
            "SELECT COUNT(*) AS total FROM users",
            "SELECT * FROM users LIMIT 1000 OFFSET 0",
            "SELECT * FROM users LIMIT 1000 OFFSET 1000",
            "SELECT * FROM users LIMIT 1000 OFFSET 2000",
        ]
    );

    let out = text(&out);
    assert_eq!(out.matches("/** chunk: ").count(), 3);
    assert_eq!(out.matches("INSERT INTO `users` (`id`, `name`) VALUES\n").count(), 3);
    assert_eq!(out.matches(";\n\n").count(), 3);
    assert!(out.starts_with("/** chunk: 0 */\nINSERT INTO"));

    // each marker precedes the statement of its chunk
    let marker_1 = out.find("/** chunk: 1 */").unwrap();
    let marker_2 = out.find("/** chunk: 2 */").unwrap();
    assert!(out.find("('1000', 'name-1000');").unwrap() < marker_1);
    assert!(out[marker_1..].starts_with("/** chunk: 1 */\nINSERT INTO `users` (`id`, `name`) VALUES\n('1001', 'name-1001'),"));
    assert!(out.find("('2000', 'name-2000');").unwrap() < marker_2);
    assert!(out.ends_with("('2500', 'name-2500');\n\n"));
}

#[tokio::test]
async fn test_chunked_export_small_table_single_statement() {
    let mut source = FakeSource::numbered(3);
    let config = chunked_config("t", Dialect::Mysql, 1000);
    let mut out = Vec::new();

    export_data(&mut source, &config, &mut out).await.unwrap();

    assert_eq!(
        text(&out),
        "/** chunk: 0 */\n\
         INSERT INTO `t` (`id`, `name`) VALUES\n\
         ('1', 'name-1'),\n\
         ('2', 'name-2'),\n\
         ('3', 'name-3');\n\n"
    );
}

#[tokio::test]
async fn test_chunked_export_empty_table() {
    let mut source = FakeSource::numbered(0);
    let config = chunked_config("users", Dialect::Postgres, 1000);
    let mut out = Vec::new();

    let summary = export_data(&mut source, &config, &mut out).await.unwrap();

    assert_eq!(summary, DataExportSummary::default());
    assert!(out.is_empty());
    assert_eq!(source.statements, vec!["SELECT COUNT(*) AS total FROM users"]);
}

#[tokio::test]
async fn test_chunk_returning_no_rows_writes_marker_only() {
    // rows deleted between COUNT and the last page
    let mut source = FakeSource::numbered(1500).with_count(2500);
    let config = chunked_config("users", Dialect::Mysql, 1000);
    let mut out = Vec::new();

    let summary = export_data(&mut source, &config, &mut out).await.unwrap();

    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.statements, 2);
    assert_eq!(summary.rows, 1500);
    let out = text(&out);
    assert!(out.ends_with("/** chunk: 2 */\n"));
    assert_eq!(out.matches("INSERT INTO").count(), 2);
}

#[tokio::test]
async fn test_skip_fields_left_out_of_every_chunk() {
    let mut source = FakeSource::table(
        &["id", "email", "password_hash"],
        (1..=5)
            .map(|i| {
                vec![
                    SqlValue::Int(i),
                    SqlValue::Text(format!("u{i}@example.com")),
                    SqlValue::Text("$2b$12$secret".to_string()),
                ]
            })
            .collect(),
    );
    let mut config = chunked_config("users", Dialect::Postgres, 2);
    config.skip_fields.insert("password_hash".to_string());
    let mut out = Vec::new();

    let summary = export_data(&mut source, &config, &mut out).await.unwrap();

    assert_eq!(summary.chunks, 3);
    let out = text(&out);
    assert_eq!(
        out.matches("INSERT INTO \"users\" (\"id\", \"email\") VALUES\n").count(),
        3
    );
    assert!(!out.contains("password_hash"));
    assert!(!out.contains("secret"));
    assert!(out.contains("('5', 'u5@example.com');"));
}

#[tokio::test]
async fn test_values_rendered_per_dialect() {
    let data = || {
        vec![vec![
            SqlValue::Int(1),
            SqlValue::Text(r#"O'Brien "quoted" \ path"#.to_string()),
            SqlValue::Null,
            SqlValue::Bytes(vec![0x00, 0xff]),
            SqlValue::Bool(true),
        ]]
    };
    let columns = ["id", "name", "note", "avatar", "active"];

    let mut mysql = FakeSource::table(&columns, data());
    let mut out = Vec::new();
    export_data(&mut mysql, &chunked_config("p", Dialect::Mysql, 10), &mut out)
        .await
        .unwrap();
    assert!(text(&out).contains(r#"('1', 'O\'Brien \"quoted\" \\ path', NULL, X'00FF', '1');"#));

    let mut postgres = FakeSource::table(&columns, data());
    let mut out = Vec::new();
    export_data(&mut postgres, &chunked_config("p", Dialect::Postgres, 10), &mut out)
        .await
        .unwrap();
    assert!(text(&out).contains(
        r#"('1', 'O''Brien "quoted" \ path', NULL, decode('00ff', 'hex'), 'true');"#
    ));
}

#[tokio::test]
async fn test_query_file_export() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "SELECT id,name FROM t WHERE active=1;").unwrap();

    let mut source = FakeSource::empty().script(Scripted::Rows(rows(
        &["id", "name"],
        vec![
            vec![SqlValue::Int(4), SqlValue::Text("dora".to_string())],
            vec![SqlValue::Int(9), SqlValue::Text("ivan".to_string())],
        ],
    )));
    let mut config = chunked_config("t", Dialect::Mysql, 1000);
    config.source = DataSource::QueryFile(file.path().to_path_buf());
    let mut out = Vec::new();

    let summary = export_data(&mut source, &config, &mut out).await.unwrap();

    assert_eq!(
        summary,
        DataExportSummary {
            chunks: 0,
            statements: 1,
            rows: 2
        }
    );
    // no COUNT, the query runs without its terminator
    assert_eq!(source.statements, vec!["SELECT id,name FROM t WHERE active=1"]);
    assert_eq!(
        text(&out),
        "INSERT INTO `t` (`id`, `name`) VALUES\n('4', 'dora'),\n('9', 'ivan');\n\n"
    );
}

#[tokio::test]
async fn test_query_file_with_empty_result() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "SELECT * FROM t WHERE 1=0").unwrap();

    let mut source = FakeSource::empty().script(Scripted::Rows(Vec::new()));
    let mut config = chunked_config("t", Dialect::Mysql, 1000);
    config.source = DataSource::QueryFile(file.path().to_path_buf());
    let mut out = Vec::new();

    let summary = export_data(&mut source, &config, &mut out).await.unwrap();

    assert_eq!(summary.statements, 0);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_empty_query_file_is_rejected_before_querying() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut source = FakeSource::empty();
    let mut config = chunked_config("t", Dialect::Mysql, 1000);
    config.source = DataSource::QueryFile(file.path().to_path_buf());
    let mut out = Vec::new();

    let err = export_data(&mut source, &config, &mut out).await.unwrap_err();

    assert!(matches!(err, ExportError::EmptyQuery(_)));
    assert!(source.statements.is_empty());
}

#[tokio::test]
async fn test_count_failure_reports_counting_phase() {
    let mut source = FakeSource::numbered(10).with_count_error("table does not exist");
    let config = chunked_config("missing", Dialect::Mysql, 1000);
    let mut out = Vec::new();

    let err = export_data(&mut source, &config, &mut out).await.unwrap_err();

    match err {
        ExportError::Query { phase, .. } => assert_eq!(phase, ExportPhase::CountingRows),
        other => panic!("expected query error, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_chunk_query_failure_aborts_run() {
    let mut source = FakeSource::empty()
        .with_count(3)
        .script(Scripted::Rows(rows(&["id"], vec![vec![SqlValue::Int(1)]])))
        .script(Scripted::FailAfter(
            rows(&["id"], vec![vec![SqlValue::Int(2)]]),
            "connection reset".to_string(),
        ));
    let config = chunked_config("t", Dialect::Mysql, 1);
    let mut out = Vec::new();

    let err = export_data(&mut source, &config, &mut out).await.unwrap_err();

    match err {
        ExportError::Query { phase, .. } => assert_eq!(phase, ExportPhase::IteratingChunks),
        other => panic!("expected query error, got {other:?}"),
    }
    // the third chunk is never requested
    assert_eq!(source.statements.len(), 3);
    let out = text(&out);
    assert!(out.contains("('1');\n\n"));
    // the failed statement is left unterminated
    assert!(out.ends_with("('2')"));
}

#[tokio::test]
async fn test_column_set_change_between_chunks_is_fatal() {
    let mut source = FakeSource::empty()
        .with_count(2)
        .script(Scripted::Rows(rows(
            &["id", "name"],
            vec![vec![SqlValue::Int(1), SqlValue::Text("a".to_string())]],
        )))
        .script(Scripted::Rows(rows(
            &["id", "email"],
            vec![vec![SqlValue::Int(2), SqlValue::Text("b@c".to_string())]],
        )));
    let config = chunked_config("t", Dialect::Mysql, 1);
    let mut out = Vec::new();

    let err = export_data(&mut source, &config, &mut out).await.unwrap_err();

    assert!(matches!(err, ExportError::ColumnSetChanged { .. }));
    let out = text(&out);
    assert_eq!(out.matches("INSERT INTO").count(), 1);
    assert!(!out.contains("b@c"));
}

#[tokio::test]
async fn test_malformed_row_is_fatal() {
    let columns: std::sync::Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
    let good = db_export::database::Row::new(
        std::sync::Arc::clone(&columns),
        vec![SqlValue::Int(1), SqlValue::Text("a".to_string())],
    );
    let short = db_export::database::Row::new(columns, vec![SqlValue::Int(2)]);
    let mut source = FakeSource::empty()
        .with_count(2)
        .script(Scripted::Rows(vec![good, short]));
    let config = chunked_config("t", Dialect::Mysql, 1000);
    let mut out = Vec::new();

    let err = export_data(&mut source, &config, &mut out).await.unwrap_err();

    match err {
        ExportError::ColumnCountMismatch {
            row,
            expected,
            found,
        } => {
            assert_eq!(row, 2);
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected column count mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_every_column_skipped_is_fatal() {
    let mut source = FakeSource::numbered(2);
    let mut config = chunked_config("t", Dialect::Mysql, 1000);
    config.skip_fields.insert("id".to_string());
    config.skip_fields.insert("name".to_string());
    let mut out = Vec::new();

    let err = export_data(&mut source, &config, &mut out).await.unwrap_err();

    assert!(matches!(err, ExportError::NoColumnsSelected(_)));
    assert!(!text(&out).contains("INSERT"));
}

#[tokio::test]
async fn test_statement_write_failure_is_fatal() {
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut source = FakeSource::numbered(3);
    let config = chunked_config("t", Dialect::Mysql, 1000);

    // the chunk marker failure is only logged; the statement failure aborts
    let err = export_data(&mut source, &config, &mut FullDisk)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::OutputWrite(_)));
}
