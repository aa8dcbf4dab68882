use gridagg::{AggregationJob, GridCatalog, GridCell, JobOutcome, LineOffsetIndex};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

fn cell(id: &str, xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> GridCell {
    GridCell { id: id.to_string(), xmin, xmax, ymin, ymax }
}

// 2x2 grid over [0,2)x[0,2), half-open per cell
fn catalog() -> GridCatalog {
    GridCatalog::from_cells(vec![
        cell("A1", 0.0, 1.0, 0.0, 1.0),
        cell("A2", 1.0, 2.0, 0.0, 1.0),
        cell("B1", 0.0, 1.0, 1.0, 2.0),
        cell("B2", 1.0, 2.0, 1.0, 2.0),
    ])
}

fn record(x: f64, y: f64, tags: &[&str]) -> String {
    let tags = tags
        .iter()
        .map(|t| format!("{{\"text\": \"{}\"}}", t))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{{\"doc\": {{\"coordinates\": {{\"coordinates\": [{}, {}]}}, \
         \"entities\": {{\"hashtags\": [{}]}}}}}}",
        x, y, tags
    )
}

/// Lay the records out the way the export file does: header line, one
/// record per line with a trailing separator on all but the last, footer.
fn export_file(dir: &TempDir, records: &[String]) -> PathBuf {
    let path = dir.path().join("posts.json");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "{{\"total_rows\": {}, \"rows\":[", records.len()).unwrap();
    for (i, r) in records.iter().enumerate() {
        if i + 1 < records.len() {
            writeln!(f, "{},", r).unwrap();
        } else {
            writeln!(f, "{}", r).unwrap();
        }
    }
    writeln!(f, "]}}").unwrap();
    path
}

fn run(path: &PathBuf, workers: usize) -> JobOutcome {
    AggregationJob::new()
        .with_workers(workers)
        .with_force_reindex(false)
        .run(path, &catalog())
        .unwrap()
}

fn counts(outcome: &JobOutcome) -> Vec<(String, u64)> {
    outcome
        .report
        .iter()
        .map(|c| (c.cell_id.clone(), c.post_count))
        .collect()
}

#[test]
fn report_is_invariant_over_worker_count() {
    let dir = TempDir::new().unwrap();
    let mut records = Vec::new();
    // 23 records spread over the grid, enough that 17 workers leaves some
    // with two lines and some with one
    for i in 0..23u32 {
        let x = 0.1 + 1.8 * f64::from(i % 7) / 7.0;
        let y = 0.1 + 1.8 * f64::from(i % 5) / 5.0;
        records.push(record(x, y, &["tag", &format!("t{}", i % 3)]));
    }
    let path = export_file(&dir, &records);

    let baseline = run(&path, 1);
    assert_eq!(baseline.stats.scan.lines_read, 23);
    for workers in [2usize, 5, 17] {
        let outcome = run(&path, workers);
        assert_eq!(outcome.report, baseline.report, "{} workers diverged", workers);
        assert_eq!(outcome.stats.scan.lines_read, 23);
    }
}

#[test]
fn global_count_equals_whole_file_count() {
    let dir = TempDir::new().unwrap();
    // 6 in A1, 3 in B2, none elsewhere
    let mut records = Vec::new();
    for _ in 0..6 {
        records.push(record(0.5, 0.5, &["a1tag"]));
    }
    for _ in 0..3 {
        records.push(record(1.5, 1.5, &[]));
    }
    let path = export_file(&dir, &records);

    for workers in [1usize, 2, 5] {
        let outcome = run(&path, workers);
        assert_eq!(
            counts(&outcome),
            vec![
                ("A1".to_string(), 6),
                ("B2".to_string(), 3),
                ("A2".to_string(), 0),
                ("B1".to_string(), 0),
            ]
        );
        assert_eq!(outcome.stats.reduce.total_posts, 9);
    }
}

#[test]
fn single_record_file_counts_once_regardless_of_workers() {
    let dir = TempDir::new().unwrap();
    let path = export_file(&dir, &[record(0.5, 0.5, &["only"])]);

    for workers in [1usize, 2, 5, 17] {
        let outcome = run(&path, workers);
        assert_eq!(outcome.stats.reduce.total_posts, 1, "{} workers", workers);
        assert_eq!(outcome.report[0].cell_id, "A1");
        assert_eq!(outcome.report[0].post_count, 1);
        assert_eq!(outcome.report[0].top_hashtags, vec![("only".to_string(), 1)]);
    }
}

#[test]
fn malformed_record_is_skipped_without_failing_the_run() {
    let dir = TempDir::new().unwrap();
    let records = vec![
        "{\"doc\": {\"text\": \"no coordinate here\"}}".to_string(),
        record(0.5, 0.5, &["ok"]),
    ];
    let path = export_file(&dir, &records);

    let outcome = run(&path, 2);
    assert_eq!(outcome.stats.scan.lines_skipped, 1);
    assert_eq!(outcome.stats.scan.posts_usable, 1);
    assert_eq!(outcome.stats.reduce.total_posts, 1);
}

#[test]
fn zero_hashtag_record_counts_but_adds_no_hashtags() {
    let dir = TempDir::new().unwrap();
    let path = export_file(&dir, &[record(0.5, 0.5, &[]), record(0.4, 0.4, &[])]);

    let outcome = run(&path, 2);
    assert_eq!(outcome.report[0].cell_id, "A1");
    assert_eq!(outcome.report[0].post_count, 2);
    assert!(outcome.report[0].top_hashtags.is_empty());
}

#[test]
fn hashtag_counting_is_case_insensitive_across_workers() {
    let dir = TempDir::new().unwrap();
    let records = vec![
        record(0.5, 0.5, &["Rain"]),
        record(0.5, 0.6, &["RAIN"]),
        record(0.5, 0.7, &["rain"]),
        record(0.5, 0.8, &["sun"]),
    ];
    let path = export_file(&dir, &records);

    let outcome = run(&path, 3);
    assert_eq!(
        outcome.report[0].top_hashtags,
        vec![("rain".to_string(), 3), ("sun".to_string(), 1)]
    );
}

#[test]
fn overlapping_cells_all_count_the_post() {
    let dir = TempDir::new().unwrap();
    let path = export_file(&dir, &[record(0.5, 0.5, &["both"])]);

    let overlapping = GridCatalog::from_cells(vec![
        cell("X1", 0.0, 1.0, 0.0, 1.0),
        cell("X2", 0.0, 2.0, 0.0, 2.0),
    ]);
    let outcome = AggregationJob::new()
        .with_workers(2)
        .run(&path, &overlapping)
        .unwrap();

    assert_eq!(outcome.report.len(), 2);
    assert!(outcome.report.iter().all(|c| c.post_count == 1));
}

#[test]
fn second_run_reuses_the_persisted_index() {
    let dir = TempDir::new().unwrap();
    let path = export_file(&dir, &[record(0.5, 0.5, &["x"]), record(1.5, 0.5, &["y"])]);

    let first = run(&path, 2);
    assert!(first.stats.index.rebuilt);
    assert!(LineOffsetIndex::side_file_path(&path).exists());

    let second = run(&path, 2);
    assert!(!second.stats.index.rebuilt);
    assert_eq!(second.report, first.report);

    let forced = AggregationJob::new()
        .with_workers(2)
        .with_force_reindex(true)
        .run(&path, &catalog())
        .unwrap();
    assert!(forced.stats.index.rebuilt);
    assert_eq!(forced.report, first.report);
}

#[test]
fn missing_data_file_fails_with_a_diagnostic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = AggregationJob::new()
        .with_workers(2)
        .run(&path, &catalog())
        .unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}
