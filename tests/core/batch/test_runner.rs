// BatchRunner behaviour with the in-memory reader

use crate::common::{
    create_test_services, read_output, request, FakeDoc, FakeReader, JPEG_BYTES, PNG_BYTES, STORY,
};
use docsift::core::batch::BatchRunner;
use docsift::core::config::Config;
use docsift::core::reader::ImageFormat;
use docsift::core::types::{ExtractionRequest, OutcomeStatus};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[tokio::test]
async fn test_outcome_per_input_in_order() {
    let reader = FakeReader::new()
        .with("story.pdf", FakeDoc::text(STORY))
        .with("blank.pdf", FakeDoc::text(&[]))
        .with("other.epub", FakeDoc::text(&["Nothing relevant."]))
        .with("broken.pdf", FakeDoc::corrupt());
    let services = create_test_services(reader, Config::default());
    let out = TempDir::new().unwrap();
    let inputs = paths(&["story.pdf", "blank.pdf", "other.epub", "broken.pdf"]);

    let report = services
        .runner
        .run(&inputs, &request("dog", 2), out.path())
        .await
        .unwrap();

    let statuses: Vec<&str> = report.outcomes.iter().map(|o| o.status.label()).collect();
    assert_eq!(statuses, vec!["ok", "unreadable", "no match", "unreadable"]);
    for (outcome, input) in report.outcomes.iter().zip(&inputs) {
        assert_eq!(&outcome.path, input);
    }
    assert_eq!(report.documents, 4);
    assert_eq!(report.completed, 1);
    assert_eq!(report.no_match, 1);
    assert_eq!(report.empty, 2);

    assert_eq!(read_output(out.path(), "story.txt"), "The dog barked. It ran fast.");
    assert!(!out.path().join("other.txt").exists());
}

#[tokio::test]
async fn test_previous_output_is_overwritten() {
    let reader = FakeReader::new().with("story.pdf", FakeDoc::text(STORY));
    let services = create_test_services(reader, Config::default());
    let out = TempDir::new().unwrap();
    std::fs::write(out.path().join("story.txt"), "stale result").unwrap();

    services
        .runner
        .run(&paths(&["story.pdf"]), &request("cat", 1), out.path())
        .await
        .unwrap();

    assert_eq!(read_output(out.path(), "story.txt"), "The cat sat.");
}

#[tokio::test]
async fn test_images_written_next_to_text() {
    let reader = FakeReader::new().with(
        "atlas.pdf",
        FakeDoc::text(&["The map shows the coast."])
            .with_image(ImageFormat::Png, PNG_BYTES)
            .with_image(ImageFormat::Png, b"garbage")
            .with_image(ImageFormat::Jpeg, JPEG_BYTES),
    );
    let services = create_test_services(reader, Config::default());
    let out = TempDir::new().unwrap();
    let request = ExtractionRequest::builder()
        .keyword("map")
        .want_images(true)
        .build()
        .unwrap();

    let report = services
        .runner
        .run(&paths(&["atlas.pdf"]), &request, out.path())
        .await
        .unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Completed);
    assert_eq!(outcome.result.images_written, 2);
    assert_eq!(outcome.result.images_skipped, 1);
    assert_eq!(report.images_written, 2);
    assert!(out.path().join("atlas.txt").exists());
    assert!(out.path().join("atlas_1.png").exists());
    assert!(out.path().join("atlas_2.jpg").exists());
}

#[tokio::test]
async fn test_images_only_without_keyword() {
    let reader = FakeReader::new().with(
        "scan.pdf",
        FakeDoc::text(&[]).with_image(ImageFormat::Jpeg, JPEG_BYTES),
    );
    let services = create_test_services(reader, Config::default());
    let out = TempDir::new().unwrap();
    let request = ExtractionRequest::builder()
        .want_text(false)
        .want_images(true)
        .build()
        .unwrap();

    let report = services
        .runner
        .run(&paths(&["scan.pdf"]), &request, out.path())
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].status, OutcomeStatus::Completed);
    assert!(out.path().join("scan_1.jpg").exists());
    assert!(!out.path().join("scan.txt").exists());
}

#[tokio::test]
async fn test_images_still_exported_when_keyword_absent() {
    let reader = FakeReader::new().with(
        "atlas.pdf",
        FakeDoc::text(&["Only maps here."]).with_image(ImageFormat::Png, PNG_BYTES),
    );
    let services = create_test_services(reader, Config::default());
    let out = TempDir::new().unwrap();
    let request = ExtractionRequest::builder()
        .keyword("whale")
        .want_images(true)
        .build()
        .unwrap();

    let report = services
        .runner
        .run(&paths(&["atlas.pdf"]), &request, out.path())
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].status, OutcomeStatus::NoMatchFound);
    assert_eq!(report.images_written, 1);
}

#[tokio::test]
async fn test_slow_document_times_out() {
    let reader = FakeReader::new()
        .with(
            "slow.pdf",
            FakeDoc::text(STORY).with_delay(Duration::from_millis(1500)),
        )
        .with("fast.pdf", FakeDoc::text(STORY));
    let runner = BatchRunner::new(Arc::new(reader), &Config::default())
        .with_timeout(Duration::from_millis(200));
    let out = TempDir::new().unwrap();

    let report = runner
        .run(&paths(&["slow.pdf", "fast.pdf"]), &request("dog", 2), out.path())
        .await
        .unwrap();

    assert!(matches!(
        report.outcomes[0].status,
        OutcomeStatus::TimedOut { .. }
    ));
    assert_eq!(report.outcomes[1].status, OutcomeStatus::Completed);
    assert_eq!(report.timed_out, 1);
}

#[tokio::test]
async fn test_timed_out_document_writes_nothing() {
    let reader = FakeReader::new().with(
        "slow.pdf",
        FakeDoc::text(STORY)
            .with_image(ImageFormat::Png, PNG_BYTES)
            .with_delay(Duration::from_millis(600)),
    );
    let runner = BatchRunner::new(Arc::new(reader), &Config::default())
        .with_timeout(Duration::from_millis(100));
    let out = TempDir::new().unwrap();
    let request = ExtractionRequest::builder()
        .keyword("dog")
        .want_images(true)
        .build()
        .unwrap();

    let report = runner
        .run(&paths(&["slow.pdf"]), &request, out.path())
        .await
        .unwrap();
    assert_eq!(report.timed_out, 1);

    // Let the abandoned reader return
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert!(!out.path().join("slow.txt").exists());
    assert!(!out.path().join("slow_1.png").exists());
}

#[tokio::test]
async fn test_timed_out_reader_keeps_its_pool_slot() {
    let reader = FakeReader::new()
        .with("slow1.pdf", FakeDoc::text(STORY).with_delay(Duration::from_millis(800)))
        .with("slow2.pdf", FakeDoc::text(STORY).with_delay(Duration::from_millis(800)))
        .with("fast.pdf", FakeDoc::text(STORY));
    let runner = BatchRunner::new(Arc::new(reader), &Config::default())
        .with_timeout(Duration::from_millis(100))
        .with_concurrency(2);
    let out = TempDir::new().unwrap();
    let start = Instant::now();

    let report = runner
        .run(
            &paths(&["slow1.pdf", "slow2.pdf", "fast.pdf"]),
            &request("dog", 2),
            out.path(),
        )
        .await
        .unwrap();

    assert_eq!(report.timed_out, 2);
    assert_eq!(report.outcomes[2].status, OutcomeStatus::Completed);
    // fast.pdf only starts once one of the slow readers has returned
    assert!(start.elapsed() >= Duration::from_millis(700));
}

#[tokio::test]
async fn test_pool_keeps_input_order() {
    // Earlier inputs take longer, so they finish last
    let mut reader = FakeReader::new();
    let mut names = Vec::new();
    for i in 0..6u64 {
        let name = format!("doc{i}.pdf");
        reader = reader.with(
            &name,
            FakeDoc::text(&[&format!("Document {i} mentions the dog.")])
                .with_delay(Duration::from_millis(60 * (6 - i))),
        );
        names.push(name);
    }
    let mut config = Config::default();
    config.limits.max_concurrent_documents = 3;
    let services = create_test_services(reader, config);
    let out = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();

    let report = services
        .runner
        .run(&inputs, &request("dog", 1), out.path())
        .await
        .unwrap();

    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.path, inputs[i]);
        assert_eq!(
            outcome.result.text.as_deref(),
            Some(format!("Document {i} mentions the dog.").as_str())
        );
    }
}

#[tokio::test]
async fn test_output_dir_created_when_missing() {
    let reader = FakeReader::new().with("story.pdf", FakeDoc::text(STORY));
    let services = create_test_services(reader, Config::default());
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("results/today");

    services
        .runner
        .run(&paths(&["story.pdf"]), &request("dog", 2), &out)
        .await
        .unwrap();

    assert!(out.join("story.txt").exists());
}

#[tokio::test]
async fn test_unwritable_output_aborts_batch() {
    let reader = FakeReader::new().with("story.pdf", FakeDoc::text(STORY));
    let services = create_test_services(reader, Config::default());
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("occupied");
    std::fs::write(&not_a_dir, "file in the way").unwrap();

    let err = services
        .runner
        .run(&paths(&["story.pdf"]), &request("dog", 2), &not_a_dir)
        .await
        .unwrap_err();

    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_search_reports_text_without_files() {
    let reader = FakeReader::new()
        .with("story.pdf", FakeDoc::text(STORY))
        .with("blank.pdf", FakeDoc::text(&[" "]));
    let services = create_test_services(reader, Config::default());

    let outcomes = services
        .runner
        .search(&paths(&["story.pdf", "blank.pdf"]), &request("it", 1))
        .await
        .unwrap();

    assert_eq!(
        outcomes[0].result.text.as_deref(),
        Some("[1] It was happy.\n\n[2] It ran fast.")
    );
    assert_eq!(outcomes[0].result.matches, 2);
    assert!(outcomes[0].text_file.is_none());
    assert!(matches!(
        outcomes[1].status,
        OutcomeStatus::EmptyDocument { .. }
    ));
}

#[tokio::test]
async fn test_keyword_spacing_does_not_prevent_match() {
    let reader = FakeReader::new().with("story.pdf", FakeDoc::text(STORY));
    let services = create_test_services(reader, Config::default());

    let outcomes = services
        .runner
        .search(&paths(&["story.pdf"]), &request("  dog\t barked ", 1))
        .await
        .unwrap();

    assert_eq!(outcomes[0].status, OutcomeStatus::Completed);
    assert_eq!(outcomes[0].result.text.as_deref(), Some("The dog barked."));
}
