//! Lifecycle tests for the asynchronous file sink

use std::io::Write;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use logsink::{Diagnostics, Error, FileSink, QUEUE_CAPACITY, Sink};
use tempfile::tempdir;

/// Diagnostics handle captured in memory, plus its read side.
fn capture_diagnostics() -> (Diagnostics, Arc<Mutex<Vec<u8>>>) {
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = Diagnostics::with_writer(Box::new(SharedWriter(buffer.clone())));
    (diagnostics, buffer)
}

#[tokio::test]
async fn persists_writes_exactly_once() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let sink = FileSink::new(&path, Diagnostics::stderr())
        .await
        .expect("open sink");

    for i in 0..10 {
        sink.write(Bytes::from(format!("entry {i}\n")))
            .await
            .expect("write");
    }
    sink.close().await.expect("close");

    let contents = std::fs::read_to_string(&path).expect("read log");
    for i in 0..10 {
        assert_eq!(contents.matches(&format!("entry {i}\n")).count(), 1);
    }
}

#[tokio::test]
async fn preserves_single_producer_order() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let sink = FileSink::new(&path, Diagnostics::stderr())
        .await
        .expect("open sink");

    for i in 0..50 {
        sink.write(Bytes::from(format!("entry {i}\n")))
            .await
            .expect("write");
    }
    sink.close().await.expect("close");

    let contents = std::fs::read_to_string(&path).expect("read log");
    let lines: Vec<&str> = contents.lines().collect();
    let expected: Vec<String> = (0..50).map(|i| format!("entry {i}")).collect();
    assert_eq!(lines, expected);
}

#[tokio::test]
async fn creates_missing_directories() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested/deeper/app.log");
    let sink = FileSink::new(&path, Diagnostics::stderr())
        .await
        .expect("open sink");

    sink.write(Bytes::from_static(b"hello\n"))
        .await
        .expect("write");
    sink.close().await.expect("close");

    assert_eq!(std::fs::read_to_string(&path).expect("read log"), "hello\n");
}

#[tokio::test]
async fn appends_to_existing_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    std::fs::write(&path, "first\n").expect("seed file");

    let sink = FileSink::new(&path, Diagnostics::stderr())
        .await
        .expect("open sink");
    sink.write(Bytes::from_static(b"second\n"))
        .await
        .expect("write");
    sink.close().await.expect("close");

    assert_eq!(
        std::fs::read_to_string(&path).expect("read log"),
        "first\nsecond\n"
    );
}

#[tokio::test]
async fn sustains_bursts_beyond_queue_capacity() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let sink = FileSink::new(&path, Diagnostics::stderr())
        .await
        .expect("open sink");

    for i in 0..(QUEUE_CAPACITY * 3) {
        sink.write(Bytes::from(format!("burst {i}\n")))
            .await
            .expect("write");
    }
    sink.close().await.expect("close");

    let contents = std::fs::read_to_string(&path).expect("read log");
    assert_eq!(contents.lines().count(), QUEUE_CAPACITY * 3);
}

#[tokio::test]
async fn concurrent_close_runs_once() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let sink = Arc::new(
        FileSink::new(&path, Diagnostics::stderr())
            .await
            .expect("open sink"),
    );

    sink.write(Bytes::from_static(b"queued\n"))
        .await
        .expect("write");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let sink = sink.clone();
        handles.push(tokio::spawn(async move { sink.close().await }));
    }
    for handle in handles {
        handle.await.expect("join").expect("close");
    }

    // The queued entry is drained exactly once, by the single close
    // sequence.
    assert_eq!(
        std::fs::read_to_string(&path).expect("read log"),
        "queued\n"
    );
}

#[tokio::test]
async fn write_after_close_redirects_to_diagnostics() {
    let (diagnostics, captured) = capture_diagnostics();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let sink = FileSink::new(&path, diagnostics).await.expect("open sink");

    sink.close().await.expect("close");

    let result = sink.write(Bytes::from_static(b"too late\n")).await;
    assert!(matches!(result, Err(Error::SinkClosed)));

    let fallback = String::from_utf8(captured.lock().unwrap().clone()).expect("utf8");
    assert!(fallback.contains("too late"));
    assert!(
        !std::fs::read_to_string(&path)
            .expect("read log")
            .contains("too late")
    );
}

#[tokio::test]
async fn close_after_close_is_a_no_op() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let sink = FileSink::new(&path, Diagnostics::stderr())
        .await
        .expect("open sink");

    sink.close().await.expect("first close");
    sink.close().await.expect("second close");
    sink.close().await.expect("third close");
}

#[tokio::test]
async fn concurrent_producers_each_land_all_entries() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let sink = Arc::new(
        FileSink::new(&path, Diagnostics::stderr())
            .await
            .expect("open sink"),
    );

    let mut producers = Vec::new();
    for p in 0..4 {
        let sink = sink.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..25 {
                sink.write(Bytes::from(format!("p{p} entry {i}\n")))
                    .await
                    .expect("write");
            }
        }));
    }
    for producer in producers {
        producer.await.expect("join");
    }
    sink.close().await.expect("close");

    let contents = std::fs::read_to_string(&path).expect("read log");
    assert_eq!(contents.lines().count(), 100);
    // Per-producer FIFO: each producer's entries appear in its own call
    // order, whatever the interleaving.
    for p in 0..4 {
        let positions: Vec<usize> = (0..25)
            .map(|i| contents.find(&format!("p{p} entry {i}\n")).expect("entry"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
