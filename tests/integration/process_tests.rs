use crate::common::TestQueue;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use urlq::storage::QueueStore;
use urlq::worker::{spawn_processes, stop_processes, SpawnOptions, StopReport};
use urlq::UrlStatus;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_processes_drain_and_stop() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(6)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..6)
        .map(|n| format!("{}/p/{}", mock_server.uri(), n))
        .collect();
    let test_queue = TestQueue::with_urls(&urls);

    let manage_dir = TempDir::new().unwrap();
    let options = SpawnOptions {
        count: 2,
        forward_args: vec!["--database".into(), test_queue.path.clone().into_os_string()],
        pid_file: manage_dir.path().join(".pids"),
        log_file: manage_dir.path().join("workers.log"),
        program: Some(PathBuf::from(env!("CARGO_BIN_EXE_urlq"))),
    };

    let pids = spawn_processes(&options).unwrap();
    assert_eq!(pids.len(), 2);

    let mut waited = Duration::ZERO;
    while test_queue.queue.count_by_status(UrlStatus::Done).unwrap() < 6 {
        assert!(
            waited < Duration::from_secs(20),
            "worker processes did not drain the queue"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        waited += Duration::from_millis(100);
    }

    let report = stop_processes(&options.pid_file).unwrap();

    assert_eq!(
        report,
        StopReport {
            stopped: 2,
            skipped: 0
        }
    );
    assert!(!options.pid_file.exists());
    assert_eq!(
        test_queue.queue.count_by_status(UrlStatus::Processing).unwrap(),
        0
    );
}
