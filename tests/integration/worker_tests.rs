use crate::common::{http_executor, refused_url, TestQueue};
use std::time::Duration;
use urlq::output::load_statistics;
use urlq::storage::QueueStore;
use urlq::worker::{OnEmpty, StepOutcome, Worker, WorkerPool};
use urlq::UrlStatus;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_worker_records_each_outcome() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let urls = vec![
        format!("{}/ok", mock_server.uri()),
        format!("{}/missing", mock_server.uri()),
        refused_url(),
    ];
    let test_queue = TestQueue::with_urls(&urls);

    let report = Worker::new("thread-0", test_queue.store(), http_executor(5), OnEmpty::Stop)
        .run()
        .await;

    assert_eq!(report.processed, 3);
    assert_eq!(report.done, 2);
    assert_eq!(report.errors, 1);

    let records = test_queue.queue.list_records().unwrap();
    assert_eq!(records[0].status, UrlStatus::Done);
    assert_eq!(records[0].http_code, Some(200));
    assert_eq!(records[1].status, UrlStatus::Done);
    assert_eq!(records[1].http_code, Some(404));
    assert_eq!(records[2].status, UrlStatus::Error);
    assert_eq!(records[2].http_code, None);
    assert!(records.iter().all(|r| r.is_consistent()));
}

#[tokio::test]
async fn test_step_on_empty_queue() {
    let test_queue = TestQueue::new();
    let mut worker = Worker::new("thread-0", test_queue.store(), http_executor(5), OnEmpty::Stop);

    assert_eq!(worker.step().await, StepOutcome::QueueEmpty);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_fetches_every_url_once() {
    let mock_server = MockServer::start().await;

    // Verified on drop: a URL fetched twice would fail this
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(30)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..30)
        .map(|n| format!("{}/page/{}", mock_server.uri(), n))
        .collect();
    let test_queue = TestQueue::with_urls(&urls);

    let pool = WorkerPool::spawn(
        5,
        test_queue.store(),
        http_executor(5),
        OnEmpty::Stop,
        Duration::from_millis(20),
    );
    let total = pool.join_total().await.unwrap();

    assert_eq!(total.processed, 30);
    assert_eq!(total.done, 30);

    let stats = load_statistics(&test_queue.queue).unwrap();
    assert_eq!(stats.count(UrlStatus::New), 0);
    assert_eq!(stats.count(UrlStatus::Processing), 0);
    assert_eq!(stats.count(UrlStatus::Done), 30);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_serving_pool_picks_up_late_urls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let test_queue = TestQueue::new();
    let pool = WorkerPool::spawn(
        2,
        test_queue.store(),
        http_executor(5),
        OnEmpty::WaitAndRetry(Duration::from_millis(50)),
        Duration::from_millis(20),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    test_queue
        .queue
        .insert_urls(&[
            format!("{}/late/1", mock_server.uri()),
            format!("{}/late/2", mock_server.uri()),
        ])
        .unwrap();

    let mut waited = Duration::ZERO;
    while test_queue.queue.count_by_status(UrlStatus::Done).unwrap() < 2 {
        assert!(waited < Duration::from_secs(10), "late URLs were never fetched");
        tokio::time::sleep(Duration::from_millis(50)).await;
        waited += Duration::from_millis(50);
    }

    pool.stop();
    let total = pool.join_total().await.unwrap();
    assert_eq!(total.done, 2);
}
