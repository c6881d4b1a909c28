use std::sync::Arc;

use subweaver::application::services::TranscriptionMessage;
use subweaver::domain::{MediaType, StoragePath, Task, TaskId, TaskStatus};

use crate::helpers::{
    FailingTranscriptionEngine, MockTranscriptionEngine, SAMPLE_SRT, TestStorage, byte_stream,
};

async fn submitted_task(storage: &TestStorage) -> Task {
    let task = Task::new(
        TaskId::new(),
        "clip.mp4".to_string(),
        MediaType::from_upload(Some("video/mp4"), "clip.mp4"),
    );
    storage
        .upload_store
        .store(&task.video_path, byte_stream(vec![b"fake video"]))
        .await
        .unwrap();
    storage.task_repository.create(&task).await.unwrap();
    task
}

#[tokio::test]
async fn given_fenced_reply_when_running_then_sanitized_artifact_is_written() {
    let storage = TestStorage::new();
    let task = submitted_task(&storage).await;
    let reply = format!("Here you go:\n```srt\n{}\n```\nEnjoy!", SAMPLE_SRT);
    let runner = storage.runner(Arc::new(MockTranscriptionEngine::new(reply)));

    let status = runner.run(TranscriptionMessage::from(&task)).await;

    assert_eq!(status, TaskStatus::Done);
    let artifact = storage
        .subtitle_store
        .fetch(&StoragePath::subtitle(&task.id))
        .await
        .unwrap();
    assert_eq!(artifact.as_ref(), SAMPLE_SRT.as_bytes());
}

#[tokio::test]
async fn given_successful_run_when_finished_then_video_is_deleted_and_record_is_done() {
    let storage = TestStorage::new();
    let task = submitted_task(&storage).await;
    let runner = storage.runner(Arc::new(MockTranscriptionEngine::new(SAMPLE_SRT)));

    runner.run(TranscriptionMessage::from(&task)).await;

    assert!(!storage.upload_store.exists(&task.video_path).await.unwrap());
    let record = storage
        .task_repository
        .get_by_id(task.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, TaskStatus::Done);
    assert_eq!(record.error_message, None);
}

#[tokio::test]
async fn given_engine_failure_when_running_then_task_fails_and_video_is_kept() {
    let storage = TestStorage::new();
    let task = submitted_task(&storage).await;
    let runner = storage.runner(Arc::new(FailingTranscriptionEngine));

    let status = runner.run(TranscriptionMessage::from(&task)).await;

    assert_eq!(status, TaskStatus::Failed);
    assert!(storage.upload_store.exists(&task.video_path).await.unwrap());
    assert!(
        !storage
            .subtitle_store
            .exists(&StoragePath::subtitle(&task.id))
            .await
            .unwrap()
    );
    let record = storage
        .task_repository
        .get_by_id(task.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, TaskStatus::Failed);
    assert!(record.error_message.unwrap().contains("upstream exploded"));
}

#[tokio::test]
async fn given_missing_video_when_running_then_engine_is_never_called() {
    let storage = TestStorage::new();
    let task = Task::new(
        TaskId::new(),
        "ghost.mp4".to_string(),
        MediaType::from_raw("video/mp4"),
    );
    storage.task_repository.create(&task).await.unwrap();
    let engine = Arc::new(MockTranscriptionEngine::new(SAMPLE_SRT));
    let runner = storage.runner(engine.clone());

    let status = runner.run(TranscriptionMessage::from(&task)).await;

    assert_eq!(status, TaskStatus::Failed);
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn given_malformed_reply_when_running_then_it_is_persisted_uncorrected() {
    let storage = TestStorage::new();
    let task = submitted_task(&storage).await;
    let runner = storage.runner(Arc::new(MockTranscriptionEngine::new(
        "  no subtitles, sorry  ",
    )));

    let status = runner.run(TranscriptionMessage::from(&task)).await;

    assert_eq!(status, TaskStatus::Done);
    let artifact = storage
        .subtitle_store
        .fetch(&StoragePath::subtitle(&task.id))
        .await
        .unwrap();
    assert_eq!(artifact.as_ref(), b"no subtitles, sorry");
}

#[tokio::test]
async fn given_stored_video_when_running_then_engine_receives_it_as_a_sized_stream() {
    let storage = TestStorage::new();
    let task = Task::new(
        TaskId::new(),
        "lecture.webm".to_string(),
        MediaType::from_upload(None, "lecture.webm"),
    );
    storage
        .upload_store
        .store(
            &task.video_path,
            byte_stream(vec![b"first chunk ", b"second chunk ", b"third"]),
        )
        .await
        .unwrap();
    storage.task_repository.create(&task).await.unwrap();
    let engine = Arc::new(MockTranscriptionEngine::new(SAMPLE_SRT));
    let runner = storage.runner(engine.clone());

    runner.run(TranscriptionMessage::from(&task)).await;

    let (size, received) = engine.received().unwrap();
    assert_eq!(size, 30);
    assert_eq!(received, b"first chunk second chunk third");
}
