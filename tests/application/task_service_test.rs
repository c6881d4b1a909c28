use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use subweaver::application::ports::{RepositoryError, TaskRepository};
use subweaver::application::services::{TaskProgress, TaskService, TaskServiceError};
use subweaver::domain::{StoragePath, Task, TaskId, TaskStatus};

use crate::helpers::{SAMPLE_SRT, TestStorage, byte_stream};

#[tokio::test]
async fn given_upload_when_submitting_then_video_is_stored_and_job_is_queued() {
    let storage = TestStorage::new();
    let (sender, mut receiver) = mpsc::channel(4);
    let service = storage.task_service(sender);

    let task_id = service
        .submit(
            "holiday.mov",
            Some("video/quicktime"),
            byte_stream(vec![b"part one ", b"part two"]),
        )
        .await
        .unwrap();

    let queued = receiver.recv().await.unwrap();
    assert_eq!(queued.task_id, task_id);
    assert_eq!(queued.media_type.as_str(), "video/quicktime");
    assert_eq!(queued.display_name, "holiday.mov");
    assert_eq!(
        queued.video_path.as_str(),
        format!("{}.mov", task_id).as_str()
    );

    let stored = storage.upload_store.fetch(&queued.video_path).await.unwrap();
    assert_eq!(stored.as_ref(), b"part one part two");

    let record = storage
        .task_repository
        .get_by_id(task_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, TaskStatus::Submitted);
}

#[tokio::test]
async fn given_two_uploads_when_submitting_then_task_ids_differ() {
    let storage = TestStorage::new();
    let (sender, _receiver) = mpsc::channel(4);
    let service = storage.task_service(sender);

    let first = service
        .submit("a.mp4", None, byte_stream(vec![b"a"]))
        .await
        .unwrap();
    let second = service
        .submit("a.mp4", None, byte_stream(vec![b"a"]))
        .await
        .unwrap();

    assert_ne!(first, second);
}

fn stored_files(storage: &TestStorage) -> usize {
    std::fs::read_dir(storage.upload_dir()).unwrap().count()
}

#[tokio::test]
async fn given_stopped_worker_when_submitting_then_nothing_is_written() {
    let storage = TestStorage::new();
    let (sender, receiver) = mpsc::channel(4);
    drop(receiver);
    let service = storage.task_service(sender);

    let result = service
        .submit("clip.mp4", None, byte_stream(vec![b"video"]))
        .await;

    assert!(matches!(result, Err(TaskServiceError::WorkerUnavailable)));
    assert_eq!(stored_files(&storage), 0);
    for status in [TaskStatus::Submitted, TaskStatus::Failed] {
        assert!(
            storage
                .task_repository
                .list_by_status(status)
                .await
                .unwrap()
                .is_empty()
        );
    }
}

#[tokio::test]
async fn given_full_queue_when_submitting_then_rejects_immediately_without_stranding_a_task() {
    let storage = TestStorage::new();
    let (sender, _receiver) = mpsc::channel(1);
    let service = storage.task_service(sender);
    let first = service
        .submit("a.mp4", None, byte_stream(vec![b"first"]))
        .await
        .unwrap();

    let second = tokio::time::timeout(
        Duration::from_millis(300),
        service.submit("b.mp4", None, byte_stream(vec![b"second"])),
    )
    .await
    .expect("submit must not wait for queue capacity");

    assert!(matches!(second, Err(TaskServiceError::QueueFull)));
    assert_eq!(stored_files(&storage), 1);
    let submitted = storage
        .task_repository
        .list_by_status(TaskStatus::Submitted)
        .await
        .unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].id, first);
}

struct UnwritableTaskRepository;

#[async_trait::async_trait]
impl TaskRepository for UnwritableTaskRepository {
    async fn create(&self, _task: &Task) -> Result<(), RepositoryError> {
        Err(RepositoryError::Storage(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "read-only task directory",
        )))
    }

    async fn get_by_id(&self, _id: TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(None)
    }

    async fn update_status(
        &self,
        id: TaskId,
        _status: TaskStatus,
        _error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound(id))
    }

    async fn list_by_status(&self, _status: TaskStatus) -> Result<Vec<Task>, RepositoryError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn given_record_write_failure_when_submitting_then_stored_video_is_removed() {
    let storage = TestStorage::new();
    let (sender, mut receiver) = mpsc::channel(4);
    let service = TaskService::new(
        Arc::clone(&storage.upload_store),
        Arc::clone(&storage.subtitle_store),
        Arc::new(UnwritableTaskRepository),
        sender,
    );

    let result = service
        .submit("clip.mp4", None, byte_stream(vec![b"video"]))
        .await;

    assert!(matches!(result, Err(TaskServiceError::Repository(_))));
    assert_eq!(stored_files(&storage), 0);
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn given_unknown_or_malformed_id_when_checking_status_then_processing() {
    let storage = TestStorage::new();
    let (sender, _receiver) = mpsc::channel(4);
    let service = storage.task_service(sender);

    assert_eq!(
        service.status("not-a-uuid").await,
        TaskProgress::Processing
    );
    assert_eq!(
        service.status("6f1c2a4e-0000-4000-8000-000000000000").await,
        TaskProgress::Processing
    );
}

#[tokio::test]
async fn given_submitted_task_when_checking_status_then_processing() {
    let storage = TestStorage::new();
    let (sender, _receiver) = mpsc::channel(4);
    let service = storage.task_service(sender);

    let task_id = service
        .submit("clip.mp4", None, byte_stream(vec![b"video"]))
        .await
        .unwrap();

    assert_eq!(
        service.status(&task_id.to_string()).await,
        TaskProgress::Processing
    );
}

#[tokio::test]
async fn given_artifact_on_disk_when_checking_status_then_completed() {
    let storage = TestStorage::new();
    let (sender, _receiver) = mpsc::channel(4);
    let service = storage.task_service(sender);
    let task_id = service
        .submit("clip.mp4", None, byte_stream(vec![b"video"]))
        .await
        .unwrap();

    storage
        .subtitle_store
        .put(&StoragePath::subtitle(&task_id), Bytes::from_static(SAMPLE_SRT.as_bytes()))
        .await
        .unwrap();

    assert_eq!(
        service.status(&task_id.to_string()).await,
        TaskProgress::Completed
    );
    let downloaded = service.download(&task_id.to_string()).await.unwrap();
    assert_eq!(downloaded.unwrap().as_ref(), SAMPLE_SRT.as_bytes());
}

#[tokio::test]
async fn given_failed_record_when_checking_status_then_failure_is_reported() {
    let storage = TestStorage::new();
    let (sender, _receiver) = mpsc::channel(4);
    let service = storage.task_service(sender);
    let task_id = service
        .submit("clip.mp4", None, byte_stream(vec![b"video"]))
        .await
        .unwrap();

    storage
        .task_repository
        .update_status(task_id, TaskStatus::Failed, Some("quota exceeded"))
        .await
        .unwrap();

    assert_eq!(
        service.status(&task_id.to_string()).await,
        TaskProgress::Failed {
            error: "quota exceeded".to_string()
        }
    );
}

#[tokio::test]
async fn given_missing_artifact_when_downloading_then_none() {
    let storage = TestStorage::new();
    let (sender, _receiver) = mpsc::channel(4);
    let service = storage.task_service(sender);

    assert!(service.download("garbage").await.unwrap().is_none());
    assert!(
        service
            .download("6f1c2a4e-0000-4000-8000-000000000000")
            .await
            .unwrap()
            .is_none()
    );
}
