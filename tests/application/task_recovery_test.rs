use subweaver::application::services::{INTERRUPTED_MESSAGE, recover_interrupted_tasks};
use subweaver::domain::{MediaType, Task, TaskId, TaskStatus};

use crate::helpers::TestStorage;

fn new_task() -> Task {
    Task::new(
        TaskId::new(),
        "clip.mp4".to_string(),
        MediaType::from_raw("video/mp4"),
    )
}

#[tokio::test]
async fn given_unfinished_tasks_when_recovering_then_they_are_marked_failed() {
    let storage = TestStorage::new();
    let repo = storage.task_repository.as_ref();

    let submitted = new_task();
    repo.create(&submitted).await.unwrap();
    let running = new_task();
    repo.create(&running).await.unwrap();
    repo.update_status(running.id, TaskStatus::Running, None)
        .await
        .unwrap();
    let done = new_task();
    repo.create(&done).await.unwrap();
    repo.update_status(done.id, TaskStatus::Running, None)
        .await
        .unwrap();
    repo.update_status(done.id, TaskStatus::Done, None)
        .await
        .unwrap();

    let recovered = recover_interrupted_tasks(repo).await.unwrap();

    assert_eq!(recovered, 2);
    for id in [submitted.id, running.id] {
        let task = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error_message.as_deref(), Some(INTERRUPTED_MESSAGE));
    }
    let untouched = repo.get_by_id(done.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, TaskStatus::Done);
}

#[tokio::test]
async fn given_empty_repository_when_recovering_then_nothing_is_recovered() {
    let storage = TestStorage::new();

    let recovered = recover_interrupted_tasks(storage.task_repository.as_ref())
        .await
        .unwrap();

    assert_eq!(recovered, 0);
}
