mod fs_task_repository;

pub use fs_task_repository::FsTaskRepository;
