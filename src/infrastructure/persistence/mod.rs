mod repositories;

pub use repositories::FsTaskRepository;
