use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use subweaver::application::ports::{StagingStore, TaskRepository, TranscriptionEngine};
use subweaver::application::services::{
    TaskService, TranscriptionRunner, TranscriptionWorker, build_subtitle_prompt,
    recover_interrupted_tasks,
};
use subweaver::infrastructure::observability::{TracingConfig, init_tracing};
use subweaver::infrastructure::persistence::FsTaskRepository;
use subweaver::infrastructure::storage::LocalStagingStore;
use subweaver::infrastructure::transcription::{GeminiEngineConfig, GeminiTranscriptionEngine};
use subweaver::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::new(environment, &settings.logging));

    let upload_store: Arc<dyn StagingStore> = Arc::new(
        LocalStagingStore::new(PathBuf::from(&settings.storage.upload_dir))
            .context("Failed to open upload directory")?,
    );
    let subtitle_store: Arc<dyn StagingStore> = Arc::new(
        LocalStagingStore::new(PathBuf::from(&settings.storage.subtitle_dir))
            .context("Failed to open subtitle directory")?,
    );
    let task_repository: Arc<dyn TaskRepository> = Arc::new(
        FsTaskRepository::new(PathBuf::from(&settings.storage.task_dir))
            .context("Failed to open task directory")?,
    );

    let recovered = recover_interrupted_tasks(task_repository.as_ref())
        .await
        .context("Failed to recover interrupted tasks")?;
    if recovered > 0 {
        tracing::warn!(recovered, "Previous run left unfinished tasks");
    }

    let gemini = &settings.gemini;
    let engine: Arc<dyn TranscriptionEngine> = Arc::new(
        GeminiTranscriptionEngine::new(GeminiEngineConfig {
            api_key: gemini.api_key.clone(),
            base_url: Some(gemini.base_url.clone()),
            model: Some(gemini.model.clone()),
            file_poll_interval: Duration::from_millis(gemini.file_poll_interval_ms),
            file_poll_max_attempts: gemini.file_poll_max_attempts,
            request_timeout: Duration::from_secs(gemini.request_timeout_secs),
        })
        .context("Failed to create Gemini client")?,
    );

    let prompt = build_subtitle_prompt(
        &settings.transcription.source_language,
        &settings.transcription.target_language,
    );
    let runner = Arc::new(TranscriptionRunner::new(
        engine,
        Arc::clone(&upload_store),
        Arc::clone(&subtitle_store),
        Arc::clone(&task_repository),
        prompt,
    ));

    let shutdown = CancellationToken::new();
    let (sender, receiver) = mpsc::channel(settings.transcription.queue_capacity);
    let worker = TranscriptionWorker::new(
        receiver,
        runner,
        settings.transcription.max_concurrent_jobs,
        shutdown.child_token(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let task_service = Arc::new(TaskService::new(
        upload_store,
        subtitle_store,
        task_repository,
        sender,
    ));

    let state = AppState {
        task_service,
        settings: settings.clone(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind((settings.server.host.as_str(), settings.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                settings.server.host, settings.server.port
            )
        })?;
    tracing::info!(
        address = %listener.local_addr()?,
        model = %settings.gemini.model,
        target_language = %settings.transcription.target_language,
        "Listening"
    );

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    shutdown.cancel();
    worker_handle.await.context("Transcription worker panicked")?;

    Ok(())
}
