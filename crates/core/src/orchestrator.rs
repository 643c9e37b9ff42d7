//! Orchestrator module for mediabatch
//!
//! Drives a readiness-gated batch of jobs through the transcoding engine.
//! Conversions are bounded by a semaphore sized from the concurrency plan; with
//! one permit the batch runs serially in registration order. Work is always
//! started in registration order, and per-job exclusion comes from the
//! registry's atomic Pending -> Converting claim.

use crate::batch::BatchResult;
use crate::concurrency::ConcurrencyPlan;
use crate::engine::{ConversionRequest, EngineError, EngineHandle};
use crate::error::BatchError;
use crate::job::{JobId, JobStatus};
use crate::registry::{Claim, JobRegistry};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

/// Runs conversions against an owned engine.
#[derive(Debug)]
pub struct Orchestrator {
    engine: Arc<EngineHandle>,
    semaphore: Arc<Semaphore>,
    plan: ConcurrencyPlan,
}

impl Orchestrator {
    pub fn new(engine: EngineHandle, plan: ConcurrencyPlan) -> Self {
        let permits = plan.max_concurrent_jobs.max(1) as usize;
        Self {
            engine: Arc::new(engine),
            semaphore: Arc::new(Semaphore::new(permits)),
            plan,
        }
    }

    /// Orchestrator using the serial reference policy.
    pub fn serial(engine: EngineHandle) -> Self {
        Self::new(engine, ConcurrencyPlan::serial())
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn concurrency_plan(&self) -> &ConcurrencyPlan {
        &self.plan
    }

    /// Get the number of available permits (slots for concurrent conversions)
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Acquire a conversion slot, waiting if all slots are in use
    async fn acquire_permit(&self) -> OwnedSemaphorePermit {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore should not be closed")
    }

    /// Convert every job of a ready registry.
    ///
    /// The batch is the registry's jobs at call time; later registrations are
    /// not included. Jobs stay `Pending` until the engine is initialized, and an
    /// initialization failure aborts the whole batch with `EngineInit`. After
    /// that, each job ends `Converted` or `Failed` independently of the others.
    /// Jobs that are already terminal are left as they are.
    pub async fn convert_batch(&self, registry: &JobRegistry) -> Result<BatchResult, BatchError> {
        let ids = registry.capture_batch()?;

        self.engine
            .ensure_initialized()
            .await
            .map_err(BatchError::EngineInit)?;

        tracing::info!(
            jobs = ids.len(),
            max_concurrent_jobs = self.plan.max_concurrent_jobs,
            "starting batch"
        );

        let mut tasks = JoinSet::new();
        for id in ids.iter().copied() {
            // Taking the permit before spawning keeps start order = registration order.
            let permit = self.acquire_permit().await;
            let engine = self.engine.clone();
            let registry = registry.clone();
            tasks.spawn(async move { run_job(&engine, &registry, id, permit).await });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "batch task aborted");
            }
        }

        let result = BatchResult::new(registry.clone(), ids);
        let summary = result.summary();
        tracing::info!(
            converted = summary.converted,
            failed = summary.failed,
            "batch finished"
        );
        Ok(result)
    }

    /// Convert a single job, e.g. to retry a failed job after assigning a new
    /// target.
    ///
    /// Returns the job's final status, or `None` when the job was removed while
    /// its conversion was in flight. A terminal job is not converted again; its
    /// status is returned unchanged.
    pub async fn convert_job(
        &self,
        registry: &JobRegistry,
        id: JobId,
    ) -> Result<Option<JobStatus>, BatchError> {
        let job = registry.get(id).ok_or(BatchError::UnknownJob(id))?;
        if job.is_converting() {
            return Err(BatchError::JobBusy(id));
        }
        if job.target_extension().is_none() {
            return Err(BatchError::NotReady);
        }

        self.engine
            .ensure_initialized()
            .await
            .map_err(BatchError::EngineInit)?;

        let permit = self.acquire_permit().await;
        match registry.claim(id)? {
            Claim::AlreadyTerminal(status) => Ok(Some(status)),
            Claim::Started(request) => {
                Ok(execute(&self.engine, registry, id, request, permit).await)
            }
        }
    }
}

/// Claim and convert one job of a running batch. Jobs that were removed, are
/// owned by another operation, or are already terminal are skipped.
async fn run_job(
    engine: &Arc<EngineHandle>,
    registry: &JobRegistry,
    id: JobId,
    permit: OwnedSemaphorePermit,
) -> Option<JobStatus> {
    if !engine.is_initialized() {
        tracing::warn!(job_id = %id, "engine not initialized; job left pending");
        return None;
    }

    match registry.claim(id) {
        Ok(Claim::Started(request)) => execute(engine, registry, id, request, permit).await,
        Ok(Claim::AlreadyTerminal(status)) => Some(status),
        Err(e) => {
            tracing::debug!(job_id = %id, error = %e, "job skipped");
            None
        }
    }
}

/// Convert a claimed job and wait for its outcome.
///
/// If the caller stops waiting, the conversion still runs to the end and its
/// result is still recorded, so a claimed job never stays `Converting`.
async fn execute(
    engine: &Arc<EngineHandle>,
    registry: &JobRegistry,
    id: JobId,
    request: ConversionRequest,
    permit: OwnedSemaphorePermit,
) -> Option<JobStatus> {
    match spawn_conversion(engine.clone(), registry.clone(), id, request, permit).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(job_id = %id, error = %e, "conversion task aborted");
            registry.get(id).map(|job| job.status())
        }
    }
}

/// Detached task owning one conversion from engine call to `finish`.
///
/// The engine call runs in a nested task so a panic inside the engine becomes
/// an ordinary failure of this job. The permit is held until the result is
/// recorded.
fn spawn_conversion(
    engine: Arc<EngineHandle>,
    registry: JobRegistry,
    id: JobId,
    request: ConversionRequest,
    permit: OwnedSemaphorePermit,
) -> JoinHandle<Option<JobStatus>> {
    tokio::spawn(async move {
        let _permit = permit;
        let result = match tokio::spawn(async move { engine.convert(request).await }).await {
            Ok(result) => result,
            Err(join_err) => Err(EngineError::Failed(format!(
                "Conversion task panicked: {}",
                join_err
            ))),
        };
        registry.finish(id, result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ConvertedFile, Engine};
    use crate::job::{output_file_name, Job, UploadedFile};
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scriptable engine: fails listed targets, optionally waits on gates.
    #[derive(Default)]
    struct StubEngine {
        fail_targets: HashSet<String>,
        panic_targets: HashSet<String>,
        fail_init: bool,
        init_gate: Option<Arc<Semaphore>>,
        convert_gate: Option<Arc<Semaphore>>,
        delay: Option<Duration>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubEngine {
        fn failing(targets: &[&str]) -> Self {
            Self {
                fail_targets: targets.iter().map(|t| t.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Engine for StubEngine {
        async fn initialize(&self) -> Result<(), EngineError> {
            if let Some(gate) = &self.init_gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.fail_init {
                return Err(EngineError::Unavailable("wasm core missing".to_string()));
            }
            Ok(())
        }

        async fn convert(&self, request: ConversionRequest) -> Result<ConvertedFile, EngineError> {
            self.calls.lock().push(request.source_name.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(gate) = &self.convert_gate {
                gate.acquire().await.unwrap().forget();
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_targets.contains(&request.target_extension) {
                panic!("decoder blew up");
            }
            if self.fail_targets.contains(&request.target_extension) {
                return Err(EngineError::Failed(format!(
                    "cannot encode {}",
                    request.target_extension
                )));
            }
            Ok(ConvertedFile {
                bytes: Bytes::from(format!("{}->{}", request.source_extension, request.target_extension)),
                file_name: output_file_name(&request.source_name, &request.target_extension),
            })
        }
    }

    fn photo() -> UploadedFile {
        UploadedFile::new("photo.jpg", "image/jpeg", vec![0xFFu8; 128])
    }

    fn clip() -> UploadedFile {
        UploadedFile::new("clip.mov", "video/quicktime", vec![0x00u8; 512])
    }

    fn orchestrator(engine: StubEngine) -> (Orchestrator, Arc<StubEngine>) {
        let engine = Arc::new(engine);
        let orchestrator = Orchestrator::serial(EngineHandle::from_arc(engine.clone()));
        (orchestrator, engine)
    }

    async fn wait_for_status(registry: &JobRegistry, id: JobId, status: JobStatus) {
        for _ in 0..200 {
            if registry.get(id).map(|j| j.status()) == Some(status) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {} never reached {}", id, status);
    }

    #[tokio::test]
    async fn test_photo_and_clip_scenario() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo(), clip()]).unwrap();
        let (photo_id, clip_id) = (jobs[0].id(), jobs[1].id());
        assert!(!registry.is_ready());

        registry.assign_target(photo_id, "png").unwrap();
        assert!(!registry.is_ready());
        registry.assign_target(clip_id, "mp4").unwrap();
        assert!(registry.is_ready());

        let (orchestrator, _) = orchestrator(StubEngine::failing(&["mp4"]));
        let result = orchestrator.convert_batch(&registry).await.unwrap();

        let photo = registry.get(photo_id).unwrap();
        let clip = registry.get(clip_id).unwrap();
        assert_eq!(photo.status(), JobStatus::Converted);
        assert_eq!(photo.output().unwrap().file_name, "photo.png");
        assert_eq!(clip.status(), JobStatus::Failed);
        assert!(clip.error().unwrap().message.contains("mp4"));

        let downloadable: Vec<JobId> = result.downloadable().iter().map(Job::id).collect();
        assert_eq!(downloadable, vec![photo_id]);
        assert!(result.is_complete());
        assert!(result.has_any_failure());
    }

    #[tokio::test]
    async fn test_not_ready_is_rejected() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo(), clip()]).unwrap();
        registry.assign_target(jobs[0].id(), "png").unwrap();

        let (orchestrator, engine) = orchestrator(StubEngine::default());
        assert!(matches!(
            orchestrator.convert_batch(&registry).await,
            Err(BatchError::NotReady)
        ));
        assert!(engine.calls.lock().is_empty());
        assert!(!orchestrator.engine().is_initialized());
    }

    #[tokio::test]
    async fn test_empty_registry_is_not_ready() {
        let (orchestrator, _) = orchestrator(StubEngine::default());
        assert!(matches!(
            orchestrator.convert_batch(&JobRegistry::new()).await,
            Err(BatchError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_engine_init_failure_aborts_batch() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo()]).unwrap();
        registry.assign_target(jobs[0].id(), "png").unwrap();

        let (orchestrator, engine) = orchestrator(StubEngine {
            fail_init: true,
            ..StubEngine::default()
        });

        assert!(matches!(
            orchestrator.convert_batch(&registry).await,
            Err(BatchError::EngineInit(_))
        ));
        assert_eq!(registry.get(jobs[0].id()).unwrap().status(), JobStatus::Pending);
        assert!(engine.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_jobs_stay_pending_until_engine_initialized() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo(), clip()]).unwrap();
        registry.assign_target(jobs[0].id(), "png").unwrap();
        registry.assign_target(jobs[1].id(), "mkv").unwrap();

        let init_gate = Arc::new(Semaphore::new(0));
        let (orchestrator, _) = orchestrator(StubEngine {
            init_gate: Some(init_gate.clone()),
            ..StubEngine::default()
        });
        let orchestrator = Arc::new(orchestrator);

        let handle = {
            let orchestrator = orchestrator.clone();
            let registry = registry.clone();
            tokio::spawn(async move { orchestrator.convert_batch(&registry).await })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(registry
            .snapshot()
            .iter()
            .all(|j| j.status() == JobStatus::Pending));
        assert!(!orchestrator.engine().is_initialized());

        init_gate.add_permits(1);
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.downloadable().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_all_jobs_terminal() {
        let registry = JobRegistry::new();
        let files = vec![
            UploadedFile::new("a.wav", "audio/wav", vec![1u8; 8]),
            UploadedFile::new("b.wav", "audio/wav", vec![2u8; 8]),
            UploadedFile::new("c.wav", "audio/wav", vec![3u8; 8]),
        ];
        let jobs = registry.register(files).unwrap();
        registry.assign_target(jobs[0].id(), "flac").unwrap();
        registry.assign_target(jobs[1].id(), "mp3").unwrap();
        registry.assign_target(jobs[2].id(), "ogg").unwrap();

        let (orchestrator, engine) = orchestrator(StubEngine::failing(&["flac"]));
        let result = orchestrator.convert_batch(&registry).await.unwrap();

        assert!(registry.snapshot().iter().all(Job::is_terminal));
        assert_eq!(result.summary().failed, 1);
        assert_eq!(result.summary().converted, 2);
        assert_eq!(*engine.calls.lock(), vec!["a.wav", "b.wav", "c.wav"]);
    }

    #[tokio::test]
    async fn test_engine_panic_is_recorded_as_failure() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo(), clip()]).unwrap();
        registry.assign_target(jobs[0].id(), "bmp").unwrap();
        registry.assign_target(jobs[1].id(), "webm").unwrap();

        let (orchestrator, _) = orchestrator(StubEngine {
            panic_targets: ["bmp".to_string()].into_iter().collect(),
            ..StubEngine::default()
        });
        orchestrator.convert_batch(&registry).await.unwrap();

        let photo = registry.get(jobs[0].id()).unwrap();
        assert_eq!(photo.status(), JobStatus::Failed);
        assert!(photo.error().unwrap().message.contains("panicked"));
        assert_eq!(registry.get(jobs[1].id()).unwrap().status(), JobStatus::Converted);
    }

    #[tokio::test]
    async fn test_removal_mid_conversion_drops_result() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo(), clip()]).unwrap();
        let (photo_id, clip_id) = (jobs[0].id(), jobs[1].id());
        registry.assign_target(photo_id, "png").unwrap();
        registry.assign_target(clip_id, "mp4").unwrap();

        let gate = Arc::new(Semaphore::new(0));
        let (orchestrator, _) = orchestrator(StubEngine {
            convert_gate: Some(gate.clone()),
            ..StubEngine::default()
        });
        let orchestrator = Arc::new(orchestrator);

        let handle = {
            let orchestrator = orchestrator.clone();
            let registry = registry.clone();
            tokio::spawn(async move { orchestrator.convert_batch(&registry).await })
        };

        wait_for_status(&registry, photo_id, JobStatus::Converting).await;
        assert!(matches!(registry.reset(), Err(BatchError::BatchBusy)));
        assert!(registry.remove(photo_id));
        gate.add_permits(2);

        let result = handle.await.unwrap().unwrap();
        assert!(registry.get(photo_id).is_none());
        assert_eq!(registry.get(clip_id).unwrap().status(), JobStatus::Converted);
        assert_eq!(result.jobs().len(), 1);
        assert!(result.is_complete());
    }

    #[tokio::test]
    async fn test_dropped_batch_still_records_in_flight_result() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo(), clip()]).unwrap();
        let (photo_id, clip_id) = (jobs[0].id(), jobs[1].id());
        registry.assign_target(photo_id, "png").unwrap();
        registry.assign_target(clip_id, "mp4").unwrap();

        let gate = Arc::new(Semaphore::new(0));
        let (orchestrator, _) = orchestrator(StubEngine {
            convert_gate: Some(gate.clone()),
            ..StubEngine::default()
        });
        let orchestrator = Arc::new(orchestrator);

        let handle = {
            let orchestrator = orchestrator.clone();
            let registry = registry.clone();
            tokio::spawn(async move { orchestrator.convert_batch(&registry).await })
        };
        wait_for_status(&registry, photo_id, JobStatus::Converting).await;

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        // The in-flight conversion keeps its slot until it finishes.
        assert_eq!(orchestrator.available_permits(), 0);

        gate.add_permits(1);
        wait_for_status(&registry, photo_id, JobStatus::Converted).await;
        assert_eq!(registry.get(clip_id).unwrap().status(), JobStatus::Pending);
        for _ in 0..200 {
            if orchestrator.available_permits() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(orchestrator.available_permits(), 1);

        registry.assign_target(photo_id, "gif").unwrap();
        registry.reset().unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_timed_out_convert_job_still_finishes() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo()]).unwrap();
        let id = jobs[0].id();
        registry.assign_target(id, "png").unwrap();

        let (orchestrator, _) = orchestrator(StubEngine {
            delay: Some(Duration::from_millis(50)),
            ..StubEngine::default()
        });

        let outcome =
            tokio::time::timeout(Duration::from_millis(10), orchestrator.convert_job(&registry, id))
                .await;
        assert!(outcome.is_err());
        assert_eq!(registry.get(id).unwrap().status(), JobStatus::Converting);

        wait_for_status(&registry, id, JobStatus::Converted).await;
        registry.reset().unwrap();
    }

    #[tokio::test]
    async fn test_later_registrations_are_not_in_batch() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo()]).unwrap();
        registry.assign_target(jobs[0].id(), "png").unwrap();

        let gate = Arc::new(Semaphore::new(0));
        let (orchestrator, _) = orchestrator(StubEngine {
            convert_gate: Some(gate.clone()),
            ..StubEngine::default()
        });
        let orchestrator = Arc::new(orchestrator);

        let handle = {
            let orchestrator = orchestrator.clone();
            let registry = registry.clone();
            tokio::spawn(async move { orchestrator.convert_batch(&registry).await })
        };

        wait_for_status(&registry, jobs[0].id(), JobStatus::Converting).await;
        let late = registry.register(vec![clip()]).unwrap();
        gate.add_permits(1);

        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.ids(), &[jobs[0].id()]);
        assert_eq!(registry.get(late[0].id()).unwrap().status(), JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_retry_failed_job_with_new_target() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![clip()]).unwrap();
        let id = jobs[0].id();
        registry.assign_target(id, "mp4").unwrap();

        let (orchestrator, _) = orchestrator(StubEngine::failing(&["mp4"]));
        orchestrator.convert_batch(&registry).await.unwrap();
        assert_eq!(registry.get(id).unwrap().status(), JobStatus::Failed);

        registry.assign_target(id, "mp3").unwrap();
        let job = registry.get(id).unwrap();
        assert_eq!(job.status(), JobStatus::Pending);
        assert!(job.error().is_none());

        let status = orchestrator.convert_job(&registry, id).await.unwrap();
        assert_eq!(status, Some(JobStatus::Converted));
        assert_eq!(
            registry.get(id).unwrap().output().unwrap().file_name,
            "clip.mp3"
        );
    }

    #[tokio::test]
    async fn test_convert_job_preconditions() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo()]).unwrap();
        let (orchestrator, _) = orchestrator(StubEngine::default());

        assert!(matches!(
            orchestrator.convert_job(&registry, JobId::new()).await,
            Err(BatchError::UnknownJob(_))
        ));
        assert!(matches!(
            orchestrator.convert_job(&registry, jobs[0].id()).await,
            Err(BatchError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_rerun_leaves_terminal_jobs_alone() {
        let registry = JobRegistry::new();
        let jobs = registry.register(vec![photo()]).unwrap();
        registry.assign_target(jobs[0].id(), "png").unwrap();

        let (orchestrator, engine) = orchestrator(StubEngine::default());
        orchestrator.convert_batch(&registry).await.unwrap();
        orchestrator.convert_batch(&registry).await.unwrap();
        assert_eq!(
            orchestrator.convert_job(&registry, jobs[0].id()).await.unwrap(),
            Some(JobStatus::Converted)
        );

        assert_eq!(engine.calls.lock().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bounded_by_plan() {
        let registry = JobRegistry::new();
        let files = (0..8)
            .map(|i| UploadedFile::new(format!("shot{}.png", i), "image/png", vec![0u8; 8]))
            .collect();
        let jobs = registry.register(files).unwrap();
        for job in &jobs {
            registry.assign_target(job.id(), "webp").unwrap();
        }

        let engine = Arc::new(StubEngine {
            delay: Some(Duration::from_millis(20)),
            ..StubEngine::default()
        });
        let plan = ConcurrencyPlan {
            total_cores: 8,
            max_concurrent_jobs: 2,
        };
        let orchestrator = Orchestrator::new(EngineHandle::from_arc(engine.clone()), plan);
        let result = orchestrator.convert_batch(&registry).await.unwrap();

        assert_eq!(result.downloadable().len(), 8);
        assert!(engine.max_in_flight.load(Ordering::SeqCst) <= 2);
        assert_eq!(orchestrator.available_permits(), 2);
    }

    // After a batch over any mix of succeeding and failing targets, no job is
    // left pending or converting and failures match the failing targets.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_batch_leaves_every_job_terminal(
            fails in prop::collection::vec(proptest::bool::ANY, 1..6),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let registry = JobRegistry::new();
            let files = (0..fails.len())
                .map(|i| UploadedFile::new(format!("track{}.wav", i), "audio/wav", vec![0u8; 4]))
                .collect();
            let jobs = registry.register(files).unwrap();
            for (job, fail) in jobs.iter().zip(&fails) {
                registry.assign_target(job.id(), if *fail { "wma" } else { "mp3" }).unwrap();
            }

            let (orchestrator, _) = orchestrator(StubEngine::failing(&["wma"]));
            let result = runtime.block_on(orchestrator.convert_batch(&registry)).unwrap();

            prop_assert!(registry.snapshot().iter().all(Job::is_terminal));
            prop_assert!(result.is_complete());
            for (job, fail) in jobs.iter().zip(&fails) {
                let expected = if *fail { JobStatus::Failed } else { JobStatus::Converted };
                prop_assert_eq!(registry.get(job.id()).unwrap().status(), expected);
            }
        }
    }
}
