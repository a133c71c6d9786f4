//! Periodic presenter jobs.
//!
//! Every presenter whose theme entry carries a positive `INTERVAL` becomes a
//! job. Jobs run on one task in due order, so readers and the renderer are
//! never shared across threads.

use statscreen_core::{
    DispatchError, Dispatcher, Presenter, PresenterContext, Renderer, SensorSet, Theme,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};

#[derive(Debug, Clone, Copy)]
struct Job {
    presenter: Presenter,
    period: Duration,
    next_due: Instant,
}

#[derive(Debug)]
pub struct Scheduler {
    theme: Theme,
    sensors: SensorSet,
    ctx: PresenterContext,
    jobs: Vec<Job>,
}

impl Scheduler {
    pub fn new(theme: Theme, mut sensors: SensorSet, ctx: PresenterContext) -> Self {
        let now = Instant::now();
        let mut jobs = Vec::new();

        for presenter in Presenter::ALL {
            let Some(period) = theme.interval(presenter.interval_path()) else {
                log::debug!("{presenter}: no interval configured, not scheduled");
                continue;
            };
            if !presenter.is_supported(&mut sensors) {
                log::warn!("{presenter}: not supported by this backend, not scheduled");
                continue;
            }
            log::debug!("{presenter}: every {period:?}");
            jobs.push(Job {
                presenter,
                period,
                next_due: now,
            });
        }

        Self {
            theme,
            sensors,
            ctx,
            jobs,
        }
    }

    /// Scheduled presenters with their periods.
    pub fn jobs(&self) -> impl Iterator<Item = (Presenter, Duration)> + '_ {
        self.jobs.iter().map(|job| (job.presenter, job.period))
    }

    /// Run every scheduled presenter once.
    pub fn run_once(&mut self, renderer: &mut dyn Renderer) -> Result<(), DispatchError> {
        for index in 0..self.jobs.len() {
            self.run_job(self.jobs[index].presenter, renderer)?;
        }
        Ok(())
    }

    /// Run jobs as they fall due until `shutdown` completes or a fatal
    /// error occurs.
    pub async fn run<F>(&mut self, renderer: &mut dyn Renderer, shutdown: F) -> Result<(), DispatchError>
    where
        F: Future<Output = ()>,
    {
        if self.jobs.is_empty() {
            log::warn!("Theme schedules nothing, exiting");
            return Ok(());
        }

        tokio::pin!(shutdown);
        loop {
            let Some(index) = self.next_job() else {
                return Ok(());
            };
            let due = self.jobs[index].next_due;

            tokio::select! {
                () = &mut shutdown => {
                    log::info!("Shutting down");
                    return Ok(());
                }
                () = time::sleep_until(due) => {}
            }

            let job = self.jobs[index];
            self.run_job(job.presenter, renderer)?;

            // A job that overran skips the missed ticks
            let next_due = job.next_due + job.period;
            self.jobs[index].next_due = next_due.max(Instant::now());
        }
    }

    fn next_job(&self) -> Option<usize> {
        self.jobs
            .iter()
            .enumerate()
            .min_by_key(|(_, job)| job.next_due)
            .map(|(index, _)| index)
    }

    fn run_job(&mut self, presenter: Presenter, renderer: &mut dyn Renderer) -> Result<(), DispatchError> {
        let mut out = Dispatcher::new(&self.theme, renderer);
        match presenter.run(&mut self.sensors, &mut out, &self.ctx) {
            Err(e) if e.is_recoverable() => {
                log::warn!("{presenter}: {e}");
                Ok(())
            }
            Err(e) => {
                log::error!("{presenter}: {e}");
                Err(e)
            }
            Ok(()) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use statscreen_core::{DiskReader, RecordingRenderer, SensorError};
    use statscreen_stub::StaticSensors;

    fn theme() -> Theme {
        Theme::from_value(json!({
            "STATS": {
                "CPU": {
                    "PERCENTAGE": {
                        "INTERVAL": 0.05,
                        "TEXT": { "SHOW": true, "SHOW_UNIT": true }
                    },
                    "FREQUENCY": { "INTERVAL": 0 }
                },
                "DISK": {
                    "INTERVAL": 10,
                    "USED": { "TEXT": { "SHOW": true, "SHOW_UNIT": true } }
                }
            }
        }))
    }

    struct FailingDisk;

    impl DiskReader for FailingDisk {
        fn usage_percent(&mut self) -> Result<f64, SensorError> {
            Err(SensorError::unavailable("df timed out"))
        }

        fn used(&mut self) -> Result<u64, SensorError> {
            self.usage_percent().map(|_| 0)
        }

        fn free(&mut self) -> Result<u64, SensorError> {
            self.usage_percent().map(|_| 0)
        }
    }

    #[test]
    fn test_only_positive_intervals_are_scheduled() {
        let scheduler = Scheduler::new(theme(), StaticSensors.into_sensor_set(), PresenterContext::default());
        let jobs: Vec<_> = scheduler.jobs().collect();
        assert_eq!(
            jobs,
            vec![
                (Presenter::CpuPercentage, Duration::from_millis(50)),
                (Presenter::Disk, Duration::from_secs(10)),
            ]
        );
    }

    #[test]
    fn test_run_once() {
        let mut scheduler = Scheduler::new(theme(), StaticSensors.into_sensor_set(), PresenterContext::default());
        let mut renderer = RecordingRenderer::new();
        scheduler.run_once(&mut renderer).unwrap();
        assert_eq!(renderer.texts(), vec![" 50%", "  300 G"]);
    }

    #[test]
    fn test_sensor_errors_are_skipped() {
        let mut sensors = StaticSensors.into_sensor_set();
        sensors.disk = Box::new(FailingDisk);
        let mut scheduler = Scheduler::new(theme(), sensors, PresenterContext::default());

        let mut renderer = RecordingRenderer::new();
        scheduler.run_once(&mut renderer).unwrap();
        assert_eq!(renderer.texts(), vec![" 50%"]);
    }

    #[test]
    fn test_theme_errors_are_fatal() {
        let theme = Theme::from_value(json!({
            "STATS": { "CPU": { "PERCENTAGE": {
                "INTERVAL": 1,
                "TEXT": { "SHOW": true, "X": "left" }
            } } }
        }));
        let mut scheduler = Scheduler::new(theme, StaticSensors.into_sensor_set(), PresenterContext::default());
        let err = scheduler.run_once(&mut RecordingRenderer::new()).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_run_repeats_until_shutdown() {
        let mut scheduler = Scheduler::new(theme(), StaticSensors.into_sensor_set(), PresenterContext::default());
        let mut renderer = RecordingRenderer::new();
        scheduler
            .run(&mut renderer, time::sleep(Duration::from_millis(180)))
            .await
            .unwrap();

        let cpu_draws = renderer.texts().iter().filter(|text| text.ends_with('%')).count();
        assert!(cpu_draws >= 2, "cpu presenter ran {cpu_draws} times");
        // The disk job only falls due once in that window
        assert_eq!(renderer.texts().iter().filter(|text| text.ends_with('G')).count(), 1);
    }

    #[tokio::test]
    async fn test_run_without_jobs_returns() {
        let theme = Theme::from_value(json!({ "STATS": {} }));
        let mut scheduler = Scheduler::new(theme, StaticSensors.into_sensor_set(), PresenterContext::default());
        scheduler
            .run(&mut RecordingRenderer::new(), std::future::pending())
            .await
            .unwrap();
    }
}
