use crate::core::{EtlOutcome, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::{Phase, SystemMonitor};

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn run(&self) -> Result<EtlOutcome> {
        tracing::info!("Starting report generation");
        self.monitor.begin_run();

        tracing::info!("Extracting vacancies...");
        let raw_data = self.pipeline.extract()?;
        tracing::info!("Extracted {} valid rows", raw_data.rows.len());
        self.monitor.finish_phase(Phase::Extract, raw_data.rows.len());

        tracing::info!("Aggregating statistics...");
        let result = self.pipeline.transform(raw_data)?;
        tracing::info!(
            "Aggregated {} vacancies over {} years",
            result.statistics.vacancies_total,
            result.statistics.salary_by_years.len()
        );
        self.monitor.finish_phase(Phase::Transform, result.statistics.vacancies_total);

        tracing::info!("Rendering report...");
        let written = self.pipeline.load(&result)?;
        for path in &written {
            tracing::info!("Output saved to: {}", path);
        }
        self.monitor.finish_phase(Phase::Load, written.len());
        self.monitor.log_summary();

        Ok(EtlOutcome { result, written })
    }
}
