use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Transform,
    Load,
}

impl Phase {
    /// What the item count of a phase counts.
    pub fn unit(&self) -> &'static str {
        match self {
            Phase::Extract => "rows",
            Phase::Transform => "vacancies",
            Phase::Load => "files",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Extract => "Extract",
            Phase::Transform => "Transform",
            Phase::Load => "Load",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessUsage {
    pub cpu_usage: f32,
    pub memory_mb: u64,
}

/// One finished phase: how many items it produced and how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseStats {
    pub phase: Phase,
    pub items: usize,
    pub duration: Duration,
    pub usage: Option<ProcessUsage>,
}

impl PhaseStats {
    pub fn items_per_second(&self) -> Option<f64> {
        let seconds = self.duration.as_secs_f64();
        (seconds > 0.0).then(|| self.items as f64 / seconds)
    }
}

/// Times each pipeline phase and, with the `cli` feature, samples this
/// process's CPU and memory when a phase ends.
pub struct SystemMonitor {
    #[cfg(feature = "cli")]
    system: Mutex<System>,
    #[cfg(feature = "cli")]
    pid: Option<Pid>,
    phase_started: Mutex<Instant>,
    phases: Mutex<Vec<PhaseStats>>,
    start_time: Instant,
    enabled: bool,
}

impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        #[cfg(feature = "cli")]
        let system = {
            let mut system = System::new();
            if enabled {
                system.refresh_all();
            }
            system
        };

        Self {
            #[cfg(feature = "cli")]
            system: Mutex::new(system),
            #[cfg(feature = "cli")]
            pid: sysinfo::get_current_pid().ok(),
            phase_started: Mutex::new(Instant::now()),
            phases: Mutex::new(Vec::new()),
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Restarts the phase clock and forgets phases of an earlier run.
    pub fn begin_run(&self) {
        if !self.enabled {
            return;
        }
        if let Ok(mut started) = self.phase_started.lock() {
            *started = Instant::now();
        }
        if let Ok(mut phases) = self.phases.lock() {
            phases.clear();
        }
    }

    /// Closes `phase`, which produced `items`, and starts the clock for the next one.
    pub fn finish_phase(&self, phase: Phase, items: usize) {
        if !self.enabled {
            return;
        }

        let duration = match self.phase_started.lock() {
            Ok(mut started) => {
                let now = Instant::now();
                let duration = now.duration_since(*started);
                *started = now;
                duration
            }
            Err(_) => return,
        };

        let stats = PhaseStats {
            phase,
            items,
            duration,
            usage: self.sample_usage(),
        };
        log_phase(&stats);

        if let Ok(mut phases) = self.phases.lock() {
            phases.push(stats);
        }
    }

    pub fn phases(&self) -> Vec<PhaseStats> {
        self.phases
            .lock()
            .map(|phases| phases.clone())
            .unwrap_or_default()
    }

    pub fn peak_memory_mb(&self) -> Option<u64> {
        self.phases()
            .iter()
            .filter_map(|stats| stats.usage.map(|usage| usage.memory_mb))
            .max()
    }

    pub fn log_summary(&self) {
        if !self.enabled {
            return;
        }

        let phases = self.phases();
        let breakdown: Vec<String> = phases
            .iter()
            .map(|stats| format!("{} {:?}", stats.phase, stats.duration))
            .collect();
        match self.peak_memory_mb() {
            Some(peak) => tracing::info!(
                "📊 Final Stats - Total Time: {:?} ({}), Peak Memory: {}MB",
                self.start_time.elapsed(),
                breakdown.join(", "),
                peak
            ),
            None => tracing::info!(
                "📊 Final Stats - Total Time: {:?} ({})",
                self.start_time.elapsed(),
                breakdown.join(", ")
            ),
        }
    }

    #[cfg(feature = "cli")]
    fn sample_usage(&self) -> Option<ProcessUsage> {
        let mut system = self.system.lock().ok()?;
        system.refresh_all();
        let process = system.process(self.pid?)?;

        Some(ProcessUsage {
            cpu_usage: process.cpu_usage(),
            memory_mb: process.memory() / 1024 / 1024,
        })
    }

    // Library builds without the cli feature have no sysinfo.
    #[cfg(not(feature = "cli"))]
    fn sample_usage(&self) -> Option<ProcessUsage> {
        None
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

fn log_phase(stats: &PhaseStats) {
    let rate = stats
        .items_per_second()
        .map(|rate| format!(" ({:.0} {}/s)", rate, stats.phase.unit()))
        .unwrap_or_default();

    match stats.usage {
        Some(usage) => tracing::info!(
            phase = %stats.phase,
            items = stats.items,
            "📊 {} - {} {} in {:?}{}, CPU: {:.1}%, Memory: {}MB",
            stats.phase,
            stats.items,
            stats.phase.unit(),
            stats.duration,
            rate,
            usage.cpu_usage,
            usage.memory_mb
        ),
        None => tracing::info!(
            phase = %stats.phase,
            items = stats.items,
            "📊 {} - {} {} in {:?}{}",
            stats.phase,
            stats.items,
            stats.phase.unit(),
            stats.duration,
            rate
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = SystemMonitor::new(false);
        monitor.begin_run();
        monitor.finish_phase(Phase::Extract, 10);

        assert!(!monitor.is_enabled());
        assert!(monitor.phases().is_empty());
        assert_eq!(monitor.peak_memory_mb(), None);
    }

    #[test]
    fn test_phases_keep_their_item_counts() {
        let monitor = SystemMonitor::new(true);
        monitor.begin_run();
        monitor.finish_phase(Phase::Extract, 120);
        monitor.finish_phase(Phase::Transform, 118);
        monitor.finish_phase(Phase::Load, 4);

        let phases = monitor.phases();
        let summary: Vec<(Phase, usize)> = phases.iter().map(|s| (s.phase, s.items)).collect();
        assert_eq!(
            summary,
            vec![(Phase::Extract, 120), (Phase::Transform, 118), (Phase::Load, 4)]
        );
    }

    #[test]
    fn test_begin_run_clears_previous_phases() {
        let monitor = SystemMonitor::new(true);
        monitor.finish_phase(Phase::Extract, 1);
        monitor.begin_run();
        assert!(monitor.phases().is_empty());
    }

    #[test]
    fn test_items_per_second() {
        let stats = PhaseStats {
            phase: Phase::Extract,
            items: 500,
            duration: Duration::from_millis(250),
            usage: None,
        };
        assert_eq!(stats.items_per_second(), Some(2000.0));

        let instant = PhaseStats {
            duration: Duration::ZERO,
            ..stats
        };
        assert_eq!(instant.items_per_second(), None);
        assert_eq!(Phase::Load.unit(), "files");
    }
}
