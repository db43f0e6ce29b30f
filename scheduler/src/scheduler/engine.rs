use super::{
    algorithms::Algorithm,
    batch::BatchOutput,
    error::{ConfigurationError, SchedulerError, ValidationError},
    gantt::{GanttEntry, GanttRecorder, GanttSlot},
    metrics::Metrics,
    observer::EngineObserver,
    options::SchedulerOptions,
    process::{IdAllocator, Process, ProcessConfig, ProcessId, ProcessState},
    samples, Scheduler,
};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// What happened during one tick, reported to the observer afterwards.
#[derive(Debug, Default)]
struct TickEvents {
    ran: Option<ProcessId>,
    context_switch: bool,
    completed: Option<ProcessId>,
}

fn position(processes: &[Process], id: ProcessId) -> Option<usize> {
    processes.iter().position(|process| process.id() == id)
}

fn find(processes: &[Process], id: ProcessId) -> Option<&Process> {
    processes.iter().find(|process| process.id() == id)
}

fn queue_view<'a>(processes: &'a [Process], queue: &VecDeque<ProcessId>) -> Vec<&'a Process> {
    queue.iter().filter_map(|&id| find(processes, id)).collect()
}

/// Drives one simulation: owns the process table, the ready queue, the clock
/// and the strategy of the configured algorithm.
///
/// Two engines never share anything. Comparing algorithms over the same
/// input means two engines, each fed its own clones of the processes.
pub struct SchedulingEngine {
    algorithm: Algorithm,
    policy: Box<dyn Scheduler>,
    options: SchedulerOptions,

    processes: Vec<Process>,
    ready_queue: VecDeque<ProcessId>,
    running: Option<ProcessId>,
    completed: Vec<ProcessId>,
    gantt: GanttRecorder,
    metrics: Metrics,

    current_time: u64,
    state: EngineState,
    ids: IdAllocator,
    auto_sample: bool,
    sample_seed: u64,
    observer: Option<Box<dyn EngineObserver>>,
}

impl Default for SchedulingEngine {
    fn default() -> Self {
        SchedulingEngine::new(Algorithm::Fcfs)
    }
}

impl SchedulingEngine {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            policy: algorithm.build(),
            options: SchedulerOptions::default(),
            processes: Vec::new(),
            ready_queue: VecDeque::new(),
            running: None,
            completed: Vec::new(),
            gantt: GanttRecorder::new(),
            metrics: Metrics::default(),
            current_time: 0,
            state: EngineState::Idle,
            ids: IdAllocator::new(),
            auto_sample: true,
            sample_seed: samples::DEFAULT_SEED,
            observer: None,
        }
    }

    pub fn with_options(
        algorithm: Algorithm,
        options: SchedulerOptions,
    ) -> Result<Self, ConfigurationError> {
        let mut engine = SchedulingEngine::new(algorithm);
        engine.set_options(options)?;
        Ok(engine)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        find(&self.processes, id)
    }

    /// Ready processes in queue order. The running process is not included.
    pub fn ready_queue(&self) -> Vec<&Process> {
        queue_view(&self.processes, &self.ready_queue)
    }

    pub fn running(&self) -> Option<&Process> {
        self.running.and_then(|id| find(&self.processes, id))
    }

    /// Completed processes in completion order.
    pub fn completed(&self) -> Vec<&Process> {
        self.completed
            .iter()
            .filter_map(|&id| find(&self.processes, id))
            .collect()
    }

    pub fn gantt(&self) -> &[GanttEntry] {
        self.gantt.entries()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Feedback queue level the strategy currently assigns to `id`.
    pub fn queue_level(&self, id: ProcessId) -> Option<usize> {
        self.policy.queue_level(id)
    }

    pub fn is_finished(&self) -> bool {
        self.state == EngineState::Completed
    }

    pub fn set_observer(&mut self, observer: Box<dyn EngineObserver>) {
        self.observer = Some(observer);
    }

    pub fn take_observer(&mut self) -> Option<Box<dyn EngineObserver>> {
        self.observer.take()
    }

    /// Whether `start` fills an empty process table with a sample set.
    pub fn set_auto_sample(&mut self, enabled: bool) {
        self.auto_sample = enabled;
    }

    pub fn set_sample_seed(&mut self, seed: u64) {
        self.sample_seed = seed;
    }

    pub fn set_options(&mut self, options: SchedulerOptions) -> Result<(), ConfigurationError> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Switches algorithm by key. The run is reset so no strategy state
    /// carries over.
    pub fn set_algorithm(&mut self, key: &str) -> Result<(), ConfigurationError> {
        let algorithm = key.parse::<Algorithm>()?;
        self.set_algorithm_kind(algorithm);
        Ok(())
    }

    pub fn set_algorithm_kind(&mut self, algorithm: Algorithm) {
        self.reset();
        self.algorithm = algorithm;
        self.policy = algorithm.build();
        debug!(algorithm = %algorithm, "algorithm selected");
    }

    /// Replaces the process table and resets the run.
    pub fn set_processes(&mut self, processes: Vec<Process>) -> Result<(), ValidationError> {
        let mut seen = BTreeSet::new();
        for process in &processes {
            if !seen.insert(process.id()) {
                return Err(ValidationError::DuplicateId { id: process.id() });
            }
        }

        self.reset();
        self.ids.clear();
        self.processes = processes;
        for process in &mut self.processes {
            process.reset();
            self.ids.observe(process.id());
        }
        Ok(())
    }

    /// Adds a process built elsewhere, keeping its id. The engine takes over
    /// its run state, so it starts out fresh.
    pub fn add_process(&mut self, mut process: Process) -> Result<ProcessId, SchedulerError> {
        if self.process(process.id()).is_some() {
            return Err(ValidationError::DuplicateId { id: process.id() }.into());
        }
        if self.algorithm.needs_priority() {
            process.validate_priority(self.algorithm.name())?;
        }

        process.reset();
        let id = process.id();
        self.ids.observe(id);
        self.processes.push(process);
        debug!(pid = id, "process added");
        Ok(id)
    }

    /// Validates `config` and adds it under its own id or the next free one.
    pub fn spawn(&mut self, config: &ProcessConfig) -> Result<ProcessId, SchedulerError> {
        let id = match config.id {
            Some(id) => id,
            None => self.ids.next_id().ok_or(ValidationError::IdsExhausted)?,
        };
        let process = Process::create(id, config)?;
        self.add_process(process)
    }

    pub fn remove_process(&mut self, id: ProcessId) -> Option<Process> {
        let index = position(&self.processes, id)?;
        self.ready_queue.retain(|&queued| queued != id);
        self.completed.retain(|&done| done != id);
        if self.running == Some(id) {
            self.running = None;
            self.policy
                .on_context_switch(None, self.current_time, &self.options);
        }
        debug!(pid = id, "process removed");
        Some(self.processes.remove(index))
    }

    fn validate_for_run(&self) -> Result<(), ValidationError> {
        if self.algorithm.needs_priority() {
            for process in &self.processes {
                process.validate_priority(self.algorithm.name())?;
            }
        }
        Ok(())
    }

    /// Starts a run from `Idle`, or a fresh one from `Completed`.
    ///
    /// An empty table is filled with the sample set when auto sampling is on;
    /// otherwise the call does nothing and the engine stays `Idle`.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        match self.state {
            EngineState::Running | EngineState::Paused => return Ok(()),
            EngineState::Idle | EngineState::Completed => {}
        }

        if self.processes.is_empty() {
            if !self.auto_sample {
                info!("start requested without processes");
                return Ok(());
            }
            let sample = samples::sample_processes(samples::DEFAULT_SAMPLE_COUNT, self.sample_seed);
            self.set_processes(sample)?;
        }
        self.validate_for_run()?;

        self.reset();
        self.state = EngineState::Running;
        info!(
            algorithm = %self.algorithm,
            processes = self.processes.len(),
            "simulation started"
        );
        Ok(())
    }

    /// Freezes the clock. Returns whether the engine was running.
    pub fn pause(&mut self) -> bool {
        if self.state != EngineState::Running {
            return false;
        }
        self.state = EngineState::Paused;
        info!(time = self.current_time, "simulation paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != EngineState::Paused {
            return false;
        }
        self.state = EngineState::Running;
        info!(time = self.current_time, "simulation resumed");
        true
    }

    /// Back to `Idle` with every process and the strategy state restored.
    /// Safe to call in any state, any number of times.
    pub fn reset(&mut self) {
        self.current_time = 0;
        self.ready_queue.clear();
        self.running = None;
        self.completed.clear();
        self.gantt.clear();
        self.metrics = Metrics::default();
        self.policy.reset();
        for process in &mut self.processes {
            process.reset();
        }
        if self.state != EngineState::Idle {
            info!("simulation reset");
        }
        self.state = EngineState::Idle;
    }

    /// Advances the simulation by one tick. Returns false, without touching
    /// anything, unless the engine is running.
    pub fn tick(&mut self) -> bool {
        if self.state != EngineState::Running {
            return false;
        }

        let mut events = TickEvents::default();
        self.advance(&mut events);

        if self.processes.iter().all(Process::is_completed) {
            self.state = EngineState::Completed;
            info!(time = self.current_time, "simulation completed");
        }
        self.refresh_metrics();
        self.notify(&events);
        true
    }

    /// Runs until every process completed and returns the final output.
    pub fn run_to_completion(&mut self) -> Result<BatchOutput, SchedulerError> {
        self.start()?;
        self.resume();
        while self.tick() {}
        Ok(self.output())
    }

    /// Current process table and timeline.
    pub fn output(&self) -> BatchOutput {
        BatchOutput {
            results: self.processes.clone(),
            gantt: self.gantt.entries().to_vec(),
        }
    }

    pub fn refresh_metrics(&mut self) -> &Metrics {
        let processes = &self.processes;
        let completed = self.completed.iter().filter_map(|&id| find(processes, id));
        self.metrics = Metrics::compute(completed, self.gantt.entries());
        &self.metrics
    }

    fn advance(&mut self, events: &mut TickEvents) {
        let now = self.current_time;
        self.admit_arrivals(now);

        match self.running {
            None if !self.ready_queue.is_empty() => {
                if let Some(next) = self.select(now) {
                    self.dispatch(next, now);
                }
            }
            Some(current) => {
                if self.check_preempt(current, now) {
                    self.preempt(current, now);
                }
            }
            None => {}
        }

        let Some(current) = self.running else {
            self.skip_idle(now);
            return;
        };
        let Some(index) = position(&self.processes, current) else {
            self.running = None;
            return;
        };

        let finished = self.processes[index].execute_tick();
        self.policy.on_tick(&self.processes[index], &self.options);
        self.gantt.record_tick(GanttSlot::Process(current), now);
        events.context_switch = self
            .gantt
            .entries()
            .last()
            .is_some_and(|entry| entry.start == now && entry.context_switch);
        events.ran = Some(current);
        trace!(time = now, pid = current, "tick");

        let end = now + 1;
        if finished {
            self.processes[index].complete(end);
            self.completed.push(current);
            self.running = None;
            self.policy.on_context_switch(None, end, &self.options);
            events.completed = Some(current);
            debug!(pid = current, completion = end, "process completed");
        }
        self.current_time = end;
    }

    fn admit_arrivals(&mut self, now: u64) {
        let mut arrivals: Vec<(u64, ProcessId)> = self
            .processes
            .iter()
            .filter(|p| p.state() == ProcessState::Waiting && p.has_arrived(now))
            .map(|p| (p.arrival_time(), p.id()))
            .collect();
        arrivals.sort_unstable();

        for (_, id) in arrivals {
            if let Some(index) = position(&self.processes, id) {
                self.processes[index].set_state(ProcessState::Ready);
                self.ready_queue.push_back(id);
                trace!(time = now, pid = id, "admitted");
            }
        }
    }

    fn select(&mut self, now: u64) -> Option<ProcessId> {
        let ready = queue_view(&self.processes, &self.ready_queue);
        let chosen = self.policy.select_next(&ready, now, &self.options);
        match chosen {
            Some(id) if self.ready_queue.contains(&id) => Some(id),
            Some(id) => {
                warn!(pid = id, "strategy chose a process outside the ready queue");
                self.ready_queue.front().copied()
            }
            None => None,
        }
    }

    fn check_preempt(&mut self, current: ProcessId, now: u64) -> bool {
        let Some(process) = find(&self.processes, current) else {
            return false;
        };
        let ready = queue_view(&self.processes, &self.ready_queue);
        self.policy
            .should_preempt(process, &ready, now, &self.options)
    }

    fn dispatch(&mut self, id: ProcessId, now: u64) {
        let Some(index) = position(&self.processes, id) else {
            return;
        };
        self.ready_queue.retain(|&queued| queued != id);
        self.processes[index].dispatch(now);
        self.running = Some(id);

        self.policy
            .on_context_switch(Some(&self.processes[index]), now, &self.options);
        debug!(time = now, pid = id, "dispatched");
    }

    fn preempt(&mut self, current: ProcessId, now: u64) {
        let Some(index) = position(&self.processes, current) else {
            return;
        };
        self.processes[index].set_state(ProcessState::Ready);
        self.ready_queue.push_back(current);
        self.running = None;
        self.policy
            .on_preempt(&self.processes[index], now, &self.options);

        let next = self.select(now).unwrap_or(current);
        if next != current {
            self.gantt.mark_preempted();
            debug!(time = now, pid = current, by = next, "preempted");
        }
        self.dispatch(next, now);
    }

    /// Jumps the clock to the next arrival, recording the gap as idle.
    fn skip_idle(&mut self, now: u64) {
        let next_arrival = self
            .processes
            .iter()
            .filter(|p| p.state() == ProcessState::Waiting)
            .map(Process::arrival_time)
            .filter(|&arrival| arrival > now)
            .min();

        if let Some(next) = next_arrival {
            self.gantt.record_idle(now, next);
            self.current_time = next;
            trace!(from = now, to = next, "cpu idle");
        }
    }

    fn notify(&mut self, events: &TickEvents) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };

        if events.context_switch {
            observer.on_context_switch();
        }
        if let Some(process) = events.completed.and_then(|id| find(&self.processes, id)) {
            observer.on_process_complete(process);
        }
        let running = events.ran.and_then(|id| find(&self.processes, id));
        observer.on_tick(self.current_time, running);
        observer.on_gantt_update(self.gantt.entries());
        observer.on_metrics_update(&self.metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn engine_with(algorithm: Algorithm, specs: &[(u64, u64)]) -> SchedulingEngine {
        let mut engine = SchedulingEngine::new(algorithm);
        let processes = specs
            .iter()
            .enumerate()
            .map(|(i, &(arrival, burst))| Process::new(i as ProcessId + 1, arrival, burst).unwrap())
            .collect();
        engine.set_processes(processes).unwrap();
        engine
    }

    #[test]
    fn start_without_processes_uses_samples() {
        let mut engine = SchedulingEngine::new(Algorithm::Fcfs);
        engine.start().unwrap();
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.processes().len(), samples::DEFAULT_SAMPLE_COUNT);
    }

    #[test]
    fn start_without_processes_and_samples_is_a_noop() {
        let mut engine = SchedulingEngine::new(Algorithm::Fcfs);
        engine.set_auto_sample(false);
        engine.start().unwrap();
        assert_eq!(engine.state(), EngineState::Idle);

        let output = engine.run_to_completion().unwrap();
        assert!(output.results.is_empty());
        assert!(output.gantt.is_empty());
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut engine = engine_with(Algorithm::Fcfs, &[(0, 4)]);
        engine.start().unwrap();
        assert!(engine.tick());
        assert!(engine.pause());
        let before = engine.output();

        assert!(!engine.tick());
        assert_eq!(engine.current_time(), 1);
        assert_eq!(engine.output(), before);

        assert!(engine.resume());
        assert!(engine.tick());
        assert_eq!(engine.current_time(), 2);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = engine_with(Algorithm::Rr, &[(0, 3), (1, 2)]);
        engine.run_to_completion().unwrap();
        assert!(engine.is_finished());

        engine.reset();
        engine.reset();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.current_time(), 0);
        assert!(engine.gantt().is_empty());
        assert!(engine.completed().is_empty());
        assert_eq!(engine.metrics(), &Metrics::default());
        assert!(engine
            .processes()
            .iter()
            .all(|p| p.state() == ProcessState::Waiting && p.completion_time().is_none()));
    }

    #[test]
    fn idle_gap_is_skipped_in_one_tick() {
        let mut engine = engine_with(Algorithm::Fcfs, &[(3, 2)]);
        engine.start().unwrap();
        engine.tick();
        assert_eq!(engine.current_time(), 3);
        assert_eq!(engine.gantt().len(), 1);
        assert_eq!(engine.gantt()[0].slot, GanttSlot::Idle);
        assert_eq!((engine.gantt()[0].start, engine.gantt()[0].end), (0, 3));
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let mut engine = SchedulingEngine::default();
        assert_eq!(
            engine.set_algorithm("lottery"),
            Err(ConfigurationError::UnknownAlgorithm("lottery".to_owned()))
        );
        assert_eq!(engine.algorithm(), Algorithm::Fcfs);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut engine = SchedulingEngine::default();
        let err = engine
            .set_options(SchedulerOptions::with_quantum(0))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidQuantum(0));
        assert_eq!(engine.options().quantum, 3);
    }

    #[test]
    fn duplicate_ids_are_rejected_without_mutation() {
        let mut engine = engine_with(Algorithm::Fcfs, &[(0, 1)]);
        let err = engine.add_process(Process::new(1, 0, 2).unwrap()).unwrap_err();
        assert_eq!(
            err,
            SchedulerError::Validation(ValidationError::DuplicateId { id: 1 })
        );
        assert_eq!(engine.processes().len(), 1);
    }

    #[test]
    fn spawn_assigns_increasing_ids() {
        let mut engine = SchedulingEngine::default();
        let a = engine.spawn(&ProcessConfig::new(0, 2)).unwrap();
        let b = engine.spawn(&ProcessConfig::new(1, 2)).unwrap();
        assert_eq!((a, b), (1, 2));
        assert!(engine.spawn(&ProcessConfig::new(-1, 2)).is_err());
        assert_eq!(engine.processes().len(), 2);
        assert_eq!(engine.spawn(&ProcessConfig::new(0, 1)).unwrap(), 4);
    }

    #[test]
    fn largest_id_is_accepted_and_ends_allocation() {
        let mut engine = SchedulingEngine::default();
        let config = ProcessConfig {
            id: Some(ProcessId::MAX),
            ..ProcessConfig::new(0, 2)
        };
        assert_eq!(engine.spawn(&config).unwrap(), ProcessId::MAX);

        let err = engine.spawn(&ProcessConfig::new(1, 2)).unwrap_err();
        assert_eq!(
            err,
            SchedulerError::Validation(ValidationError::IdsExhausted)
        );
        assert_eq!(engine.processes().len(), 1);

        let explicit = ProcessConfig {
            id: Some(7),
            ..ProcessConfig::new(1, 2)
        };
        assert_eq!(engine.spawn(&explicit).unwrap(), 7);
    }

    #[test]
    fn priority_algorithms_require_priorities_at_start() {
        let mut engine = engine_with(Algorithm::Fcfs, &[(0, 2)]);
        engine.set_algorithm("priority-np").unwrap();
        let err = engine.start().unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Validation(ValidationError::MissingPriority { id: 1, .. })
        ));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn remove_process_drops_it_from_every_queue() {
        let mut engine = engine_with(Algorithm::Fcfs, &[(0, 3), (0, 3)]);
        engine.start().unwrap();
        engine.tick();
        assert_eq!(engine.running().map(Process::id), Some(1));
        assert_eq!(engine.ready_queue().len(), 1);

        let removed = engine.remove_process(1).unwrap();
        assert_eq!(removed.id(), 1);
        assert!(engine.running().is_none());

        engine.tick();
        assert_eq!(engine.running().map(Process::id), Some(2));
        assert!(engine.remove_process(9).is_none());
    }

    #[derive(Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl EngineObserver for Recorder {
        fn on_tick(&mut self, time: u64, running: Option<&Process>) {
            let pid = running.map(Process::id);
            self.calls.borrow_mut().push(format!("tick {time} {pid:?}"));
        }

        fn on_gantt_update(&mut self, gantt: &[GanttEntry]) {
            self.calls.borrow_mut().push(format!("gantt {}", gantt.len()));
        }

        fn on_metrics_update(&mut self, metrics: &Metrics) {
            self.calls
                .borrow_mut()
                .push(format!("metrics {}", metrics.completed));
        }

        fn on_context_switch(&mut self) {
            self.calls.borrow_mut().push("switch".to_owned());
        }

        fn on_process_complete(&mut self, process: &Process) {
            self.calls
                .borrow_mut()
                .push(format!("complete {}", process.id()));
        }
    }

    #[test]
    fn observer_hooks_fire_in_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine_with(Algorithm::Fcfs, &[(0, 1), (0, 1)]);
        engine.set_observer(Box::new(Recorder {
            calls: Rc::clone(&calls),
        }));
        engine.run_to_completion().unwrap();

        let expected = vec![
            "complete 1",
            "tick 1 Some(1)",
            "gantt 1",
            "metrics 1",
            "switch",
            "complete 2",
            "tick 2 Some(2)",
            "gantt 2",
            "metrics 2",
        ];
        assert_eq!(*calls.borrow(), expected);
    }

    #[test]
    fn idle_between_processes_fires_no_switch() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine_with(Algorithm::Fcfs, &[(0, 2), (5, 1)]);
        engine.set_observer(Box::new(Recorder {
            calls: Rc::clone(&calls),
        }));
        engine.run_to_completion().unwrap();

        assert!(!calls.borrow().iter().any(|call| call == "switch"));
        assert_eq!(engine.metrics().context_switches, 0);
        assert!(engine.gantt().iter().all(|entry| !entry.context_switch));
    }
}
