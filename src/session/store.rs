//! The single owned session aggregate and its lock-guarded store.
//!
//! Every writer (engine output readers, the exit monitor, refresh tasks) and
//! every reader (HTTP handlers) goes through [`SessionStore::read`] or
//! [`SessionStore::update`]. Both hold the lock for the whole closure, so a
//! reader never sees half of one snapshot and half of another.
//!
//! Writers that belong to a particular engine use
//! [`SessionStore::update_if_current`] with the generation they were started
//! for. Once a newer submission has replaced the session those updates are
//! dropped.

use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::EngineHandle;
use crate::models::execution::{ExecutionState, ExitInfo};
use crate::models::memory::MemorySnapshot;
use crate::models::register::{Register, RegisterFile};
use crate::session::LogBuffer;

/// Mutable state of one submission-to-exit lifecycle.
#[derive(Debug)]
pub struct Session {
    generation: u64,
    engine: Option<EngineHandle>,
    state: ExecutionState,
    registers: Vec<Register>,
    pending_registers: Option<Vec<Register>>,
    memory: MemorySnapshot,
    logs: LogBuffer,
    suppress_updates: bool,
    exit: Option<ExitInfo>,
    refresh_count: u64,
}

impl Session {
    /// Create the idle session that exists before any submission.
    #[must_use]
    pub fn new(log_capacity: usize) -> Self {
        Self {
            generation: 0,
            engine: None,
            state: ExecutionState::Idle,
            registers: Vec::new(),
            pending_registers: None,
            memory: MemorySnapshot::default(),
            logs: LogBuffer::new(log_capacity),
            suppress_updates: false,
            exit: None,
            refresh_count: 0,
        }
    }

    /// Generation number of this session; bumped on every submission.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Whether the engine of this session has exited.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == ExecutionState::Complete
    }

    /// Handle to the running engine, if one is held.
    #[must_use]
    pub fn engine(&self) -> Option<&EngineHandle> {
        self.engine.as_ref()
    }

    /// The last register snapshot made visible, exactly as reported.
    #[must_use]
    pub fn raw_registers(&self) -> &[Register] {
        &self.registers
    }

    /// The visible register snapshot normalised to 32 entries.
    #[must_use]
    pub fn registers(&self) -> RegisterFile {
        RegisterFile::from_snapshot(&self.registers)
    }

    /// Latest snapshot held back while a run is outstanding.
    #[must_use]
    pub fn pending_registers(&self) -> Option<&[Register]> {
        self.pending_registers.as_deref()
    }

    /// Latest memory dump contents.
    #[must_use]
    pub fn memory(&self) -> &MemorySnapshot {
        &self.memory
    }

    /// Trailing engine log window.
    #[must_use]
    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    /// Whether register snapshots are currently being held back.
    #[must_use]
    pub fn suppress_updates(&self) -> bool {
        self.suppress_updates
    }

    /// How the engine ended, once known.
    #[must_use]
    pub fn exit(&self) -> Option<ExitInfo> {
        self.exit
    }

    /// Number of memory/register refreshes applied to this session.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Replace this session with a fresh one owning `engine`.
    ///
    /// Returns the new generation together with any engine handle the old
    /// session still held, which the caller must cancel.
    pub fn install(&mut self, engine: EngineHandle) -> (u64, Option<EngineHandle>) {
        let previous = self.reset();
        self.engine = Some(engine);
        self.state = ExecutionState::Running;
        (self.generation, previous)
    }

    /// Replace this session with a fresh idle one, e.g. after a failed spawn.
    pub fn reset_idle(&mut self) -> Option<EngineHandle> {
        self.reset()
    }

    fn reset(&mut self) -> Option<EngineHandle> {
        let previous = self.engine.take();
        self.generation += 1;
        self.state = ExecutionState::Idle;
        self.registers.clear();
        self.pending_registers = None;
        self.memory = MemorySnapshot::default();
        self.logs.clear();
        self.suppress_updates = false;
        self.exit = None;
        self.refresh_count = 0;
        previous
    }

    /// Store a register snapshot from the engine, replacing the previous one
    /// wholesale. While updates are suppressed the snapshot is held back.
    pub fn apply_snapshot(&mut self, registers: Vec<Register>) {
        if self.suppress_updates {
            self.pending_registers = Some(registers);
        } else {
            self.registers = registers;
        }
    }

    /// Append a free-text engine output line.
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push(line);
    }

    /// Start or stop holding back register snapshots.
    pub fn set_suppress(&mut self, suppress: bool) {
        self.suppress_updates = suppress;
    }

    /// Make the latest held-back snapshot visible.
    pub fn promote_pending(&mut self) {
        if let Some(registers) = self.pending_registers.take() {
            self.registers = registers;
        }
    }

    /// Close out an outstanding run: stop suppressing and publish the final
    /// snapshot.
    pub fn finish_run(&mut self) {
        self.suppress_updates = false;
        self.promote_pending();
    }

    /// Record that the engine process ended. The final snapshot reported
    /// before exit becomes visible.
    pub fn mark_exited(&mut self, exit: Option<ExitInfo>) {
        self.engine = None;
        self.state = ExecutionState::Complete;
        self.exit = exit;
        self.promote_pending();
    }

    /// Detach the engine handle for an explicit termination, completing the
    /// session.
    pub fn detach(&mut self) -> Option<EngineHandle> {
        let engine = self.engine.take();
        if engine.is_some() {
            self.state = ExecutionState::Complete;
            self.promote_pending();
        }
        engine
    }

    /// Record an exit status learned after the session already completed.
    pub fn record_exit(&mut self, exit: ExitInfo) {
        if self.state == ExecutionState::Complete && self.exit.is_none() {
            self.exit = Some(exit);
        }
    }

    /// Replace the memory snapshot and count one refresh.
    pub fn apply_refresh(&mut self, memory: MemorySnapshot) {
        self.memory = memory;
        self.refresh_count += 1;
    }
}

/// Cheaply clonable handle to the process-wide [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Session>>,
}

impl SessionStore {
    /// Create a store holding an idle session.
    #[must_use]
    pub fn new(log_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Session::new(log_capacity))),
        }
    }

    /// Run `f` against the session under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` against the session under the lock, allowing mutation.
    pub fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Like [`update`](Self::update), but only if the session still belongs
    /// to `generation`. Returns `None` when the update was dropped.
    pub fn update_if_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (guard.generation == generation).then(|| f(&mut guard))
    }

    /// Current session generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read(Session::generation)
    }
}
