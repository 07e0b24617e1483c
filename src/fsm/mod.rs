//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId      │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle         │ —         │ —        │ fn(ctx,io)->Opt<> │  │
//! │  │ Initializing │ —         │ —        │ fn(ctx,io)->Opt<> │  │
//! │  │ Running      │ —         │ —        │ fn(ctx,io)->Opt<> │  │
//! │  │ Error        │ fn(ctx,io)│fn(ctx,io)│ fn(ctx,io)->Opt<> │  │
//! │  │ Shutdown     │ —         │ —        │ fn(ctx,io)->Opt<> │  │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state, and
//! nothing else.  If it returns `Some(next_id)`, the engine runs `on_exit`
//! for the current state, then `on_enter` for the next, and updates the
//! current index.  So a tick evaluates exactly one state and performs at
//! most one transition.
//!
//! Handlers receive `&mut FsmContext` plus `&mut P`, the port set the
//! engine is instantiated for.  Handlers are generic `fn` items, so the
//! table stays a fixed array of plain function pointers: no heap, no `dyn`.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all controller states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Initializing = 1,
    Running = 2,
    Error = 3,
    /// Declared for completeness; no rule enters or leaves it.
    Shutdown = 4,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert a table index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Error` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Initializing,
            2 => Self::Running,
            3 => Self::Error,
            4 => Self::Shutdown,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Error
            }
        }
    }

    /// Upper-case tag used in transition log lines.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Initializing => "INIT",
            Self::Running => "RUNNING",
            Self::Error => "ERROR",
            Self::Shutdown => "SHUTDOWN",
        }
    }
}

impl core::fmt::Display for StateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn<P> = fn(&mut FsmContext, &mut P);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn<P> = fn(&mut FsmContext, &mut P) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor<P> {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<P>>,
    pub on_exit: Option<StateActionFn<P>>,
    pub on_update: StateUpdateFn<P>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and the current index.  Context and ports are
/// passed in on every call so that the owner decides their lifetimes.
pub struct Fsm<P> {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor<P>; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl<P> Fsm<P> {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor<P>; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table
                .iter()
                .enumerate()
                .all(|(idx, row)| row.id as usize == idx),
            "state table rows out of order"
        );
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext, io: &mut P) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx, io);
        }
    }

    /// Advance the FSM by one tick and return the resulting state.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update index → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext, io: &mut P) -> StateId {
        self.tick_count = self.tick_count.wrapping_add(1);

        let next = (self.table[self.current].on_update)(ctx, io);

        if let Some(next_id) = next {
            self.transition(next_id, ctx, io);
        }

        self.current_state()
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count.wrapping_sub(self.state_entry_tick)
    }

    /// Total ticks since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext, io: &mut P) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx, io);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx, io);
        }
    }
}
