//! Discrete-event clock (§4.1): a min-heap of events keyed by time with a
//! deterministic sequence tie-break, plus a one-shot preprocess queue.
//!
//! Callbacks need `&mut Engine`, and `Engine` owns this `Clock` as a field,
//! so callback storage lives in a `SlotMap` here (not in the heap itself):
//! `run_to` extracts a callback by key — ending the borrow of `self.clock`
//! — before invoking it with `&mut Engine`, the same "take the owned value
//! out, then call" shape any single-threaded event loop over shared owned
//! state needs in a borrow-checked language.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use slotmap::SlotMap;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::handles::EventHandle;

pub type EventCallback = Box<dyn FnMut(&mut Engine)>;
pub type Preprocess = Box<dyn FnMut(&mut Engine)>;

struct EventSlot {
    time: f64,
    valid: bool,
    callback: Option<EventCallback>,
}

#[derive(Copy, Clone)]
struct HeapEntry {
    time: f64,
    sequence: u64,
    key: EventHandle,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}
impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so a `BinaryHeap` (max-heap) acts as a min-heap on (time, sequence).
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct Clock {
    time: f64,
    cycle: u64,
    heap: BinaryHeap<HeapEntry>,
    slots: SlotMap<EventHandle, EventSlot>,
    preprocesses: Vec<Preprocess>,
    next_sequence: u64,
    run_to_cycle_limit: u32,
    next_loop_id: u64,
    retired_loops: std::collections::HashSet<u64>,
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new(10_000)
    }
}

impl Clock {
    pub fn new(run_to_cycle_limit: u32) -> Self {
        Clock {
            time: 0.0,
            cycle: 0,
            heap: BinaryHeap::new(),
            slots: SlotMap::with_key(),
            preprocesses: Vec::new(),
            next_sequence: 0,
            run_to_cycle_limit,
            next_loop_id: 0,
            retired_loops: std::collections::HashSet::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Events in the past are discarded silently (§4.1).
    pub fn schedule(&mut self, time: f64, callback: EventCallback) -> Option<EventHandle> {
        if time < self.time {
            return None;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let key = self.slots.insert(EventSlot { time, valid: true, callback: Some(callback) });
        self.heap.push(HeapEntry { time, sequence, key });
        Some(key)
    }

    pub fn cancel(&mut self, handle: EventHandle) {
        if let Some(slot) = self.slots.get_mut(handle) {
            slot.valid = false;
        }
    }

    pub fn add_preprocess(&mut self, cb: Preprocess) {
        self.preprocesses.push(cb);
    }

    fn take_preprocesses(&mut self) -> Vec<Preprocess> {
        std::mem::take(&mut self.preprocesses)
    }

    fn peek_next_time(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.time)
    }

    /// Pops the next heap entry and, if its slot is still valid, removes and
    /// returns the `(time, callback)` pair. Returns `Ok(None)` for a stale
    /// pop (heap and slot agree the caller should loop back to preprocesses)
    /// and `Ok(Some(_))` for a live event ready to fire.
    fn pop_live_event(&mut self) -> Option<(f64, EventCallback)> {
        let entry = self.heap.pop()?;
        let slot = self.slots.remove(entry.key)?;
        if !slot.valid {
            return None;
        }
        slot.callback.map(|cb| (entry.time, cb))
    }

    fn new_loop_id(&mut self) -> u64 {
        let id = self.next_loop_id;
        self.next_loop_id += 1;
        id
    }

    fn retire_loop(&mut self, id: u64) {
        self.retired_loops.insert(id);
    }

    fn loop_is_retired(&self, id: u64) -> bool {
        self.retired_loops.contains(&id)
    }
}

impl Engine {
    /// Runs the clock forward to `target`, per the §4.1 cycle algorithm.
    pub fn run_to(&mut self, target: f64) -> Result<(), EngineError> {
        if target < self.clock.time {
            return Err(EngineError::InvalidTime { requested: target, current: self.clock.time });
        }
        let mut cycles_run: u32 = 0;
        loop {
            let preprocesses = self.clock.take_preprocesses();
            for mut cb in preprocesses {
                cb(self);
            }
            self.clock.cycle += 1;
            cycles_run += 1;
            if cycles_run > self.clock.run_to_cycle_limit {
                return Err(EngineError::CycleLimitExceeded { limit: self.clock.run_to_cycle_limit });
            }
            tracing::debug!(cycle = self.clock.cycle, time = self.clock.time, "clock cycle");

            match self.clock.peek_next_time() {
                None => {
                    self.clock.time = target;
                    return Ok(());
                }
                Some(t) if t >= target => {
                    self.clock.time = target;
                    return Ok(());
                }
                _ => {}
            }

            let Some((time, mut callback)) = self.clock.pop_live_event() else {
                continue;
            };
            self.clock.time = time;
            callback(self);
        }
    }

    /// Runs until exactly the next valid event executes, or returns `false`
    /// if none exist (and no preprocess produced one either).
    pub fn advance(&mut self) -> bool {
        loop {
            let preprocesses = self.clock.take_preprocesses();
            if preprocesses.is_empty() && self.clock.heap.is_empty() {
                return false;
            }
            for mut cb in preprocesses {
                cb(self);
            }
            self.clock.cycle += 1;
            if self.clock.peek_next_time().is_none() {
                return false;
            }
            if let Some((time, mut callback)) = self.clock.pop_live_event() {
                self.clock.time = time;
                callback(self);
                return true;
            }
        }
    }

    pub fn schedule(&mut self, time: f64, callback: EventCallback) -> Option<EventHandle> {
        self.clock.schedule(time, callback)
    }

    pub fn cancel_event(&mut self, handle: EventHandle) {
        self.clock.cancel(handle);
    }

    pub fn add_preprocess(&mut self, cb: Preprocess) {
        self.clock.add_preprocess(cb);
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn cycle(&self) -> u64 {
        self.clock.cycle()
    }

    /// Per-clock loop id allocator backing `schedule_loop`/`cancel_loop`
    /// (§4.9) — deliberately scoped to this `Clock` instance rather than a
    /// process-global counter, per the §9 design note.
    pub(crate) fn new_loop_id(&mut self) -> u64 {
        self.clock.new_loop_id()
    }

    pub(crate) fn retire_loop(&mut self, id: u64) {
        self.clock.retire_loop(id);
    }

    pub(crate) fn loop_is_retired(&self, id: u64) -> bool {
        self.clock.loop_is_retired(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Engine;

    #[test]
    fn run_to_sets_time_exactly() {
        let mut e = Engine::new();
        e.run_to(5.0).unwrap();
        assert_eq!(e.time(), 5.0);
    }

    #[test]
    fn events_fire_in_time_order_with_exact_clock_time() {
        let mut e = Engine::new();
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        for t in [3.0, 1.0, 2.0] {
            let order = order.clone();
            e.schedule(t, Box::new(move |eng| order.borrow_mut().push((t, eng.time()))));
        }
        e.run_to(10.0).unwrap();
        let observed = order.borrow().clone();
        assert_eq!(observed, vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut e = Engine::new();
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        for id in 0..5 {
            let order = order.clone();
            e.schedule(1.0, Box::new(move |_| order.borrow_mut().push(id)));
        }
        e.run_to(2.0).unwrap();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn cancelled_event_does_not_fire() {
        let mut e = Engine::new();
        let fired = std::rc::Rc::new(std::cell::RefCell::new(false));
        let fired2 = fired.clone();
        let handle = e.schedule(1.0, Box::new(move |_| *fired2.borrow_mut() = true)).unwrap();
        e.cancel_event(handle);
        e.run_to(2.0).unwrap();
        assert!(!*fired.borrow());
    }

    #[test]
    fn preprocess_scheduled_during_cycle_k_runs_in_cycle_k_plus_1() {
        let mut e = Engine::new();
        let seen_cycles = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen_cycles2 = seen_cycles.clone();
        e.add_preprocess(Box::new(move |eng| {
            seen_cycles2.borrow_mut().push(eng.cycle());
            let seen_cycles3 = seen_cycles2.clone();
            eng.add_preprocess(Box::new(move |eng2| seen_cycles3.borrow_mut().push(eng2.cycle())));
        }));
        e.run_to(1.0).unwrap();
        let cycles = seen_cycles.borrow().clone();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1], cycles[0] + 1);
    }

    #[test]
    fn invalid_time_is_an_error() {
        let mut e = Engine::new();
        e.run_to(5.0).unwrap();
        assert!(e.run_to(4.0).is_err());
    }

    #[test]
    fn cycle_limit_exceeded_on_zero_delay_self_schedule() {
        let mut e = Engine::new();
        fn reschedule(eng: &mut Engine) {
            eng.schedule(eng.time(), Box::new(reschedule));
        }
        e.schedule(0.0, Box::new(reschedule));
        let err = e.run_to(1.0).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::CycleLimitExceeded { .. }));
    }

    #[test]
    fn advance_runs_exactly_one_event() {
        let mut e = Engine::new();
        let count = std::rc::Rc::new(std::cell::RefCell::new(0));
        for t in [1.0, 2.0] {
            let count = count.clone();
            e.schedule(t, Box::new(move |_| *count.borrow_mut() += 1));
        }
        assert!(e.advance());
        assert_eq!(*count.borrow(), 1);
        assert_eq!(e.time(), 1.0);
        assert!(e.advance());
        assert_eq!(*count.borrow(), 2);
        assert!(!e.advance());
    }
}
