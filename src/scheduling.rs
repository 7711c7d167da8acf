//! Timing helpers (§4.9): convenience wrappers over the Clock's primitive
//! `schedule`/`cancel`, plus self-perpetuating loops with clock-scoped ids.

use crate::engine::Engine;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoopHandle(pub(crate) u64);

impl Engine {
    /// Schedules `cb` at `start`, then again every `delay` thereafter until
    /// `cancel_loop` is called. The id is scoped to this `Engine`'s clock,
    /// not a process-global counter (§9).
    pub fn schedule_loop(&mut self, start: f64, delay: f64, cb: impl FnMut(&mut Engine) + 'static) -> LoopHandle {
        let id = self.new_loop_id();
        self.schedule_loop_tick(id, start, delay, Box::new(cb));
        LoopHandle(id)
    }

    pub fn cancel_loop(&mut self, handle: LoopHandle) {
        self.retire_loop(handle.0);
    }

    fn schedule_loop_tick(&mut self, id: u64, time: f64, delay: f64, cb: Box<dyn FnMut(&mut Engine)>) {
        let mut cb = Some(cb);
        self.schedule(
            time,
            Box::new(move |eng| {
                if eng.loop_is_retired(id) {
                    return;
                }
                let mut cb = cb.take().expect("loop tick callback invoked more than once");
                cb(eng);
                if !eng.loop_is_retired(id) {
                    eng.schedule_loop_tick(id, time + delay, delay, cb);
                }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_fires_repeatedly_until_cancelled() {
        let mut e = Engine::new();
        let count = std::rc::Rc::new(std::cell::RefCell::new(0));
        let count2 = count.clone();
        e.schedule_loop(1.0, 1.0, move |_| *count2.borrow_mut() += 1);
        e.run_to(3.5).unwrap();
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn cancelled_loop_stops_rescheduling() {
        let mut e = Engine::new();
        let count = std::rc::Rc::new(std::cell::RefCell::new(0));
        let count2 = count.clone();
        let handle = e.schedule_loop(1.0, 1.0, move |_| *count2.borrow_mut() += 1);
        e.run_to(1.5).unwrap();
        e.cancel_loop(handle);
        e.run_to(10.0).unwrap();
        assert_eq!(*count.borrow(), 1);
    }
}
