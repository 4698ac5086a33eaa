//! One-shot start barrier: units wait here until sensor bring-up succeeded.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

/// Number of tasks that can be parked at the gate at the same time.
pub const GATE_WAITERS: usize = 4;

struct GateState {
    open: bool,
    released: usize,
    waiters: MultiWakerRegistration<GATE_WAITERS>,
}

pub struct StartGate<M>
where
    M: RawMutex,
{
    state: Mutex<M, RefCell<GateState>>,
}

impl<M> StartGate<M>
where
    M: RawMutex,
{
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(GateState {
                open: false,
                released: 0,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Opens the gate and releases every waiter. Opening twice has no effect.
    pub fn open(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if !s.open {
                s.open = true;
                s.waiters.wake();
                debug!("start gate open");
            }
        })
    }

    pub fn is_open(&self) -> bool {
        self.state.lock(|s| s.borrow().open)
    }

    /// How many waits have completed.
    pub fn released(&self) -> usize {
        self.state.lock(|s| s.borrow().released)
    }

    /// Resolves once the gate is open; immediately if it already is.
    pub async fn wait(&self) {
        poll_fn(|cx| {
            self.state.lock(|s| {
                let mut s = s.borrow_mut();
                if s.open {
                    s.released += 1;
                    Poll::Ready(())
                } else {
                    s.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }
}

impl<M> Default for StartGate<M>
where
    M: RawMutex,
{
    fn default() -> Self {
        Self::new()
    }
}
