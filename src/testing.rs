//! In-memory stand-ins for the server and the wall clock.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::account::Account;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::remote::{CanvasApi, MiningStatus, PaintOutcome, PixelRead};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read(i64),
    Paint(i64, String),
    Claim(String),
    Status(String),
}

#[derive(Default)]
struct CanvasState {
    colors: HashMap<i64, String>,
    paint_script: VecDeque<PaintOutcome>,
    calls: Vec<Call>,
}

/// Canvas that answers from a local map and records every call.
pub struct ScriptedCanvas {
    state: Mutex<CanvasState>,
    background: String,
    unauthorized: bool,
    failing_side_calls: bool,
}

impl ScriptedCanvas {
    pub fn new(background: &str) -> Self {
        Self {
            state: Mutex::new(CanvasState::default()),
            background: background.to_string(),
            unauthorized: false,
            failing_side_calls: false,
        }
    }

    /// Every read reports a dead session.
    pub fn unauthorized(mut self) -> Self {
        self.unauthorized = true;
        self
    }

    /// Claim and status calls fail.
    pub fn failing_side_calls(mut self) -> Self {
        self.failing_side_calls = true;
        self
    }

    /// Outcomes for the next paints, in order. Later paints succeed.
    pub fn script_paints(self, outcomes: impl IntoIterator<Item = PaintOutcome>) -> Self {
        self.state.lock().unwrap().paint_script.extend(outcomes);
        self
    }

    pub fn set_color(&self, pixel: i64, color: &str) {
        self.state
            .lock()
            .unwrap()
            .colors
            .insert(pixel, color.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn paints(&self) -> Vec<(i64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Paint(pixel, color) => Some((pixel, color)),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Read(pixel) => Some(pixel),
                _ => None,
            })
            .collect()
    }
}

impl CanvasApi for ScriptedCanvas {
    fn get_pixel<'a>(&'a self, pixel: i64, _account: &'a Account) -> BoxFuture<'a, PixelRead> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Read(pixel));
        let read = if self.unauthorized {
            PixelRead::Unauthorized
        } else {
            let color = state.colors.get(&pixel).unwrap_or(&self.background);
            PixelRead::Color(color.clone())
        };
        future::ready(read).boxed()
    }

    fn set_pixel<'a>(
        &'a self,
        pixel: i64,
        color: &'a str,
        _account: &'a Account,
    ) -> BoxFuture<'a, PaintOutcome> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Paint(pixel, color.to_string()));
        let outcome = state
            .paint_script
            .pop_front()
            .unwrap_or(PaintOutcome::Painted);
        if outcome == PaintOutcome::Painted {
            state.colors.insert(pixel, color.to_string());
        }
        future::ready(outcome).boxed()
    }

    fn claim<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<()>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Claim(account.name().to_string()));
        let result = if self.failing_side_calls {
            Err(Error::Status(500))
        } else {
            Ok(())
        };
        future::ready(result).boxed()
    }

    fn status<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<MiningStatus>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Status(account.name().to_string()));
        let result = if self.failing_side_calls {
            Err(Error::Status(500))
        } else {
            Ok(MiningStatus { user_balance: 12.5 })
        };
        future::ready(result).boxed()
    }
}

/// Clock that only moves when something sleeps on it.
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
        future::ready(()).boxed()
    }
}
