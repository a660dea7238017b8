//! Runs a painting pass for each account in turn, then pads the cycle out to
//! its fixed period before starting the next one.

use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::account::Account;
use crate::clock::Clock;
use crate::coords::CanvasGeometry;
use crate::image::Target;
use crate::painter::{Pacing, PassReport, Painter};
use crate::remote::CanvasApi;

/// Time left to wait at the end of a cycle, or `None` if it already ran
/// over its period.
pub fn cycle_padding(elapsed: Duration, period: Duration) -> Option<Duration> {
    period.checked_sub(elapsed).filter(|rest| !rest.is_zero())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Account name and pass result, in processing order.
    pub passes: Vec<(String, PassReport)>,
    pub elapsed: Duration,
    pub slept: Option<Duration>,
}

pub struct Scheduler<C, K, R> {
    canvas: C,
    clock: K,
    rng: R,
    accounts: Vec<Account>,
    target: Target,
    geometry: CanvasGeometry,
    pacing: Pacing,
    period: Duration,
}

impl<C, K, R> Scheduler<C, K, R>
where
    C: CanvasApi,
    K: Clock,
    R: Rng,
{
    pub fn new(
        canvas: C,
        clock: K,
        rng: R,
        accounts: Vec<Account>,
        target: Target,
        geometry: CanvasGeometry,
    ) -> Self {
        Self {
            canvas,
            clock,
            rng,
            accounts,
            target,
            geometry,
            pacing: Pacing::default(),
            period: Duration::from_secs(3600),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// One pass over every account, followed by the padding sleep.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let start = self.clock.now();
        let mut passes = Vec::with_capacity(self.accounts.len());

        for account in &self.accounts {
            info!(account = account.name(), "starting session");

            match self.canvas.status(account).await {
                Ok(status) => info!(balance = status.user_balance, "balance"),
                Err(error) => warn!(%error, "failed to fetch mining data"),
            }

            info!("claiming resources");
            if let Err(error) = self.canvas.claim(account).await {
                warn!(%error, "failed to claim resources");
            }

            let painter = Painter::new(
                &self.canvas,
                &self.clock,
                &self.target,
                self.geometry,
                self.pacing,
            );
            let report = painter.run_pass(account, &mut self.rng).await;
            info!(
                account = account.name(),
                end = ?report.end,
                painted = report.painted,
                skipped = report.skipped,
                "session finished"
            );
            passes.push((account.name().to_string(), report));
        }

        let elapsed = self.clock.now().saturating_duration_since(start);
        let slept = cycle_padding(elapsed, self.period);
        match slept {
            Some(rest) => {
                info!(minutes = rest.as_secs() / 60, "sleeping until next cycle");
                self.clock.sleep(rest).await;
            }
            None => info!("no sleep needed"),
        }

        CycleReport {
            passes,
            elapsed,
            slept,
        }
    }

    pub async fn run_forever(&mut self) {
        loop {
            self.run_cycle().await;
        }
    }
}
