//! One account's reconciliation pass over the target region.
//!
//! Pixels are visited one at a time in a fresh random order with a jittered
//! pause before each read. A pixel is painted only when it isn't transparent
//! and the canvas doesn't already show the wanted color. The pass stops
//! early when the session dies or a paint is refused.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::account::Account;
use crate::clock::Clock;
use crate::coords::CanvasGeometry;
use crate::image::Target;
use crate::remote::{CanvasApi, PaintOutcome, PixelRead};

/// Delay before each pixel read: `base` plus up to `jitter`, uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub base: Duration,
    pub jitter: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(50),
            jitter: Duration::from_millis(100),
        }
    }
}

impl Pacing {
    pub fn delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rng.gen_range(0..=jitter_ms))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Transparent,
    AlreadyPainted,
}

/// What happened at a single pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelVisit {
    Painted,
    Skipped(SkipReason),
    EnergyExhausted,
    SessionInvalid,
    TransientError(String),
}

/// Why a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEnd {
    /// Every pixel was visited.
    Completed,
    SessionInvalid,
    EnergyExhausted,
    PaintFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub end: PassEnd,
    pub visited: usize,
    pub painted: usize,
    pub skipped: usize,
}

/// Every `(x, y)` of a `width × height` grid, in random order.
pub fn shuffled_domain<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let mut order: Vec<(usize, usize)> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .collect();
    order.shuffle(rng);
    order
}

pub struct Painter<'a, C: ?Sized, K: ?Sized> {
    canvas: &'a C,
    clock: &'a K,
    target: &'a Target,
    geometry: CanvasGeometry,
    pacing: Pacing,
}

impl<'a, C, K> Painter<'a, C, K>
where
    C: CanvasApi + ?Sized,
    K: Clock + ?Sized,
{
    pub fn new(
        canvas: &'a C,
        clock: &'a K,
        target: &'a Target,
        geometry: CanvasGeometry,
        pacing: Pacing,
    ) -> Self {
        Self {
            canvas,
            clock,
            target,
            geometry,
            pacing,
        }
    }

    /// Run one pass for `account`. Requests are strictly sequential.
    pub async fn run_pass<R: Rng + ?Sized>(&self, account: &Account, rng: &mut R) -> PassReport {
        let order = shuffled_domain(self.target.width(), self.target.height(), rng);
        let mut report = PassReport {
            end: PassEnd::Completed,
            visited: 0,
            painted: 0,
            skipped: 0,
        };

        for (x, y) in order {
            let delay = self.pacing.delay(rng);
            self.clock.sleep(delay).await;

            report.visited += 1;
            match self.visit(account, x, y).await {
                PixelVisit::Painted => report.painted += 1,
                PixelVisit::Skipped(_) => report.skipped += 1,
                PixelVisit::SessionInvalid => {
                    warn!(account = account.name(), "session is dead");
                    warn!(token = account.token(), "replace this token to revive the account");
                    report.end = PassEnd::SessionInvalid;
                    break;
                }
                PixelVisit::EnergyExhausted => {
                    warn!(account = account.name(), "out of energy");
                    report.end = PassEnd::EnergyExhausted;
                    break;
                }
                PixelVisit::TransientError(error) => {
                    warn!(account = account.name(), %error, "failed to paint");
                    report.end = PassEnd::PaintFailed;
                    break;
                }
            }
        }
        report
    }

    async fn visit(&self, account: &Account, x: usize, y: usize) -> PixelVisit {
        let pixel = self.geometry.canvas_position(x as i64, y as i64);
        let current = match self.canvas.get_pixel(pixel, account).await {
            PixelRead::Unauthorized => return PixelVisit::SessionInvalid,
            PixelRead::Color(color) => color,
        };

        let (abs_x, abs_y) = self.geometry.absolute(x as i64, y as i64);
        let wanted = match self.target.color_at(x, y) {
            None => {
                info!(x = abs_x, y = abs_y, "skip transparent pixel");
                return PixelVisit::Skipped(SkipReason::Transparent);
            }
            Some(color) => color,
        };
        if current.eq_ignore_ascii_case(wanted) {
            info!(x = abs_x, y = abs_y, "skip, already painted");
            return PixelVisit::Skipped(SkipReason::AlreadyPainted);
        }

        match self.canvas.set_pixel(pixel, wanted, account).await {
            PaintOutcome::Painted => {
                let (px, py) = self.geometry.position_from_index(pixel);
                info!(x = px, y = py, color = wanted, "paint");
                PixelVisit::Painted
            }
            PaintOutcome::EnergyExhausted => PixelVisit::EnergyExhausted,
            PaintOutcome::Unauthorized => PixelVisit::SessionInvalid,
            PaintOutcome::Failed(error) => PixelVisit::TransientError(error),
        }
    }
}
