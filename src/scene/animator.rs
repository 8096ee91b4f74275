use tracing::trace;

use super::area::PlayArea;
use super::entity::MovingEntity;
use super::roster::{self, Placement};
use crate::config::AnimatorConfig;
use crate::error::SceneError;
use crate::synth::ToneTrigger;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Ids of spheres that hit an audible wall, in roster order.
    pub bounced: Vec<usize>,
}

/// Eight note spheres bouncing inside a box.
///
/// The animator owns no clock and no audio. The frame loop passes the
/// current wall-clock time in and a [`ToneTrigger`] to sound bounces and
/// selections through.
#[derive(Debug, Clone)]
pub struct Animator<const D: usize> {
    area: PlayArea<D>,
    config: AnimatorConfig,
    roster: Vec<MovingEntity<D>>,
}

impl<const D: usize> Animator<D> {
    pub fn new<P>(area: PlayArea<D>, config: AnimatorConfig, placement: &mut P) -> Self
    where
        P: Placement<D> + ?Sized,
    {
        let roster = roster::build(&area, placement);
        Animator {
            area,
            config,
            roster,
        }
    }

    pub fn area(&self) -> &PlayArea<D> {
        &self.area
    }

    pub fn entities(&self) -> &[MovingEntity<D>] {
        &self.roster
    }

    /// Advance every sphere by one step. A sphere that hits an audible wall
    /// sounds its note and lights up like a selected one.
    pub fn tick<T>(&mut self, now_ms: f64, trigger: &mut T) -> TickReport
    where
        T: ToneTrigger + ?Sized,
    {
        let mut report = TickReport::default();
        for entity in &mut self.roster {
            if entity.step(&self.area) {
                trace!(id = entity.id, note = entity.label, "bounce");
                trigger.trigger(entity.frequency, self.config.bounce_tone_secs);
                entity.activate(now_ms, self.config.active_window_ms);
                report.bounced.push(entity.id);
            }
            entity.expire(now_ms);
        }
        report
    }

    /// Play a sphere's note and highlight it.
    pub fn select<T>(&mut self, id: usize, now_ms: f64, trigger: &mut T) -> Result<(), SceneError>
    where
        T: ToneTrigger + ?Sized,
    {
        let len = self.roster.len();
        let entity = self
            .roster
            .get_mut(id)
            .ok_or(SceneError::UnknownEntity { id, len })?;
        trace!(id, note = entity.label, "select");
        trigger.trigger(entity.frequency, self.config.select_tone_secs);
        entity.activate(now_ms, self.config.active_window_ms);
        Ok(())
    }
}
