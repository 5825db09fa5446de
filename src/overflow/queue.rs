//! Cooperative run queue for fitting tasks.
//!
//! Tasks run one step per tick, round-robin. A task that yields goes to the
//! back of the queue, so a long shrink loop never starves the sections queued
//! behind it, and the surface gets a fresh layout between every step.

use std::collections::VecDeque;

use crate::dom::Dom;
use crate::surface::LayoutSurface;
use crate::Result;
use log::debug;

use super::{OverflowOutcome, OverflowTask, Step};

#[derive(Debug, Default)]
pub struct ResolveQueue {
    tasks: VecDeque<(usize, OverflowTask)>,
    submitted: usize,
    ticks: usize,
}

impl ResolveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: OverflowTask) {
        self.tasks.push_back((self.submitted, task));
        self.submitted += 1;
    }

    /// Tasks not yet in a terminal state.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Run one step of the task at the front. Returns its submission index and
    /// outcome when that step finished it.
    pub fn tick(&mut self, dom: &mut Dom, surface: &mut dyn LayoutSurface) -> Result<Option<(usize, OverflowOutcome)>> {
        let Some((index, mut task)) = self.tasks.pop_front() else {
            return Ok(None);
        };
        self.ticks += 1;

        match task.step(dom, surface)? {
            Step::Yield => {
                self.tasks.push_back((index, task));
                Ok(None)
            }
            Step::Done(outcome) => Ok(Some((index, outcome))),
        }
    }

    /// Drain the queue; outcomes are returned in submission order.
    pub fn run(mut self, dom: &mut Dom, surface: &mut dyn LayoutSurface) -> Result<Vec<OverflowOutcome>> {
        let mut finished: Vec<Option<OverflowOutcome>> = vec![None; self.submitted];
        while !self.tasks.is_empty() {
            if let Some((index, outcome)) = self.tick(dom, surface)? {
                finished[index] = Some(outcome);
            }
        }
        debug!("fitted {} section(s) in {} tick(s)", self.submitted, self.ticks);
        Ok(finished.into_iter().flatten().collect())
    }
}
