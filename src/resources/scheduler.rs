//! Deferred per-companion work.
//!
//! Tasks are plain data keyed by entity and fire once when the world clock
//! passes their time. They cannot be cancelled; the system that runs them
//! re-checks the companion before acting, so a task whose situation has
//! changed does nothing.

use bevy_ecs::prelude::{Entity, Resource};

use crate::components::companion::BehaviorState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Switch an idling companion back to walking.
    ResumeWalk,
    /// End a climb or crawl pause. Stale unless still in `state` and paused.
    ResumeFromPause { state: BehaviorState },
    /// Decide what a released companion does after landing.
    ResumeAfterRelease,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTask {
    pub entity: Entity,
    pub at: f32,
    pub kind: TaskKind,
}

#[derive(Resource, Debug, Default)]
pub struct ScheduledTasks {
    tasks: Vec<ScheduledTask>,
}

impl ScheduledTasks {
    pub fn schedule(&mut self, entity: Entity, at: f32, kind: TaskKind) {
        self.tasks.push(ScheduledTask { entity, at, kind });
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn drain_due(&mut self, now: f32) -> Vec<ScheduledTask> {
        let mut due = Vec::new();
        self.tasks.retain(|task| {
            if task.at <= now {
                due.push(*task);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.at.total_cmp(&b.at));
        due
    }

    pub fn pending_for(&self, entity: Entity) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.iter().filter(move |t| t.entity == entity)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
