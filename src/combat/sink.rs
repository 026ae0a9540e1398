//! Render/animation collaborator interface and deferred, cancellable tasks.

use super::types::Animation;
use crate::core::stats::{EntityId, Position};

/// Receives visual updates from the combat engine. Calls are fire-and-forget;
/// the engine never waits on or queries the sink.
pub trait CombatSink {
    fn play_animation(&mut self, entity: EntityId, animation: Animation);
    fn update_position(&mut self, entity: EntityId, position: Position);
    fn update_health(&mut self, entity: EntityId, current: u32, max: u32);
}

impl<S: CombatSink + ?Sized> CombatSink for Box<S> {
    fn play_animation(&mut self, entity: EntityId, animation: Animation) {
        (**self).play_animation(entity, animation);
    }

    fn update_position(&mut self, entity: EntityId, position: Position) {
        (**self).update_position(entity, position);
    }

    fn update_health(&mut self, entity: EntityId, current: u32, max: u32) {
        (**self).update_health(entity, current, max);
    }
}

/// Discards everything. Used for headless simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CombatSink for NullSink {
    fn play_animation(&mut self, _entity: EntityId, _animation: Animation) {}
    fn update_position(&mut self, _entity: EntityId, _position: Position) {}
    fn update_health(&mut self, _entity: EntityId, _current: u32, _max: u32) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Animation(EntityId, Animation),
    Position(EntityId, Position),
    Health(EntityId, u32, u32),
}

/// Keeps every call in order, for tests and replay logs.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animations_for(&self, entity: EntityId) -> Vec<Animation> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Animation(id, animation) if *id == entity => Some(*animation),
                _ => None,
            })
            .collect()
    }
}

impl CombatSink for RecordingSink {
    fn play_animation(&mut self, entity: EntityId, animation: Animation) {
        self.calls.push(SinkCall::Animation(entity, animation));
    }

    fn update_position(&mut self, entity: EntityId, position: Position) {
        self.calls.push(SinkCall::Position(entity, position));
    }

    fn update_health(&mut self, entity: EntityId, current: u32, max: u32) {
        self.calls.push(SinkCall::Health(entity, current, max));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    ReturnToIdle,
}

#[derive(Debug, Clone)]
struct PendingTask {
    due_at: u64,
    entity: EntityId,
    task: ScheduledTask,
}

/// Deferred state changes keyed by entity. Cancelled when the entity leaves
/// the roster so stale callbacks never fire.
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler {
    pending: Vec<PendingTask>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task`, replacing any pending task of the same kind for `entity`.
    pub fn schedule(&mut self, entity: EntityId, due_at: u64, task: ScheduledTask) {
        self.pending
            .retain(|p| !(p.entity == entity && p.task == task));
        self.pending.push(PendingTask {
            due_at,
            entity,
            task,
        });
    }

    /// Drops every pending task for `entity`. Returns how many were cancelled.
    pub fn cancel_entity(&mut self, entity: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.entity != entity);
        before - self.pending.len()
    }

    /// Removes and returns tasks due at or before `now`, oldest deadline first.
    pub fn take_due(&mut self, now: u64) -> Vec<(EntityId, ScheduledTask)> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_at <= now);
        self.pending = pending;
        due.sort_by_key(|p| p.due_at);
        due.into_iter().map(|p| (p.entity, p.task)).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces_same_task() {
        let mut scheduler = TaskScheduler::new();
        scheduler.schedule(EntityId(1), 100, ScheduledTask::ReturnToIdle);
        scheduler.schedule(EntityId(1), 300, ScheduledTask::ReturnToIdle);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.take_due(200).is_empty());
        assert_eq!(
            scheduler.take_due(300),
            vec![(EntityId(1), ScheduledTask::ReturnToIdle)]
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel_entity() {
        let mut scheduler = TaskScheduler::new();
        scheduler.schedule(EntityId(1), 100, ScheduledTask::ReturnToIdle);
        scheduler.schedule(EntityId(2), 100, ScheduledTask::ReturnToIdle);
        assert_eq!(scheduler.cancel_entity(EntityId(1)), 1);
        assert_eq!(
            scheduler.take_due(100),
            vec![(EntityId(2), ScheduledTask::ReturnToIdle)]
        );
    }

    #[test]
    fn test_take_due_orders_by_deadline() {
        let mut scheduler = TaskScheduler::new();
        scheduler.schedule(EntityId(1), 50, ScheduledTask::ReturnToIdle);
        scheduler.schedule(EntityId(2), 10, ScheduledTask::ReturnToIdle);
        let due = scheduler.take_due(60);
        assert_eq!(due[0].0, EntityId(2));
        assert_eq!(due[1].0, EntityId(1));
    }

    #[test]
    fn test_recording_sink_filters_by_entity() {
        let mut sink = RecordingSink::new();
        sink.play_animation(EntityId(1), Animation::Attack);
        sink.play_animation(EntityId(2), Animation::Hit);
        sink.update_health(EntityId(2), 10, 50);
        sink.play_animation(EntityId(1), Animation::Idle);
        assert_eq!(
            sink.animations_for(EntityId(1)),
            vec![Animation::Attack, Animation::Idle]
        );
    }
}
