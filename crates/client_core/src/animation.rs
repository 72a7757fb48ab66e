//! Per-surface animated values, looked up by tag.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTag {
    SwipeOffset,
    ChipRow,
}

/// Exponential approach toward `target`: monotonic and decelerating.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedValue {
    value: f32,
    target: f32,
    time_constant_ms: f32,
    rest_epsilon: f32,
}

impl AnimatedValue {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            time_constant_ms: 1.0,
            rest_epsilon: 0.001,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn jump_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
    }

    pub fn animate_to(&mut self, target: f32, time_constant_ms: f32, rest_epsilon: f32) {
        self.target = target;
        self.time_constant_ms = time_constant_ms.max(1.0);
        self.rest_epsilon = rest_epsilon.max(f32::EPSILON);
    }

    pub fn is_at_rest(&self) -> bool {
        self.value == self.target
    }

    pub fn step(&mut self, dt_ms: f32) {
        if self.is_at_rest() || dt_ms <= 0.0 {
            return;
        }
        let remaining = (self.target - self.value) * (-dt_ms / self.time_constant_ms).exp();
        if remaining.abs() <= self.rest_epsilon {
            self.value = self.target;
        } else {
            self.value = self.target - remaining;
        }
    }
}

/// Animation handles owned by one message surface; dropped with it.
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    values: HashMap<AnimationTag, AnimatedValue>,
}

impl AnimationRegistry {
    pub fn get(&self, tag: AnimationTag) -> Option<&AnimatedValue> {
        self.values.get(&tag)
    }

    pub fn ensure(&mut self, tag: AnimationTag, initial: f32) -> &mut AnimatedValue {
        self.values
            .entry(tag)
            .or_insert_with(|| AnimatedValue::new(initial))
    }

    pub fn value_or(&self, tag: AnimationTag, fallback: f32) -> f32 {
        self.get(tag).map(AnimatedValue::value).unwrap_or(fallback)
    }

    pub fn step_all(&mut self, dt_ms: f32) {
        for value in self.values.values_mut() {
            value.step(dt_ms);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.values.values().any(|value| !value.is_at_rest())
    }
}
