//! Registry of animations keyed by activity and facing.

use std::{collections::BTreeMap, time::Duration};

use tile_quest_core::{Activity, Direction};

use crate::{Animation, AnimationError, AnimationSpec};

/// Identifies one animation of a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationKey {
    /// Animation category.
    pub activity: Activity,
    /// Facing the animation depicts.
    pub direction: Direction,
}

impl AnimationKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(activity: Activity, direction: Direction) -> Self {
        Self {
            activity,
            direction,
        }
    }
}

/// Animations declared by a sprite, plus the one currently playing.
///
/// Animations are registered once while the sprite is built and are never
/// removed afterwards.
#[derive(Clone, Debug, Default)]
pub struct AnimationSet {
    animations: BTreeMap<AnimationKey, Animation>,
    current: Option<AnimationKey>,
}

impl AnimationSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `spec` and registers it under `(activity, direction)`.
    pub fn register(
        &mut self,
        activity: Activity,
        direction: Direction,
        spec: AnimationSpec,
    ) -> Result<(), AnimationError> {
        let key = AnimationKey::new(activity, direction);
        if self.animations.contains_key(&key) {
            return Err(AnimationError::Duplicate {
                activity,
                direction,
            });
        }

        let animation = Animation::new(spec)?;
        let _ = self.animations.insert(key, animation);
        Ok(())
    }

    /// Checks that every listed activity has an animation for each of the
    /// four cardinal directions.
    pub fn require_cardinals(&self, activities: &[Activity]) -> Result<(), AnimationError> {
        for &activity in activities {
            for direction in Direction::CARDINALS {
                if !self
                    .animations
                    .contains_key(&AnimationKey::new(activity, direction))
                {
                    return Err(AnimationError::Unregistered {
                        activity,
                        direction,
                    });
                }
            }
        }
        Ok(())
    }

    /// Makes `(activity, direction)` the current animation and rewinds it.
    pub fn select(&mut self, activity: Activity, direction: Direction) -> Result<(), AnimationError> {
        let key = AnimationKey::new(activity, direction);
        let animation = self
            .animations
            .get_mut(&key)
            .ok_or(AnimationError::Unregistered {
                activity,
                direction,
            })?;
        animation.reset();
        self.current = Some(key);
        Ok(())
    }

    /// Advances the current animation, if any.
    pub fn advance(&mut self, dt: Duration) {
        if let Some(animation) = self.current_mut() {
            animation.advance(dt);
        }
    }

    /// Key of the animation currently playing.
    #[must_use]
    pub fn current_key(&self) -> Option<AnimationKey> {
        self.current
    }

    /// Animation currently playing.
    #[must_use]
    pub fn current(&self) -> Option<&Animation> {
        self.current.and_then(|key| self.animations.get(&key))
    }

    /// Animation registered under `key`.
    #[must_use]
    pub fn get(&self, key: AnimationKey) -> Option<&Animation> {
        self.animations.get(&key)
    }

    /// Number of registered animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// Reports whether no animation has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    fn current_mut(&mut self) -> Option<&mut Animation> {
        let key = self.current?;
        self.animations.get_mut(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_spec(row: i32) -> AnimationSpec {
        AnimationSpec::new(row, 32, 32, 4, Duration::from_millis(100))
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut set = AnimationSet::new();
        set.register(Activity::Walk, Direction::Up, walk_spec(4))
            .expect("first registration succeeds");

        let error = set
            .register(Activity::Walk, Direction::Up, walk_spec(5))
            .expect_err("second registration must fail");

        assert_eq!(
            error,
            AnimationError::Duplicate {
                activity: Activity::Walk,
                direction: Direction::Up,
            }
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn selecting_unknown_key_fails_without_changing_current() {
        let mut set = AnimationSet::new();
        set.register(Activity::Idle, Direction::Down, walk_spec(8))
            .expect("registration succeeds");
        set.select(Activity::Idle, Direction::Down)
            .expect("registered key selects");

        let error = set
            .select(Activity::Attack, Direction::Down)
            .expect_err("attack was never registered");

        assert!(matches!(error, AnimationError::Unregistered { .. }));
        assert_eq!(
            set.current_key(),
            Some(AnimationKey::new(Activity::Idle, Direction::Down))
        );
    }

    #[test]
    fn reselecting_rewinds_the_animation() {
        let mut set = AnimationSet::new();
        set.register(Activity::Walk, Direction::Left, walk_spec(1))
            .expect("registration succeeds");
        set.select(Activity::Walk, Direction::Left)
            .expect("registered key selects");
        set.advance(Duration::from_millis(101));
        assert_eq!(set.current().map(Animation::current_frame), Some(1));

        set.select(Activity::Walk, Direction::Left)
            .expect("registered key selects");

        assert_eq!(set.current().map(Animation::current_frame), Some(0));
    }

    #[test]
    fn require_cardinals_reports_first_gap() {
        let mut set = AnimationSet::new();
        for direction in [Direction::Up, Direction::Down, Direction::Left] {
            set.register(Activity::Idle, direction, walk_spec(2))
                .expect("registration succeeds");
        }

        assert_eq!(
            set.require_cardinals(&[Activity::Idle]),
            Err(AnimationError::Unregistered {
                activity: Activity::Idle,
                direction: Direction::Right,
            })
        );
    }
}
