use std::time::Duration;

use tile_quest_core::FrameRect;
use tile_quest_system_animation::{frame_rect, Animation, AnimationError, AnimationSpec};

fn four_frames_at_50ms() -> Animation {
    Animation::new(AnimationSpec::new(2, 16, 16, 4, Duration::from_millis(50)))
        .expect("valid animation")
}

#[test]
fn frame_index_wraps_after_full_cycle() {
    let mut animation = four_frames_at_50ms();

    let mut frames = Vec::new();
    for _ in 0..4 {
        animation.advance(Duration::from_millis(51));
        frames.push(animation.current_frame());
    }

    assert_eq!(frames, vec![1, 2, 3, 0]);
}

#[test]
fn frame_holds_until_duration_is_exceeded() {
    let mut animation = four_frames_at_50ms();

    animation.advance(Duration::from_millis(25));
    animation.advance(Duration::from_millis(25));
    assert_eq!(animation.current_frame(), 0);

    animation.advance(Duration::from_millis(1));
    assert_eq!(animation.current_frame(), 1);
    assert_eq!(animation.elapsed(), Duration::ZERO);
}

#[test]
fn source_rect_uses_frame_column_and_sheet_row() {
    assert_eq!(frame_rect(3, 2, 16, 16), FrameRect::new(48, 32, 16, 16));

    let mut animation = four_frames_at_50ms();
    for _ in 0..3 {
        animation.advance(Duration::from_millis(51));
    }
    assert_eq!(animation.current_frame_rect(), FrameRect::new(48, 32, 16, 16));
}

#[test]
fn construction_rejects_invalid_descriptions() {
    let valid = AnimationSpec::new(0, 16, 16, 4, Duration::from_millis(50));

    assert_eq!(
        Animation::new(AnimationSpec {
            sheet_row: -1,
            ..valid
        }),
        Err(AnimationError::NegativeRow { row: -1 })
    );
    assert_eq!(
        Animation::new(AnimationSpec {
            frame_width: 0,
            ..valid
        }),
        Err(AnimationError::InvalidFrameSize {
            width: 0,
            height: 16
        })
    );
    assert_eq!(
        Animation::new(AnimationSpec {
            frame_count: 0,
            ..valid
        }),
        Err(AnimationError::NoFrames { frame_count: 0 })
    );
    assert_eq!(
        Animation::new(AnimationSpec {
            frame_duration: Duration::ZERO,
            ..valid
        }),
        Err(AnimationError::InvalidFrameDuration { frame_count: 4 })
    );
}
