use super::*;

fn surface() -> (SwipeGesture, AnimationRegistry, InteractionSettings) {
    (
        SwipeGesture::default(),
        AnimationRegistry::default(),
        InteractionSettings::default(),
    )
}

#[test]
fn small_or_vertical_drags_stay_idle() {
    let (mut gesture, mut animations, settings) = surface();

    gesture.drag(5.0, 0.0, &settings, &mut animations);
    assert_eq!(gesture.phase(), SwipePhase::Idle);

    gesture.drag(20.0, 40.0, &settings, &mut animations);
    assert_eq!(gesture.phase(), SwipePhase::Idle);
    assert_eq!(gesture.offset(), 0.0);

    gesture.drag(6.0, 2.0, &settings, &mut animations);
    assert_eq!(gesture.phase(), SwipePhase::Dragging);
}

#[test]
fn drag_offset_is_clamped_to_rightward_range() {
    let (mut gesture, mut animations, settings) = surface();

    gesture.drag(10.0, 0.0, &settings, &mut animations);
    gesture.drag(400.0, 0.0, &settings, &mut animations);
    assert_eq!(gesture.offset(), 130.0);

    gesture.drag(-60.0, 0.0, &settings, &mut animations);
    assert_eq!(gesture.offset(), 0.0);
    assert_eq!(gesture.phase(), SwipePhase::Dragging);
}

#[test]
fn release_below_threshold_does_not_commit() {
    let (mut gesture, mut animations, settings) = surface();
    gesture.drag(40.0, 0.0, &settings, &mut animations);

    assert_eq!(gesture.release(79.0, &settings, &mut animations), None);
    assert_eq!(gesture.phase(), SwipePhase::Settling);
}

#[test]
fn release_at_threshold_commits_once() {
    let (mut gesture, mut animations, settings) = surface();
    gesture.drag(40.0, 0.0, &settings, &mut animations);

    assert_eq!(
        gesture.release(80.0, &settings, &mut animations),
        Some(GestureIntent::CommitReply)
    );
    assert_eq!(gesture.release(80.0, &settings, &mut animations), None);
}

#[test]
fn release_without_activation_is_ignored() {
    let (mut gesture, mut animations, settings) = surface();
    assert_eq!(gesture.release(120.0, &settings, &mut animations), None);
    assert_eq!(gesture.phase(), SwipePhase::Idle);
}

#[test]
fn settles_back_to_idle() {
    let (mut gesture, mut animations, settings) = surface();
    gesture.drag(100.0, 0.0, &settings, &mut animations);
    gesture.release(100.0, &settings, &mut animations);
    assert!(!gesture.accepts_long_press());

    let mut previous = gesture.offset();
    for _ in 0..10 {
        animations.step_all(16.0);
        gesture.sync(&animations);
        assert!(gesture.offset() <= previous);
        previous = gesture.offset();
    }
    animations.step_all(2_000.0);
    gesture.sync(&animations);

    assert_eq!(gesture.phase(), SwipePhase::Idle);
    assert_eq!(gesture.offset(), 0.0);
    assert!(gesture.accepts_long_press());
}

#[test]
fn reveal_opacity_ramps_in_two_segments() {
    assert_eq!(reveal_opacity(-10.0), 0.0);
    assert_eq!(reveal_opacity(0.0), 0.0);
    assert!((reveal_opacity(15.0) - 0.3).abs() < 1e-6);
    assert!((reveal_opacity(30.0) - 0.6).abs() < 1e-6);
    assert!((reveal_opacity(55.0) - 0.8).abs() < 1e-6);
    assert_eq!(reveal_opacity(80.0), 1.0);
    assert_eq!(reveal_opacity(130.0), 1.0);
}

#[test]
fn picker_tracks_a_single_message() {
    let mut picker = ReactionPicker::default();
    picker.open(MessageId::from("m1"));
    picker.open(MessageId::from("m2"));

    assert!(picker.is_open_for(&MessageId::from("m2")));
    assert!(!picker.is_open_for(&MessageId::from("m1")));
    assert!(picker.close());
    assert!(!picker.close());
    assert_eq!(ReactionPicker::palette().len(), 5);
}

#[test]
fn settling_bubble_cannot_be_grabbed() {
    let (mut gesture, mut animations, settings) = surface();
    gesture.drag(10.0, 0.0, &settings, &mut animations);
    gesture.drag(100.0, 0.0, &settings, &mut animations);
    gesture.release(100.0, &settings, &mut animations);
    assert_eq!(gesture.phase(), SwipePhase::Settling);

    let settling_offset = gesture.offset();
    gesture.drag(40.0, 0.0, &settings, &mut animations);
    assert_eq!(gesture.phase(), SwipePhase::Settling);
    assert_eq!(gesture.offset(), settling_offset);
}

#[test]
fn unvalidated_negative_max_offset_pins_drag_to_zero() {
    let (mut gesture, mut animations, _) = surface();
    let settings = InteractionSettings {
        max_swipe_offset: -10.0,
        ..InteractionSettings::default()
    };

    gesture.drag(40.0, 0.0, &settings, &mut animations);
    assert_eq!(gesture.offset(), 0.0);
    assert_eq!(gesture.release(40.0, &settings, &mut animations), None);
}
