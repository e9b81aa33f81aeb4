//! Collision response for the ball
//!
//! Two rules drive every bounce in the game:
//! - wall reflection, checked against the arena before the ball moves
//! - contact steering, decided from the set of boxes the ball overlaps
//!
//! Both operate on a sign vector: each component of `direction` is always
//! -1 or +1. Neither rule clamps position, so a fast ball may sit slightly
//! past a wall for one tick before the flip takes effect.

use glam::IVec2;

use super::aabb::Aabb;

/// Flip direction components for any arena wall the ball is touching.
///
/// The floor is not a wall: crossing the bottom edge is a life-loss
/// condition handled by the game state.
pub fn reflect_walls(direction: &mut IVec2, ball: &Aabb, arena_width: f32) {
    if ball.left() <= 0.0 || ball.right() >= arena_width {
        direction.x = -direction.x;
    }
    if ball.top() <= 0.0 {
        direction.y = -direction.y;
    }
}

/// Steer the ball from the boxes it overlaps this tick.
///
/// Several contacts at once count as a corner hit and only flip the
/// vertical sign. A single contact steers horizontally when the ball's
/// midpoint lies strictly outside the box's horizontal span, otherwise
/// it flips vertically.
pub fn steer(direction: &mut IVec2, ball: &Aabb, contacts: &[Aabb]) {
    match contacts {
        [] => {}
        [only] => {
            let x = ball.center().x;
            if x > only.right() {
                direction.x = 1;
            } else if x < only.left() {
                direction.x = -1;
            } else {
                direction.y = -direction.y;
            }
        }
        _ => direction.y = -direction.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn ball_at(x: f32, y: f32) -> Aabb {
        Aabb::from_center(Vec2::new(x, y), Vec2::splat(20.0))
    }

    fn paddle() -> Aabb {
        Aabb::from_center(Vec2::new(305.0, 326.0), Vec2::new(80.0, 10.0))
    }

    #[test]
    fn test_reflect_left_wall() {
        let mut dir = IVec2::new(-1, -1);
        reflect_walls(&mut dir, &ball_at(10.0, 200.0), 610.0);
        assert_eq!(dir, IVec2::new(1, -1));
    }

    #[test]
    fn test_reflect_right_wall() {
        let mut dir = IVec2::new(1, 1);
        reflect_walls(&mut dir, &ball_at(600.0, 200.0), 610.0);
        assert_eq!(dir, IVec2::new(-1, 1));
    }

    #[test]
    fn test_reflect_ceiling() {
        let mut dir = IVec2::new(1, -1);
        reflect_walls(&mut dir, &ball_at(300.0, 10.0), 610.0);
        assert_eq!(dir, IVec2::new(1, 1));
    }

    #[test]
    fn test_reflect_corner_flips_both() {
        let mut dir = IVec2::new(-1, -1);
        reflect_walls(&mut dir, &ball_at(5.0, 5.0), 610.0);
        assert_eq!(dir, IVec2::new(1, 1));
    }

    #[test]
    fn test_floor_does_not_reflect() {
        let mut dir = IVec2::new(1, 1);
        reflect_walls(&mut dir, &ball_at(300.0, 395.0), 610.0);
        assert_eq!(dir, IVec2::new(1, 1));
    }

    #[test]
    fn test_steer_no_contacts() {
        let mut dir = IVec2::new(1, -1);
        steer(&mut dir, &ball_at(300.0, 200.0), &[]);
        assert_eq!(dir, IVec2::new(1, -1));
    }

    #[test]
    fn test_steer_single_contact_above() {
        let mut dir = IVec2::new(-1, 1);
        steer(&mut dir, &ball_at(300.0, 316.0), &[paddle()]);
        assert_eq!(dir, IVec2::new(-1, -1));
    }

    #[test]
    fn test_steer_single_contact_right_of_box() {
        let mut dir = IVec2::new(-1, 1);
        // Midpoint 350 is past the paddle's right edge at 345
        steer(&mut dir, &ball_at(350.0, 320.0), &[paddle()]);
        assert_eq!(dir, IVec2::new(1, 1));
    }

    #[test]
    fn test_steer_single_contact_left_of_box() {
        let mut dir = IVec2::new(1, 1);
        steer(&mut dir, &ball_at(260.0, 320.0), &[paddle()]);
        assert_eq!(dir, IVec2::new(-1, 1));
    }

    #[test]
    fn test_steer_midpoint_on_edge_flips_vertical() {
        let mut dir = IVec2::new(-1, 1);
        steer(&mut dir, &ball_at(345.0, 320.0), &[paddle()]);
        assert_eq!(dir, IVec2::new(-1, -1));
    }

    #[test]
    fn test_steer_multiple_contacts_only_vertical() {
        let a = Aabb::from_center(Vec2::new(42.5, 50.0), Vec2::new(75.0, 20.0));
        let b = Aabb::from_center(Vec2::new(117.5, 50.0), Vec2::new(75.0, 20.0));
        let mut dir = IVec2::new(1, -1);
        steer(&mut dir, &ball_at(80.0, 65.0), &[a, b]);
        assert_eq!(dir, IVec2::new(1, 1));
    }

    fn sign() -> impl Strategy<Value = i32> {
        prop_oneof![Just(-1), Just(1)]
    }

    proptest! {
        #[test]
        fn prop_side_walls_flip_horizontal_once(
            x in -20.0f32..10.0,
            y in 50.0f32..300.0,
            sx in sign(),
            sy in sign(),
        ) {
            let mut dir = IVec2::new(sx, sy);
            reflect_walls(&mut dir, &ball_at(x, y), 610.0);
            prop_assert_eq!(dir.x, -sx);
            prop_assert_eq!(dir.y, sy);
        }

        #[test]
        fn prop_multi_contact_keeps_horizontal(
            x in 0.0f32..610.0,
            y in 0.0f32..400.0,
            n in 2usize..6,
            sx in sign(),
            sy in sign(),
        ) {
            let contacts = vec![paddle(); n];
            let mut dir = IVec2::new(sx, sy);
            steer(&mut dir, &ball_at(x, y), &contacts);
            prop_assert_eq!(dir.x, sx);
            prop_assert_eq!(dir.y, -sy);
        }

        #[test]
        fn prop_contact_right_of_box_forces_positive(
            x in 345.1f32..600.0,
            sx in sign(),
            sy in sign(),
        ) {
            let mut dir = IVec2::new(sx, sy);
            steer(&mut dir, &ball_at(x, 320.0), &[paddle()]);
            prop_assert_eq!(dir.x, 1);
            prop_assert_eq!(dir.y, sy);
        }

        #[test]
        fn prop_direction_stays_unit_signs(
            x in -20.0f32..630.0,
            y in -20.0f32..420.0,
            sx in sign(),
            sy in sign(),
            touching in any::<bool>(),
        ) {
            let mut dir = IVec2::new(sx, sy);
            let ball = ball_at(x, y);
            reflect_walls(&mut dir, &ball, 610.0);
            let contacts = if touching { vec![paddle()] } else { Vec::new() };
            steer(&mut dir, &ball, &contacts);
            prop_assert!(dir.x == 1 || dir.x == -1);
            prop_assert!(dir.y == 1 || dir.y == -1);
        }
    }
}
