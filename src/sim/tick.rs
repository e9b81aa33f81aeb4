//! Fixed-delay simulation tick
//!
//! [`GameState::advance`] is the single entry point the scheduler calls.
//! It never reschedules itself; the returned [`Next`] tells the caller
//! when (and whether) to call again.

use glam::Vec2;

use super::aabb::Aabb;
use super::entity::{Body, EntityId, EntityKind};
use super::random::RandomSource;
use super::state::{
    Ball, BrickHit, Effect, GameEvent, GamePhase, GameState, Key, Next, PowerUp, SPARK_PALETTE,
    Spark,
};
use crate::consts::*;

impl<R: RandomSource> GameState<R> {
    /// Apply one key press. Returns a schedule request when the press
    /// starts play.
    pub fn handle_input(&mut self, key: Key) -> Option<Next> {
        match key {
            Key::Left => {
                self.move_paddle(-self.settings.paddle_step);
                None
            }
            Key::Right => {
                self.move_paddle(self.settings.paddle_step);
                None
            }
            Key::Start => self.start_game(),
        }
    }

    /// Release the held ball and begin ticking. Only valid while idle.
    pub fn start_game(&mut self) -> Option<Next> {
        if self.phase != GamePhase::Idle {
            return None;
        }
        self.push_event(GameEvent::KeyUnbound(Key::Start));
        self.clear_message();
        if let Some(paddle) = self.paddle_mut() {
            paddle.release();
        }
        self.set_phase(GamePhase::Playing);
        Some(Next::Tick { delay_ms: 0 })
    }

    /// Run whatever the current phase has pending
    pub fn advance(&mut self) -> Next {
        match self.phase {
            GamePhase::Playing => self.tick(),
            GamePhase::LifeLost => {
                self.enter_idle();
                Next::AwaitStart
            }
            GamePhase::Idle => Next::AwaitStart,
            GamePhase::Won | GamePhase::GameOver => Next::Halt,
        }
    }

    fn tick(&mut self) -> Next {
        self.time_ticks += 1;

        let ball_id = self.ball_id();
        self.collide_ball(ball_id);
        for id in self.extra_balls().to_vec() {
            self.collide_ball(id);
        }

        if self.bricks_remaining() == 0 {
            return self.win();
        }

        let height = self.settings.arena_height;
        if self
            .ball_bounds()
            .is_none_or(|bounds| bounds.bottom() >= height)
        {
            return self.lose_life();
        }

        self.step_ball(ball_id);
        self.step_extra_balls();

        Next::Tick {
            delay_ms: self.settings.tick_interval_ms,
        }
    }

    /// Overlap-query one ball, steer it, then apply per-contact effects
    fn collide_ball(&mut self, ball_id: EntityId) {
        let Some(bounds) = self.registry().bounds(ball_id) else {
            return;
        };

        // Balls pass through each other
        let hits: Vec<EntityId> = self
            .registry()
            .query_overlap(&bounds)
            .into_iter()
            .filter(|id| {
                self.registry()
                    .get(*id)
                    .is_some_and(|e| e.kind() != EntityKind::Ball)
            })
            .collect();
        let contacts: Vec<Aabb> = hits
            .iter()
            .filter_map(|id| self.registry().bounds(*id))
            .collect();

        if let Some(ball) = self.ball_mut(ball_id) {
            ball.collide(&bounds, &contacts);
        }

        for id in hits {
            let Some(kind) = self.registry().get(id).map(|e| e.kind()) else {
                continue;
            };
            match kind {
                EntityKind::Brick => {
                    self.hit_brick(id);
                }
                EntityKind::PowerUp => {
                    self.activate_power_up(id, ball_id);
                }
                EntityKind::Paddle | EntityKind::Ball => {}
            }
        }
    }

    /// Damage a brick; destroys it (scoring, explosion, possible drop)
    /// when its last hit is used up
    pub fn hit_brick(&mut self, id: EntityId) -> Option<BrickHit> {
        let (outcome, fill, center) = {
            let entity = self.registry_mut().get_mut(id)?;
            let center = entity.bounds.center();
            let Body::Brick(brick) = &mut entity.body else {
                return None;
            };
            let outcome = brick.hit();
            (outcome, brick.color(), center)
        };

        match outcome {
            BrickHit::Damaged { remaining } => {
                log::trace!("Brick {id} damaged, {remaining} hits left");
                self.restyle_entity(id, fill);
            }
            BrickHit::Destroyed { score } => {
                self.score += score;
                log::debug!("Brick {id} destroyed (+{score}, total {})", self.score);
                self.update_hud();

                let sparks = self.roll_sparks();
                self.push_event(GameEvent::Explosion {
                    position: center,
                    sparks,
                });
                self.delete_entity(id);

                let chance = self.settings.power_up_chance;
                if self.rng_mut().chance(chance) {
                    let power_up = PowerUp::random(self.rng_mut());
                    log::debug!("Brick {id} dropped {:?}", power_up.effect);
                    self.spawn_power_up(center, power_up);
                }
            }
        }
        Some(outcome)
    }

    /// Consume a power-up on behalf of `ball_id`
    pub fn activate_power_up(&mut self, id: EntityId, ball_id: EntityId) -> Option<Effect> {
        let effect = match self.registry().get(id).map(|e| &e.body) {
            Some(Body::PowerUp(power_up)) => power_up.effect,
            _ => return None,
        };
        self.delete_entity(id);
        log::debug!("Power-up {id} activated: {effect:?}");

        match effect {
            Effect::Expand => self.expand_paddle(),
            Effect::ExtraBall => self.spawn_extra_ball(ball_id),
        }
        Some(effect)
    }

    /// Snap the paddle to the fixed expanded width around its centre,
    /// shifted inward if it would poke past a wall
    fn expand_paddle(&mut self) {
        let Some(current) = self.paddle_bounds() else {
            return;
        };
        let arena_width = self.settings.arena_width;
        let width = self.settings.expanded_paddle_width.min(arena_width);
        let mut expanded = Aabb::from_center(current.center(), Vec2::new(width, current.size().y));

        if expanded.left() < 0.0 {
            expanded = expanded.translated(Vec2::new(-expanded.left(), 0.0));
        } else if expanded.right() > arena_width {
            expanded = expanded.translated(Vec2::new(arena_width - expanded.right(), 0.0));
        }

        if expanded != current {
            let paddle_id = self.paddle_id();
            self.resize_entity(paddle_id, expanded);
        }
    }

    fn spawn_extra_ball(&mut self, ball_id: EntityId) {
        let Some(origin) = self.registry().bounds(ball_id) else {
            return;
        };
        let center = origin.min + Vec2::splat(EXTRA_BALL_OFFSET);
        let ball = Ball::new(self.settings.ball_speed);
        let id = self.spawn(Ball::bounds_at(center), Body::Ball(ball));
        self.extra_balls_mut().push(id);
        self.step_ball(id);
    }

    /// Wall-bounce a ball and move it one tick
    fn step_ball(&mut self, id: EntityId) {
        let arena_width = self.settings.arena_width;
        let Some(bounds) = self.registry().bounds(id) else {
            return;
        };
        let Some(ball) = self.ball_mut(id) else {
            return;
        };
        let delta = ball.update(&bounds, arena_width);
        if delta != Vec2::ZERO {
            self.move_entity(id, delta);
        }
    }

    /// Extra balls never cost a life; one past the floor just disappears
    fn step_extra_balls(&mut self) {
        let height = self.settings.arena_height;
        let balls = std::mem::take(self.extra_balls_mut());
        let mut kept = Vec::with_capacity(balls.len());
        for id in balls {
            match self.registry().bounds(id) {
                Some(bounds) if bounds.bottom() < height => {
                    self.step_ball(id);
                    kept.push(id);
                }
                Some(_) => {
                    log::debug!("Extra ball {id} left the arena");
                    self.delete_entity(id);
                }
                None => {}
            }
        }
        *self.extra_balls_mut() = kept;
    }

    fn stop_balls(&mut self) {
        let mut ids = self.extra_balls().to_vec();
        ids.push(self.ball_id());
        for id in ids {
            if let Some(ball) = self.ball_mut(id) {
                ball.stop();
            }
        }
    }

    fn win(&mut self) -> Next {
        self.stop_balls();
        self.set_phase(GamePhase::Won);
        log::info!("All bricks cleared, final score {}", self.score);
        let text = format!("Congratulations! You Won!\nFinal Score: {}", self.score);
        self.show_message(text);
        Next::Halt
    }

    fn lose_life(&mut self) -> Next {
        self.stop_balls();
        self.lives -= 1;
        log::info!("Ball lost, {} lives left", self.lives);

        if self.lives < 0 {
            self.set_phase(GamePhase::GameOver);
            let text = format!("Game Over! Try Again!\nFinal Score: {}", self.score);
            self.show_message(text);
            Next::Halt
        } else {
            self.set_phase(GamePhase::LifeLost);
            Next::Reset {
                delay_ms: self.settings.reset_delay_ms,
            }
        }
    }

    fn roll_sparks(&mut self) -> Vec<Spark> {
        let rng = self.rng_mut();
        (0..SPARK_COUNT)
            .map(|_| {
                let angle = rng.range(0.0, std::f32::consts::TAU);
                let distance = rng.range(SPARK_MIN_DISTANCE, SPARK_MAX_DISTANCE);
                let color = SPARK_PALETTE[rng.index(SPARK_PALETTE.len())];
                Spark {
                    offset: Vec2::from_angle(angle) * distance,
                    color,
                }
            })
            .collect()
    }
}

/// Brick centres and starting hits for an arena of the given width.
///
/// Columns start at the left margin and repeat every brick width while a
/// full brick still fits inside the right margin; each column stacks the
/// rows in [`BRICK_ROWS`].
pub fn brick_layout(arena_width: f32) -> Vec<(Vec2, u8)> {
    let mut layout = Vec::new();
    let mut x = BRICK_MARGIN;
    while x < arena_width - BRICK_MARGIN {
        let center_x = x + BRICK_WIDTH / 2.0;
        for &(y, hits) in &BRICK_ROWS {
            layout.push((Vec2::new(center_x, y), hits));
        }
        x += BRICK_WIDTH;
    }
    layout
}

/// Populate the registry with the default brick grid
pub fn generate_bricks<R: RandomSource>(state: &mut GameState<R>) {
    let layout = brick_layout(state.settings.arena_width);
    for (center, hits) in layout {
        state.spawn_brick(center, hits);
    }
}
