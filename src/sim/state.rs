//! Game state and core simulation types
//!
//! Entity bodies, the events the simulation emits for its frontend, and the
//! [`GameState`] that owns the live registry. The tick procedure and input
//! handling live in `tick.rs`.

use glam::{IVec2, Vec2};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::collision;
use super::entity::{Body, Entity, EntityId, EntityKind, Registry};
use super::random::{self, RandomSource};
use crate::consts::*;
use crate::settings::{Settings, SettingsError};

/// Fill colour as 0xRRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BALL: Color = Color(0x6A5ACD);
    pub const PADDLE: Color = Color(0x4169E1);
    pub const POWER_UP: Color = Color(0x32CD32);
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Explosion spark colours
pub const SPARK_PALETTE: [Color; 4] = [
    Color(0xFF6347),
    Color(0xFFD700),
    Color(0xFF4500),
    Color(0xFF8C00),
];

/// Primitive a frontend draws for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Oval,
    Rectangle,
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball glued to the paddle, waiting for the start key
    Idle,
    /// Fixed-tick loop running
    Playing,
    /// Ball dropped; waiting out the reset delay before the next serve
    LifeLost,
    /// Every brick destroyed
    Won,
    /// Lives exhausted
    GameOver,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::GameOver)
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Sign vector, each component is -1 or +1
    pub direction: IVec2,
    /// Distance per tick along each axis; `None` once stopped
    pub speed: Option<f32>,
}

impl Ball {
    pub fn new(speed: f32) -> Self {
        Self {
            direction: IVec2::new(1, -1),
            speed: Some(speed),
        }
    }

    pub fn bounds_at(center: Vec2) -> Aabb {
        Aabb::from_center(center, Vec2::splat(BALL_RADIUS * 2.0))
    }

    pub fn stop(&mut self) {
        self.speed = None;
    }

    pub fn is_stopped(&self) -> bool {
        self.speed.is_none()
    }

    /// Displacement for one tick
    pub fn velocity(&self) -> Vec2 {
        self.speed
            .map_or(Vec2::ZERO, |speed| self.direction.as_vec2() * speed)
    }

    /// Bounce off any touched wall, then return this tick's displacement
    pub fn update(&mut self, bounds: &Aabb, arena_width: f32) -> Vec2 {
        collision::reflect_walls(&mut self.direction, bounds, arena_width);
        self.velocity()
    }

    /// Steer from the boxes overlapping the ball this tick
    pub fn collide(&mut self, bounds: &Aabb, contacts: &[Aabb]) {
        collision::steer(&mut self.direction, bounds, contacts);
    }
}

/// The player's paddle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Ball glued to the paddle before a serve
    pub held: Option<EntityId>,
}

impl Paddle {
    pub fn bounds_at(center_x: f32) -> Aabb {
        Aabb::from_center(
            Vec2::new(center_x, PADDLE_Y),
            Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
        )
    }

    pub fn set_ball(&mut self, ball: EntityId) {
        self.held = Some(ball);
    }

    pub fn release(&mut self) -> Option<EntityId> {
        self.held.take()
    }

    /// Displacement for a horizontal offset, or `None` if either edge would
    /// leave [0, arena_width]
    pub fn offset_within(bounds: &Aabb, offset: f32, arena_width: f32) -> Option<Vec2> {
        let delta = Vec2::new(offset, 0.0);
        bounds
            .translated(delta)
            .within_width(arena_width)
            .then_some(delta)
    }
}

/// Outcome of one hit on a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickHit {
    Damaged { remaining: u8 },
    Destroyed { score: u32 },
}

/// A brick entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Hits remaining (1-3)
    pub hits: u8,
    /// Points credited on destruction, fixed by the starting tier
    pub score: u32,
}

impl Brick {
    pub fn new(hits: u8) -> Self {
        let hits = hits.clamp(1, 3);
        Self {
            hits,
            score: Self::score_for(hits),
        }
    }

    pub fn bounds_at(center: Vec2) -> Aabb {
        Aabb::from_center(center, Vec2::new(BRICK_WIDTH, BRICK_HEIGHT))
    }

    pub fn score_for(tier: u8) -> u32 {
        match tier {
            1 => 10,
            2 => 20,
            _ => 30,
        }
    }

    pub fn color_for(tier: u8) -> Color {
        match tier {
            1 => Color(0x9370DB),
            2 => Color(0x7B68EE),
            _ => Color(0x6A5ACD),
        }
    }

    pub fn color(&self) -> Color {
        Self::color_for(self.hits)
    }

    pub fn hit(&mut self) -> BrickHit {
        self.hits = self.hits.saturating_sub(1);
        if self.hits == 0 {
            BrickHit::Destroyed { score: self.score }
        } else {
            BrickHit::Damaged {
                remaining: self.hits,
            }
        }
    }
}

/// Power-up effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Paddle snaps to a fixed wider rectangle
    Expand,
    /// A second ball spawns next to the activating one
    ExtraBall,
}

impl Effect {
    pub const ALL: [Effect; 2] = [Effect::Expand, Effect::ExtraBall];
}

/// A power-up entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub effect: Effect,
}

impl PowerUp {
    pub fn new(effect: Effect) -> Self {
        Self { effect }
    }

    /// Power-up with a uniformly chosen effect
    pub fn random(rng: &mut impl RandomSource) -> Self {
        Self::new(Effect::ALL[rng.index(Effect::ALL.len())])
    }

    pub fn bounds_at(center: Vec2) -> Aabb {
        Aabb::from_center(center, Vec2::splat(POWER_UP_SIZE))
    }
}

impl Body {
    pub fn shape(&self) -> Shape {
        match self {
            Body::Ball(_) | Body::PowerUp(_) => Shape::Oval,
            Body::Paddle(_) | Body::Brick(_) => Shape::Rectangle,
        }
    }

    pub fn fill(&self) -> Color {
        match self {
            Body::Paddle(_) => Color::PADDLE,
            Body::Ball(_) => Color::BALL,
            Body::Brick(brick) => brick.color(),
            Body::PowerUp(_) => Color::POWER_UP,
        }
    }
}

/// One particle of a brick explosion, relative to the brick centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spark {
    pub offset: Vec2,
    pub color: Color,
}

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Start,
}

/// Side effects for the frontend, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ShapeCreated {
        id: EntityId,
        shape: Shape,
        bounds: Aabb,
        fill: Color,
    },
    ShapeMoved {
        id: EntityId,
        delta: Vec2,
    },
    ShapeResized {
        id: EntityId,
        bounds: Aabb,
    },
    ShapeRestyled {
        id: EntityId,
        fill: Color,
    },
    ShapeDeleted {
        id: EntityId,
    },
    KeyBound(Key),
    KeyUnbound(Key),
    HudChanged {
        lives: String,
        score: String,
    },
    MessageShown(String),
    MessageCleared,
    Explosion {
        position: Vec2,
        sparks: Vec<Spark>,
    },
}

/// What the external scheduler should do after an `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Run the next tick after `delay_ms`
    Tick { delay_ms: u64 },
    /// Serve a new ball after `delay_ms`
    Reset { delay_ms: u64 },
    /// Nothing scheduled until the start key is pressed
    AwaitStart,
    /// Terminal phase, nothing more to schedule
    Halt,
}

/// Snapshot of the scoreboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub phase: GamePhase,
    pub lives: i32,
    pub score: u32,
    pub bricks_remaining: usize,
    pub ticks: u64,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<R: RandomSource = Pcg32> {
    pub settings: Settings,
    pub phase: GamePhase,
    /// Goes to -1 on the final loss
    pub lives: i32,
    pub score: u32,
    /// Ticks run while playing
    pub time_ticks: u64,
    registry: Registry,
    paddle_id: EntityId,
    /// Ball whose loss costs a life
    ball_id: EntityId,
    extra_balls: Vec<EntityId>,
    rng: R,
    events: Vec<GameEvent>,
}

impl GameState<Pcg32> {
    /// New game with default settings and the given seed
    pub fn new(seed: u64) -> Self {
        let settings = Settings {
            seed,
            ..Settings::default()
        };
        let rng = random::seeded(seed);
        Self::build(settings, rng)
    }

    pub fn with_settings(settings: Settings) -> Result<Self, SettingsError> {
        let rng = random::seeded(settings.seed);
        Self::with_rng(settings, rng)
    }
}

impl<R: RandomSource> GameState<R> {
    /// New game drawing randomness from `rng`
    pub fn with_rng(settings: Settings, rng: R) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(settings, rng))
    }

    /// Settings must already be valid
    fn build(settings: Settings, rng: R) -> Self {
        let lives = settings.lives;
        let mut state = Self {
            settings,
            phase: GamePhase::Idle,
            lives,
            score: 0,
            time_ticks: 0,
            registry: Registry::new(),
            // Placeholders until the paddle and first ball exist; id 0 is never allocated
            paddle_id: EntityId(0),
            ball_id: EntityId(0),
            extra_balls: Vec::new(),
            rng,
            events: Vec::new(),
        };

        let paddle_x = state.settings.arena_width / 2.0;
        state.paddle_id = state.spawn(
            Paddle::bounds_at(paddle_x),
            Body::Paddle(Paddle::default()),
        );
        super::tick::generate_bricks(&mut state);
        state.enter_idle();

        log::info!(
            "New game: {} bricks, {} lives, seed {}",
            state.bricks_remaining(),
            state.lives,
            state.settings.seed
        );
        state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn paddle_id(&self) -> EntityId {
        self.paddle_id
    }

    pub fn ball_id(&self) -> EntityId {
        self.ball_id
    }

    pub fn extra_balls(&self) -> &[EntityId] {
        &self.extra_balls
    }

    pub fn paddle_bounds(&self) -> Option<Aabb> {
        self.registry.bounds(self.paddle_id)
    }

    pub fn ball_bounds(&self) -> Option<Aabb> {
        self.registry.bounds(self.ball_id)
    }

    pub fn paddle(&self) -> Option<&Paddle> {
        match self.registry.get(self.paddle_id).map(|e| &e.body) {
            Some(Body::Paddle(paddle)) => Some(paddle),
            _ => None,
        }
    }

    pub fn ball(&self, id: EntityId) -> Option<&Ball> {
        match self.registry.get(id).map(|e| &e.body) {
            Some(Body::Ball(ball)) => Some(ball),
            _ => None,
        }
    }

    pub fn bricks_remaining(&self) -> usize {
        self.registry.count(EntityKind::Brick)
    }

    pub fn report(&self) -> Report {
        Report {
            phase: self.phase,
            lives: self.lives,
            score: self.score,
            bricks_remaining: self.bricks_remaining(),
            ticks: self.time_ticks,
        }
    }

    /// Events recorded since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move the paddle horizontally, dragging a held ball along.
    ///
    /// Returns false (and changes nothing) if the paddle would leave the arena.
    pub fn move_paddle(&mut self, offset: f32) -> bool {
        let Some(entity) = self.registry.get(self.paddle_id) else {
            return false;
        };
        let Some(delta) = Paddle::offset_within(&entity.bounds, offset, self.settings.arena_width)
        else {
            log::trace!("Paddle move by {offset} blocked at arena edge");
            return false;
        };
        let held = match &entity.body {
            Body::Paddle(paddle) => paddle.held,
            _ => None,
        };

        self.move_entity(self.paddle_id, delta);
        if let Some(ball) = held {
            self.move_entity(ball, delta);
        }
        true
    }

    /// Register an entity and announce its shape
    pub fn spawn(&mut self, bounds: Aabb, body: Body) -> EntityId {
        let shape = body.shape();
        let fill = body.fill();
        let id = self.registry.insert(bounds, body);
        self.events.push(GameEvent::ShapeCreated {
            id,
            shape,
            bounds,
            fill,
        });
        id
    }

    pub fn spawn_brick(&mut self, center: Vec2, hits: u8) -> EntityId {
        self.spawn(Brick::bounds_at(center), Body::Brick(Brick::new(hits)))
    }

    pub fn spawn_power_up(&mut self, center: Vec2, power_up: PowerUp) -> EntityId {
        self.spawn(PowerUp::bounds_at(center), Body::PowerUp(power_up))
    }

    /// Remove every brick without scoring (harness setup)
    pub fn clear_bricks(&mut self) {
        for id in self.registry.ids_of(EntityKind::Brick) {
            self.delete_entity(id);
        }
    }

    /// Teleport the primary ball so its centre sits at `center`
    pub fn place_ball(&mut self, center: Vec2) {
        if let Some(bounds) = self.ball_bounds() {
            self.move_entity(self.ball_id, center - bounds.center());
        }
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub(crate) fn move_entity(&mut self, id: EntityId, delta: Vec2) -> bool {
        let moved = self.registry.translate(id, delta);
        if moved {
            self.events.push(GameEvent::ShapeMoved { id, delta });
        }
        moved
    }

    pub(crate) fn delete_entity(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.registry.remove(id);
        if removed.is_some() {
            self.events.push(GameEvent::ShapeDeleted { id });
        }
        removed
    }

    pub(crate) fn resize_entity(&mut self, id: EntityId, bounds: Aabb) {
        if let Some(entity) = self.registry.get_mut(id) {
            entity.bounds = bounds;
            self.events.push(GameEvent::ShapeResized { id, bounds });
        }
    }

    pub(crate) fn restyle_entity(&mut self, id: EntityId, fill: Color) {
        if self.registry.contains(id) {
            self.events.push(GameEvent::ShapeRestyled { id, fill });
        }
    }

    pub(crate) fn ball_mut(&mut self, id: EntityId) -> Option<&mut Ball> {
        match self.registry.get_mut(id).map(|e| &mut e.body) {
            Some(Body::Ball(ball)) => Some(ball),
            _ => None,
        }
    }

    pub(crate) fn paddle_mut(&mut self) -> Option<&mut Paddle> {
        match self.registry.get_mut(self.paddle_id).map(|e| &mut e.body) {
            Some(Body::Paddle(paddle)) => Some(paddle),
            _ => None,
        }
    }

    pub(crate) fn extra_balls_mut(&mut self) -> &mut Vec<EntityId> {
        &mut self.extra_balls
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub(crate) fn update_hud(&mut self) {
        self.events.push(GameEvent::HudChanged {
            lives: format!("Lives: {}", self.lives),
            score: format!("Score: {}", self.score),
        });
    }

    pub(crate) fn show_message(&mut self, text: impl Into<String>) {
        self.events.push(GameEvent::MessageShown(text.into()));
    }

    pub(crate) fn clear_message(&mut self) {
        self.events.push(GameEvent::MessageCleared);
    }

    /// Serve: replace the ball(s) with a fresh one glued to the paddle
    pub(crate) fn enter_idle(&mut self) {
        self.delete_entity(self.ball_id);
        for id in std::mem::take(&mut self.extra_balls) {
            self.delete_entity(id);
        }

        let paddle_x = self
            .paddle_bounds()
            .map_or(self.settings.arena_width / 2.0, |b| b.center().x);
        let ball = Ball::new(self.settings.ball_speed);
        self.ball_id = self.spawn(
            Ball::bounds_at(Vec2::new(paddle_x, BALL_SERVE_Y)),
            Body::Ball(ball),
        );
        let ball_id = self.ball_id;
        if let Some(paddle) = self.paddle_mut() {
            paddle.set_ball(ball_id);
        }

        self.set_phase(GamePhase::Idle);
        self.update_hud();
        self.show_message("Press Space to Start");
        self.events.push(GameEvent::KeyBound(Key::Start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_layout() {
        let state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.bricks_remaining(), 24);

        let paddle = state.paddle_bounds().expect("paddle");
        assert_eq!(paddle.center(), Vec2::new(305.0, 326.0));
        assert_eq!(paddle.size(), Vec2::new(80.0, 10.0));

        let ball = state.ball_bounds().expect("ball");
        assert_eq!(ball.center(), Vec2::new(305.0, 310.0));
        assert_eq!(
            state.paddle().and_then(|p| p.held),
            Some(state.ball_id())
        );
    }

    #[test]
    fn test_new_game_announces_serve() {
        let state = GameState::new(1);
        let events = state.events();
        assert!(events.contains(&GameEvent::KeyBound(Key::Start)));
        assert!(events.contains(&GameEvent::MessageShown("Press Space to Start".into())));
        assert!(events.contains(&GameEvent::HudChanged {
            lives: "Lives: 3".into(),
            score: "Score: 0".into(),
        }));
    }

    #[test]
    fn test_brick_durability() {
        let mut brick = Brick::new(3);
        assert_eq!(brick.color(), Color(0x6A5ACD));
        assert_eq!(brick.hit(), BrickHit::Damaged { remaining: 2 });
        assert_eq!(brick.color(), Color(0x7B68EE));
        assert_eq!(brick.hit(), BrickHit::Damaged { remaining: 1 });
        assert_eq!(brick.color(), Color(0x9370DB));
        assert_eq!(brick.hit(), BrickHit::Destroyed { score: 30 });
        assert_eq!(brick.hits, 0);
    }

    #[test]
    fn test_brick_scores_by_tier() {
        assert_eq!(Brick::new(1).score, 10);
        assert_eq!(Brick::new(2).score, 20);
        assert_eq!(Brick::new(3).score, 30);
    }

    #[test]
    fn test_ball_update_moves_by_speed() {
        let mut ball = Ball::new(5.0);
        let bounds = Ball::bounds_at(Vec2::new(305.0, 310.0));
        assert_eq!(ball.update(&bounds, 610.0), Vec2::new(5.0, -5.0));

        ball.stop();
        assert!(ball.is_stopped());
        assert_eq!(ball.update(&bounds, 610.0), Vec2::ZERO);
    }

    #[test]
    fn test_paddle_moves_held_ball() {
        let mut state = GameState::new(7);
        assert!(state.move_paddle(-10.0));
        assert_eq!(state.paddle_bounds().map(|b| b.center().x), Some(295.0));
        assert_eq!(state.ball_bounds().map(|b| b.center().x), Some(295.0));
    }

    #[test]
    fn test_paddle_clamped_at_walls() {
        let mut state = GameState::new(7);
        // 265 units of room on the left: 26 steps fit, the 27th would cross 0
        for _ in 0..26 {
            assert!(state.move_paddle(-10.0));
        }
        assert_eq!(state.paddle_bounds().map(|b| b.left()), Some(5.0));
        assert!(!state.move_paddle(-10.0));
        assert_eq!(state.paddle_bounds().map(|b| b.left()), Some(5.0));
        assert_eq!(state.ball_bounds().map(|b| b.center().x), Some(45.0));
    }

    #[test]
    fn test_power_up_effect_from_rng() {
        let mut rng = random::ScriptedRandom::new(vec![0.2, 0.7]);
        assert_eq!(PowerUp::random(&mut rng).effect, Effect::Expand);
        assert_eq!(PowerUp::random(&mut rng).effect, Effect::ExtraBall);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::PADDLE.to_string(), "#4169E1");
        assert_eq!(Color(0x00FF00).to_string(), "#00FF00");
    }

    #[test]
    fn test_terminal_phases() {
        assert!(GamePhase::Won.is_terminal());
        assert!(GamePhase::GameOver.is_terminal());
        assert!(!GamePhase::LifeLost.is_terminal());
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let narrow = Settings {
            arena_width: 50.0,
            ..Settings::default()
        };
        assert!(matches!(
            GameState::with_settings(narrow),
            Err(SettingsError::Invalid(_))
        ));

        let stalled = Settings {
            tick_interval_ms: 0,
            ..Settings::default()
        };
        assert!(GameState::with_rng(stalled, random::seeded(1)).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_paddle_stays_inside_arena(
                moves in prop::collection::vec(-30.0f32..30.0, 0..200)
            ) {
                let mut state = GameState::new(7);
                for offset in moves {
                    state.move_paddle(offset);
                    let paddle = state.paddle_bounds().expect("paddle");
                    prop_assert!(paddle.left() >= 0.0);
                    prop_assert!(paddle.right() <= state.settings.arena_width);
                }
            }

            #[test]
            fn test_held_ball_follows_paddle(
                moves in prop::collection::vec(-20.0f32..20.0, 0..50)
            ) {
                let mut state = GameState::new(7);
                for offset in moves {
                    state.move_paddle(offset);
                }
                let paddle = state.paddle_bounds().expect("paddle");
                let ball = state.ball_bounds().expect("ball");
                prop_assert!((paddle.center().x - ball.center().x).abs() < 1e-3);
            }
        }
    }
}
