//! Demo gameplay: a runner patrols a lane, picking up coins. Each pickup
//! kills the coin, drops a one-shot spark effect that removes itself when its
//! animation ends, and plays a sound. When the lane is empty a new row of
//! coins is laid down.

use stage_scene::{EntityId, Scene};

pub const RUNNER: &str = "runner";
pub const COIN: &str = "coin";
pub const SPARK: &str = "spark";
pub const PICKUP_SOUND: &str = "pickup";

const LANE_Y: f32 = 120.0;
const LANE_LEFT: f32 = 40.0;
const LANE_RIGHT: f32 = 600.0;
const RUN_SPEED: f32 = 140.0;
const COIN_COUNT: usize = 6;
const PICKUP_RADIUS: f32 = 12.0;

// Runner sheet states.
const FACING_RIGHT: u32 = 0;
const FACING_LEFT: u32 = 1;

#[derive(Debug, Default)]
pub struct Director {
    runner: Option<EntityId>,
    coins_left: usize,
    pub collected: u32,
    pub rounds: u32,
}

impl Director {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_some()
    }

    /// Spawn the runner and the first row of coins. Needs every sprite loaded
    /// for the sizes it reads.
    pub fn setup(&mut self, scene: &mut Scene) {
        let Some(runner) = scene.spawn(RUNNER, Some("players"), None) else {
            log::error!("Runner sprite is missing from the manifest");
            return;
        };
        runner
            .set_position(LANE_LEFT, LANE_Y)
            .set_velocity(RUN_SPEED, 0.0);
        self.runner = Some(runner.id());
        self.lay_coins(scene, glam::Vec2::new(LANE_LEFT, LANE_Y));
    }

    pub fn tick(&mut self, scene: &mut Scene) {
        let Some(runner_id) = self.runner else {
            return;
        };
        let Some(runner) = scene.entity_mut(runner_id) else {
            return;
        };

        let position = runner.position();
        let heading = runner.velocity().x;
        let turn = if position.x >= LANE_RIGHT && heading > 0.0 {
            runner.set_velocity(-RUN_SPEED, 0.0);
            Some(FACING_LEFT)
        } else if position.x <= LANE_LEFT && heading < 0.0 {
            runner.set_velocity(RUN_SPEED, 0.0);
            Some(FACING_RIGHT)
        } else {
            None
        };
        if let Some(state) = turn {
            scene.set_state(runner_id, state);
        }

        let hits: Vec<(EntityId, glam::Vec2)> = scene
            .group_members("pickups")
            .iter()
            .filter_map(|id| scene.entity(*id))
            .filter(|coin| !coin.is_killed())
            .filter(|coin| coin.position().distance(position) < PICKUP_RADIUS)
            .map(|coin| (coin.id(), coin.position()))
            .collect();

        for (coin, at) in hits {
            scene.kill_object(coin);
            if let Some(spark) = scene.spawn(SPARK, Some("effects"), None) {
                spark.set_position(at.x, at.y).set_uniform_scale(1.5);
            }
            scene.play_sound(PICKUP_SOUND, None, None);
            self.collected += 1;
            self.coins_left = self.coins_left.saturating_sub(1);
        }

        if self.coins_left == 0 {
            self.rounds += 1;
            log::info!("Round {} cleared, {} coins so far", self.rounds, self.collected);
            self.lay_coins(scene, position);
        }
    }

    /// A coin that would land on top of the runner is skipped.
    fn lay_coins(&mut self, scene: &mut Scene, runner_at: glam::Vec2) {
        let spacing = (LANE_RIGHT - LANE_LEFT) / (COIN_COUNT as f32 + 1.0);
        for i in 0..COIN_COUNT {
            let x = LANE_LEFT + spacing * (i as f32 + 1.0);
            if (x - runner_at.x).abs() < PICKUP_RADIUS * 2.0 {
                continue;
            }
            if let Some(coin) = scene.spawn(COIN, Some("pickups"), None) {
                coin.set_position(x, LANE_Y);
                self.coins_left += 1;
            }
        }
    }
}
