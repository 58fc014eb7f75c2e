//! Headless presentation phases of an enemy.

use tile_defense_core::config::AnimationConfig;

/// Presentation clip currently playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Clip {
    /// Entrance on the spawn point; the enemy stands still.
    Intro,
    /// Plain movement along the path; the only targetable phase.
    Move,
    /// Exit after reaching a destination.
    Outro,
    /// Defeat outro played before the enemy is reclaimed.
    Dying,
}

/// Tracks which clip plays and how far it progressed.
///
/// Renderers read [`EnemyAnimator::current_clip`] and
/// [`EnemyAnimator::clip_time`]; the simulation only asks whether the clip
/// finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyAnimator {
    clip: Clip,
    clip_time: f32,
    move_speed: f32,
    intro: f32,
    outro: f32,
    dying: f32,
}

impl EnemyAnimator {
    /// Creates an animator playing the intro clip.
    #[must_use]
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            clip: Clip::Intro,
            clip_time: 0.0,
            move_speed: 1.0,
            intro: config.intro,
            outro: config.outro,
            dying: config.dying,
        }
    }

    /// Clip currently playing.
    #[must_use]
    pub const fn current_clip(&self) -> Clip {
        self.clip
    }

    /// Playback position of the current clip in seconds.
    #[must_use]
    pub const fn clip_time(&self) -> f32 {
        self.clip_time
    }

    /// Playback rate of the move clip.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Reports whether the current clip reached its end. The move clip loops.
    #[must_use]
    pub fn is_done(&self) -> bool {
        match self.clip {
            Clip::Intro => self.clip_time >= self.intro,
            Clip::Move => false,
            Clip::Outro => self.clip_time >= self.outro,
            Clip::Dying => self.clip_time >= self.dying,
        }
    }

    /// Advances playback by `dt` seconds.
    pub fn game_update(&mut self, dt: f32) {
        let rate = if self.clip == Clip::Move {
            self.move_speed
        } else {
            1.0
        };
        self.clip_time += dt * rate;
    }

    /// Restarts the intro clip.
    pub fn play_intro(&mut self) {
        self.begin(Clip::Intro);
    }

    /// Switches to the move clip playing at `speed`.
    pub fn play_move(&mut self, speed: f32) {
        self.move_speed = speed;
        self.begin(Clip::Move);
    }

    /// Switches to the exit clip.
    pub fn play_outro(&mut self) {
        self.begin(Clip::Outro);
    }

    /// Switches to the defeat clip.
    pub fn play_dying(&mut self) {
        self.begin(Clip::Dying);
    }

    fn begin(&mut self, clip: Clip) {
        self.clip = clip;
        self.clip_time = 0.0;
    }
}
