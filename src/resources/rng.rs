use bevy_ecs::prelude::Resource;

/// Random source for behavior rolls. Seed it in tests for repeatable picks.
#[derive(Resource, Debug, Clone)]
pub struct BehaviorRng(pub fastrand::Rng);

impl Default for BehaviorRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}

impl BehaviorRng {
    pub fn seeded(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }

    /// Uniform integer in `lo..=hi`.
    pub fn roll(&mut self, lo: u32, hi: u32) -> u32 {
        self.0.u32(lo..=hi)
    }

    /// Uniform float in `lo..hi`.
    pub fn between(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + self.0.f32() * (hi - lo)
    }

    pub fn index(&mut self, len: usize) -> usize {
        self.0.usize(..len)
    }
}
