//! Records for every entity that lives on the road network.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed set of enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyArchetype {
    /// Fragile and quick.
    Light,
    /// Baseline enemy.
    Standard,
    /// Durable and slow; appears on periodic waves.
    Heavy,
    /// Stage-gated enemy that only joins waves from a later stage onward.
    Stealth,
}

/// Fixed statistics associated with an archetype before stage scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeStats {
    /// Unscaled hit points.
    pub hit_points: u32,
    /// Travel speed measured in edges per second.
    pub speed: f32,
    /// Money credited when the enemy is destroyed.
    pub reward: u32,
}

impl EnemyArchetype {
    /// Base statistics for the archetype.
    #[must_use]
    pub const fn stats(self) -> ArchetypeStats {
        match self {
            Self::Light => ArchetypeStats {
                hit_points: 30,
                speed: 2.0,
                reward: 5,
            },
            Self::Standard => ArchetypeStats {
                hit_points: 60,
                speed: 1.2,
                reward: 10,
            },
            Self::Heavy => ArchetypeStats {
                hit_points: 150,
                speed: 0.7,
                reward: 25,
            },
            Self::Stealth => ArchetypeStats {
                hit_points: 50,
                speed: 1.5,
                reward: 15,
            },
        }
    }
}

/// Fully resolved enemy statistics handed to the world for creation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyBlueprint {
    /// Archetype chosen by the spawner.
    pub archetype: EnemyArchetype,
    /// Hit points after stage and wave scaling.
    pub hit_points: u32,
    /// Travel speed measured in edges per second.
    pub speed: f32,
    /// Money credited when the enemy is destroyed.
    pub reward: u32,
}

/// Enemy travelling through the road network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Archetype the enemy was spawned as.
    pub archetype: EnemyArchetype,
    /// Remaining hit points, clamped at zero.
    pub hit_points: u32,
    /// Hit points at spawn time.
    pub max_hit_points: u32,
    /// Travel speed measured in edges per second.
    pub speed: f32,
    /// Node the enemy last stood on.
    pub current: NodeId,
    /// Node the enemy is heading for; `None` when waiting or at the goal.
    pub next: Option<NodeId>,
    /// Fraction of the current edge already covered, in `[0, 1)`.
    pub progress: f32,
    /// Interpolated position in world units.
    pub position: Vec2,
    /// Money credited when the enemy is destroyed.
    pub reward: u32,
}

impl Enemy {
    /// Reports whether the enemy still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hit_points > 0
    }
}

/// Upgrade branch chosen when a tower reaches tier 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    /// Fast firing, low damage.
    Rapid,
    /// Slow firing, high damage, extended range.
    Sniper,
    /// Area damage on impact.
    Splash,
}

/// Tier of a tower, from 1 to 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerTier(u8);

impl TowerTier {
    /// Tier every tower is built at.
    pub const BASE: Self = Self(1);
    /// Highest reachable tier.
    pub const MAX: Self = Self(3);

    /// Numeric tier value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Tier reached by the next upgrade, if any remains.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 >= Self::MAX.0 {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }
}

/// Fixed stat set associated with a tower tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerProfile {
    /// Price paid to reach this tier.
    pub cost: u32,
    /// Damage dealt per projectile.
    pub damage: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Minimum time between shots.
    pub fire_interval: Duration,
    /// Splash radius in world units, if any.
    pub area_radius: Option<f32>,
}

impl TowerProfile {
    const fn new(
        cost: u32,
        damage: u32,
        range: f32,
        fire_interval_ms: u64,
        area_radius: Option<f32>,
    ) -> Self {
        Self {
            cost,
            damage,
            range,
            fire_interval: Duration::from_millis(fire_interval_ms),
            area_radius,
        }
    }

    /// Profile of a freshly built tier-1 tower.
    #[must_use]
    pub const fn basic() -> Self {
        Self::new(100, 10, 3.0, 800, None)
    }

    /// Profile reached by upgrading along `specialization` to `tier`.
    ///
    /// Returns `None` for tier 1, which has no specialization.
    #[must_use]
    pub const fn specialized(specialization: Specialization, tier: TowerTier) -> Option<Self> {
        let profile = match (specialization, tier.get()) {
            (Specialization::Rapid, 2) => Self::new(150, 6, 3.0, 300, None),
            (Specialization::Rapid, 3) => Self::new(300, 9, 3.5, 200, None),
            (Specialization::Sniper, 2) => Self::new(200, 40, 5.0, 1_800, None),
            (Specialization::Sniper, 3) => Self::new(400, 90, 6.5, 2_000, None),
            (Specialization::Splash, 2) => Self::new(250, 15, 3.0, 1_200, Some(1.5)),
            (Specialization::Splash, 3) => Self::new(450, 25, 3.5, 1_100, Some(2.0)),
            _ => return None,
        };
        Some(profile)
    }
}

/// Tower placed on buildable land.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Node the tower stands on.
    pub node: NodeId,
    /// Position of the tower in world units.
    pub position: Vec2,
    /// Locked-in upgrade branch; `None` while at tier 1.
    pub specialization: Option<Specialization>,
    /// Current tier.
    pub tier: TowerTier,
    /// Damage dealt per projectile.
    pub damage: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Minimum time between shots.
    pub fire_interval: Duration,
    /// Simulation time of the last shot.
    pub last_fired: Option<Duration>,
    /// Splash radius in world units, if any.
    pub area_radius: Option<f32>,
}

impl Tower {
    /// Builds a tier-1 tower on the provided node.
    #[must_use]
    pub fn basic(id: TowerId, node: NodeId, position: Vec2) -> Self {
        let mut tower = Self {
            id,
            node,
            position,
            specialization: None,
            tier: TowerTier::BASE,
            damage: 0,
            range: 0.0,
            fire_interval: Duration::ZERO,
            last_fired: None,
            area_radius: None,
        };
        tower.apply_profile(&TowerProfile::basic());
        tower
    }

    /// Overwrites the combat statistics with the provided profile.
    pub fn apply_profile(&mut self, profile: &TowerProfile) {
        self.damage = profile.damage;
        self.range = profile.range;
        self.fire_interval = profile.fire_interval;
        self.area_radius = profile.area_radius;
    }

    /// Reports whether the cooldown elapsed at simulation time `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        self.last_fired
            .map_or(true, |fired| now.saturating_sub(fired) >= self.fire_interval)
    }
}

/// Projectile in flight toward an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Position in world units.
    pub position: Vec2,
    /// Enemy the projectile homes in on.
    pub target: EnemyId,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Damage dealt on impact.
    pub damage: u32,
    /// Splash radius in world units, if any.
    pub area_radius: Option<f32>,
}

/// Temporary obstacle occupying a walkable node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadBlock {
    /// Node the block occupies.
    pub node: NodeId,
    /// Simulation time after which the block disappears.
    pub expires_at: Duration,
}

impl RoadBlock {
    /// Reports whether the block has lapsed at simulation time `now`.
    #[must_use]
    pub fn is_expired(&self, now: Duration) -> bool {
        now > self.expires_at
    }
}
