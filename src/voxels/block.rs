//! Packed voxel descriptor.
//!
//! A [`Block`] is one `u32` with fixed-width fields:
//!
//! ```text
//!   [0:11]   block id (12 bits, 0 = air)
//!   [12:14]  facing direction (3 bits)
//!   [15:22]  mass (8 bits)
//!   [23:30]  health (8 bits)
//!   [31]     transparent flag
//! ```
//!
//! Writes wider than a field are masked to the field width. Nothing is
//! rejected, a too large id simply wraps.
use bytemuck::{Pod, Zeroable};
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

const ID_SHIFT: u32 = 0;
const ID_BITS: u32 = 12;
const DIRECTION_SHIFT: u32 = 12;
const DIRECTION_BITS: u32 = 3;
const MASS_SHIFT: u32 = 15;
const MASS_BITS: u32 = 8;
const HEALTH_SHIFT: u32 = 23;
const HEALTH_BITS: u32 = 8;
const TRANSPARENT_SHIFT: u32 = 31;

const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

#[inline]
fn read_field(bits: u32, shift: u32, width: u32) -> u32 {
    (bits >> shift) & mask(width)
}

#[inline]
fn write_field(bits: u32, shift: u32, width: u32, value: u32) -> u32 {
    let field = mask(width) << shift;
    (bits & !field) | ((value << shift) & field)
}

/// Axis aligned facing of a block
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
    ];

    /// Returns None for the two unused 3 bit patterns (6 and 7)
    pub fn from_bits(bits: u8) -> Option<Direction> {
        Direction::ALL.get(bits as usize).copied()
    }

    pub fn normal(self) -> IVec3 {
        match self {
            Direction::PosX => IVec3::X,
            Direction::NegX => IVec3::NEG_X,
            Direction::PosY => IVec3::Y,
            Direction::NegY => IVec3::NEG_Y,
            Direction::PosZ => IVec3::Z,
            Direction::NegZ => IVec3::NEG_Z,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::PosX => Direction::NegX,
            Direction::NegX => Direction::PosX,
            Direction::PosY => Direction::NegY,
            Direction::NegY => Direction::PosY,
            Direction::PosZ => Direction::NegZ,
            Direction::NegZ => Direction::PosZ,
        }
    }
}

/// Unpacked view of a [`Block`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockFields {
    pub id: u16,
    pub direction: u8,
    pub mass: u8,
    pub health: u8,
    pub transparent: bool,
}

#[repr(transparent)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Block(u32);

impl Block {
    pub const AIR: Block = Block(0);

    /// Packs all fields. Values wider than their field are truncated.
    pub fn encode(id: u32, direction: u32, mass: u32, health: u32, transparent: bool) -> Block {
        Block::AIR
            .with_id(id)
            .with_direction(direction)
            .with_mass(mass)
            .with_health(health)
            .with_transparent(transparent)
    }

    pub fn decode(self) -> BlockFields {
        BlockFields {
            id: self.id(),
            direction: self.direction_bits(),
            mass: self.mass(),
            health: self.health(),
            transparent: self.is_transparent(),
        }
    }

    /// Solid block of the given id, facing +X, no mass or health set
    pub fn solid(id: u32) -> Block {
        Block::AIR.with_id(id)
    }

    pub const fn from_bits(bits: u32) -> Block {
        Block(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn id(self) -> u16 {
        read_field(self.0, ID_SHIFT, ID_BITS) as u16
    }

    /// Id 0 is air whatever the other fields hold
    pub fn is_air(self) -> bool {
        self.id() == 0
    }

    pub fn is_solid(self) -> bool {
        !self.is_air()
    }

    pub fn direction_bits(self) -> u8 {
        read_field(self.0, DIRECTION_SHIFT, DIRECTION_BITS) as u8
    }

    pub fn facing(self) -> Option<Direction> {
        Direction::from_bits(self.direction_bits())
    }

    pub fn mass(self) -> u8 {
        read_field(self.0, MASS_SHIFT, MASS_BITS) as u8
    }

    pub fn health(self) -> u8 {
        read_field(self.0, HEALTH_SHIFT, HEALTH_BITS) as u8
    }

    pub fn is_transparent(self) -> bool {
        read_field(self.0, TRANSPARENT_SHIFT, 1) == 1
    }

    pub fn set_id(&mut self, id: u32) {
        self.0 = write_field(self.0, ID_SHIFT, ID_BITS, id);
    }

    pub fn set_direction(&mut self, direction: u32) {
        self.0 = write_field(self.0, DIRECTION_SHIFT, DIRECTION_BITS, direction);
    }

    pub fn set_facing(&mut self, facing: Direction) {
        self.set_direction(facing as u32);
    }

    pub fn set_mass(&mut self, mass: u32) {
        self.0 = write_field(self.0, MASS_SHIFT, MASS_BITS, mass);
    }

    pub fn set_health(&mut self, health: u32) {
        self.0 = write_field(self.0, HEALTH_SHIFT, HEALTH_BITS, health);
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.0 = write_field(self.0, TRANSPARENT_SHIFT, 1, transparent as u32);
    }

    pub fn with_id(mut self, id: u32) -> Block {
        self.set_id(id);
        self
    }

    pub fn with_direction(mut self, direction: u32) -> Block {
        self.set_direction(direction);
        self
    }

    pub fn with_facing(mut self, facing: Direction) -> Block {
        self.set_facing(facing);
        self
    }

    pub fn with_mass(mut self, mass: u32) -> Block {
        self.set_mass(mass);
        self
    }

    pub fn with_health(mut self, health: u32) -> Block {
        self.set_health(health);
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Block {
        self.set_transparent(transparent);
        self
    }
}

/// Emitted light of a voxel. Level 0 means the voxel does not glow.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub level: u8,
    /// Linear rgb
    pub color: Vec3,
}

impl Light {
    pub const DARK: Light = Light {
        level: 0,
        color: Vec3::ZERO,
    };

    pub fn is_emissive(&self) -> bool {
        self.level > 0
    }
}

impl Default for Light {
    fn default() -> Self {
        Light::DARK
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockFields, Direction};

    #[test]
    fn test_round_trip_extremes() {
        let cases = [
            (0, 0, 0, 0, false),
            (1, 5, 255, 255, true),
            (4095, 7, 0, 255, false),
            (2048, 3, 128, 1, true),
        ];
        for (id, direction, mass, health, transparent) in cases {
            let block = Block::encode(id, direction, mass, health, transparent);
            assert_eq!(
                block.decode(),
                BlockFields {
                    id: id as u16,
                    direction: direction as u8,
                    mass: mass as u8,
                    health: health as u8,
                    transparent,
                }
            );
        }
    }

    #[test]
    fn test_round_trip_random() {
        let mut rng = fastrand::Rng::with_seed(12345);
        for _ in 0..10_000 {
            let id = rng.u32(0..4096);
            let direction = rng.u32(0..8);
            let mass = rng.u32(0..256);
            let health = rng.u32(0..256);
            let transparent = rng.bool();
            let block = Block::encode(id, direction, mass, health, transparent);
            let fields = block.decode();
            assert_eq!(
                fields,
                BlockFields {
                    id: id as u16,
                    direction: direction as u8,
                    mass: mass as u8,
                    health: health as u8,
                    transparent,
                }
            );
            assert_eq!(block.is_air(), id == 0);
            // Rewriting one field leaves the others alone
            let moved = block.with_mass(255 - mass);
            assert_eq!(moved.id(), fields.id);
            assert_eq!(moved.direction_bits(), fields.direction);
            assert_eq!(moved.health(), fields.health);
            assert_eq!(moved.is_transparent(), transparent);
            assert_eq!(moved.mass(), (255 - mass) as u8);
        }
    }

    #[test]
    fn test_id_zero_is_always_air() {
        for direction in 0..8 {
            for mass in 0..256 {
                for health in 0..256 {
                    for transparent in [false, true] {
                        let block = Block::encode(0, direction, mass, health, transparent);
                        assert!(block.is_air());
                        assert!(!block.is_solid());
                    }
                }
            }
        }
    }

    #[test]
    fn test_air_ignores_other_fields() {
        let block = Block::encode(0, 4, 200, 17, true);
        assert!(block.is_air());
        assert!(!block.is_solid());
        assert_ne!(block, Block::AIR);
        assert!(Block::AIR.is_air());
    }

    #[test]
    fn test_overflow_is_masked() {
        // 4096 needs 13 bits and wraps to 0
        let block = Block::AIR.with_id(4096);
        assert_eq!(block.id(), 0);
        let block = Block::AIR.with_id(4097).with_direction(9).with_mass(300);
        assert_eq!(block.id(), 1);
        assert_eq!(block.direction_bits(), 1);
        assert_eq!(block.mass(), (300 & 0xff) as u8);
    }

    #[test]
    fn test_setters_leave_other_fields_alone() {
        let mut block = Block::encode(77, 2, 10, 20, true);
        block.set_mass(99);
        assert_eq!(block.id(), 77);
        assert_eq!(block.direction_bits(), 2);
        assert_eq!(block.health(), 20);
        assert!(block.is_transparent());
        block.set_id(u32::MAX);
        assert_eq!(block.id(), 4095);
        assert_eq!(block.mass(), 99);
        assert_eq!(block.health(), 20);
        block.set_transparent(false);
        assert_eq!(block.bits() >> 31, 0);
        assert_eq!(block.health(), 20);
    }

    #[test]
    fn test_facing() {
        for direction in Direction::ALL {
            let block = Block::solid(3).with_facing(direction);
            assert_eq!(block.facing(), Some(direction));
            assert_eq!(direction.normal(), -direction.opposite().normal());
        }
        assert_eq!(Block::solid(3).with_direction(6).facing(), None);
    }
}
