//! A small arena battle built on the entity graph.
//!
//! Fighters are children of the scene root, named by unit ids. Each carries
//! a weapon component and optionally armor. Every tick a fighter picks the
//! weakest enemy and spawns a pooled [`Strike`] under itself; the strike
//! lands in its start hook and disposes itself.

use engine_entity::{
    Awake, Destroy, EntityRef, EntityType, GraphError, Start, TypeBuilder, Update, World,
};
use tracing::{debug, info};

/// Anything that deals damage.
pub trait Weapon {
    /// Damage per strike.
    fn damage(&self) -> i32;
}

/// Close-range weapon.
#[derive(Debug, Default)]
pub struct Blade {
    /// Damage per strike.
    pub edge: i32,
}

impl Weapon for Blade {
    fn damage(&self) -> i32 {
        self.edge
    }
}

impl EntityType for Blade {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.capability::<dyn Weapon>(|b| b, |b| b);
    }
}

impl Awake<(i32,)> for Blade {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (edge,): (i32,)) {
        self.edge = edge;
    }
}

/// Ranged weapon; weaker but with a flat bonus.
#[derive(Debug, Default)]
pub struct Longbow {
    /// Draw weight; damage is half of it plus a flat bonus.
    pub draw: i32,
}

impl Weapon for Longbow {
    fn damage(&self) -> i32 {
        self.draw / 2 + 3
    }
}

impl EntityType for Longbow {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.capability::<dyn Weapon>(|b| b, |b| b);
    }
}

impl Awake<(i32,)> for Longbow {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (draw,): (i32,)) {
        self.draw = draw;
    }
}

/// Flat damage reduction.
#[derive(Debug, Default)]
pub struct Armor {
    /// Subtracted from every strike taken, down to a minimum of 1.
    pub block: i32,
}

impl EntityType for Armor {}

impl Awake<(i32,)> for Armor {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (block,): (i32,)) {
        self.block = block;
    }
}

/// A combatant.
#[derive(Debug, Default)]
pub struct Fighter {
    /// Display name, for logs.
    pub name: String,
    /// Fighters on the same team never target each other.
    pub team: u8,
    /// Remaining hit points; the fighter is disposed at zero or below.
    pub hp: i32,
    /// Strikes launched so far.
    pub strikes: u32,
}

impl EntityType for Fighter {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.start().update().destroy();
    }
}

impl Awake<(String, u8, i32)> for Fighter {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (name, team, hp): (String, u8, i32)) {
        self.name = name;
        self.team = team;
        self.hp = hp;
    }
}

impl Start for Fighter {
    fn start(&mut self, world: &mut World, me: EntityRef) {
        debug!(name = %self.name, team = self.team, id = world.id(me), "fighter enters");
    }
}

impl Update for Fighter {
    fn update(&mut self, world: &mut World, me: EntityRef) {
        let Some(target) = weakest_enemy(world, self.team) else {
            return;
        };
        let damage = world.component::<dyn Weapon>(me).map_or(1, |w| w.damage());
        if world
            .add_child_with::<Strike, _>(me, (target, damage))
            .is_ok()
        {
            self.strikes += 1;
        }
    }
}

impl Destroy for Fighter {
    fn destroy(&mut self, _world: &mut World, _me: EntityRef) {
        info!(name = %self.name, team = self.team, strikes = self.strikes, "fighter down");
    }
}

/// One attack in flight. Pooled: the battle creates one per fighter per tick.
#[derive(Debug, Default)]
pub struct Strike {
    target: Option<EntityRef>,
    damage: i32,
}

impl EntityType for Strike {
    const POOLED: bool = true;

    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.start();
    }
}

impl Awake<(EntityRef, i32)> for Strike {
    fn awake(&mut self, _world: &mut World, _me: EntityRef, (target, damage): (EntityRef, i32)) {
        self.target = Some(target);
        self.damage = damage;
    }
}

impl Start for Strike {
    fn start(&mut self, world: &mut World, me: EntityRef) {
        if let Some(target) = self.target {
            let block = world.component::<Armor>(target).map_or(0, |a| a.block);
            let dealt = (self.damage - block).max(1);
            let fallen = world.get_mut::<Fighter>(target).is_some_and(|fighter| {
                fighter.hp -= dealt;
                fighter.hp <= 0
            });
            if fallen {
                world.dispose(target);
            }
        }
        world.dispose(me);
    }
}

/// Which weapon a fighter carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arms {
    /// A [`Blade`] with this edge.
    Blade(i32),
    /// A [`Longbow`] with this draw.
    Longbow(i32),
}

/// Starting loadout of one fighter.
#[derive(Debug, Clone)]
pub struct Recruit {
    /// Becomes [`Fighter::name`].
    pub name: &'static str,
    /// Becomes [`Fighter::team`].
    pub team: u8,
    /// Starting hit points.
    pub hp: i32,
    /// Weapon component to attach.
    pub arms: Arms,
    /// Block of the [`Armor`] component, if any.
    pub armor: Option<i32>,
}

/// Two teams of three.
#[must_use]
pub fn default_roster() -> Vec<Recruit> {
    vec![
        Recruit {
            name: "Aldric",
            team: 0,
            hp: 40,
            arms: Arms::Blade(9),
            armor: Some(3),
        },
        Recruit {
            name: "Brena",
            team: 0,
            hp: 28,
            arms: Arms::Longbow(10),
            armor: None,
        },
        Recruit {
            name: "Cato",
            team: 0,
            hp: 34,
            arms: Arms::Blade(7),
            armor: Some(1),
        },
        Recruit {
            name: "Dusk",
            team: 1,
            hp: 45,
            arms: Arms::Blade(8),
            armor: Some(2),
        },
        Recruit {
            name: "Ember",
            team: 1,
            hp: 25,
            arms: Arms::Longbow(12),
            armor: None,
        },
        Recruit {
            name: "Fen",
            team: 1,
            hp: 30,
            arms: Arms::Blade(6),
            armor: Some(4),
        },
    ]
}

/// Put every recruit into the scene root.
///
/// # Errors
///
/// Fails if the world's zone cannot mint unit ids.
pub fn spawn(world: &mut World, roster: &[Recruit]) -> Result<Vec<EntityRef>, GraphError> {
    let root = world.root();
    let mut fighters = Vec::with_capacity(roster.len());
    for recruit in roster {
        let fighter = world.add_unit::<Fighter, _>(
            root,
            (recruit.name.to_string(), recruit.team, recruit.hp),
        )?;
        match recruit.arms {
            Arms::Blade(edge) => world.add_component_with::<Blade, _>(fighter, (edge,))?,
            Arms::Longbow(draw) => world.add_component_with::<Longbow, _>(fighter, (draw,))?,
        };
        if let Some(block) = recruit.armor {
            world.add_component_with::<Armor, _>(fighter, (block,))?;
        }
        fighters.push(fighter);
    }
    Ok(fighters)
}

/// Fighters still standing, in no particular order.
pub fn standing(world: &World) -> impl Iterator<Item = (EntityRef, &Fighter)> + '_ {
    world
        .children(world.root())
        .filter_map(move |entity| world.get::<Fighter>(entity).map(|f| (entity, f)))
}

/// The living enemy of `team` with the least hp; ties go to the lower id.
pub fn weakest_enemy(world: &World, team: u8) -> Option<EntityRef> {
    standing(world)
        .filter(|(_, fighter)| fighter.team != team)
        .min_by_key(|&(entity, fighter)| (fighter.hp, world.id(entity)))
        .map(|(entity, _)| entity)
}

/// The team left standing once the other is wiped out.
pub fn winner(world: &World) -> Option<u8> {
    let mut teams = standing(world).map(|(_, fighter)| fighter.team);
    let first = teams.next()?;
    teams.all(|team| team == first).then_some(first)
}
