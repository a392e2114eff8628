//! End-to-end scenarios for the world facade: entity lifecycle, component
//! signatures, system membership and singletons.

use std::collections::{BTreeSet, HashSet};

use mosaic_core::{
    ComponentOwner, EcsError, Entity, Signature, System, World, WorldConfig, MAX_COMPONENT_TYPES,
};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Position {
    x: i32,
    y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Velocity {
    dx: i32,
    dy: i32,
}

#[derive(Debug, PartialEq)]
struct Config {
    value: u32,
}

#[derive(Default)]
struct Movers;

impl System for Movers {}

#[derive(Default)]
struct Drifters;

impl System for Drifters {}

/// Small deterministic generator so the churn test is reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        usize::try_from(self.next() % n as u64).unwrap()
    }
}

fn expected_members(world: &World, required: Signature) -> BTreeSet<Entity> {
    world
        .iter_entities()
        .filter(|&e| world.entity_signature(e).unwrap().contains(required))
        .collect()
}

#[test]
fn movers_scenario() {
    let mut world = World::new(WorldConfig::default()).unwrap();
    world.register_component::<Position>().unwrap();
    world.register_component::<Velocity>().unwrap();
    world.register_system::<Movers>().unwrap();
    let position = world.component_signature::<Position>().unwrap();
    world.set_system_signature::<Movers>(position).unwrap();

    let a = world.create_entity().unwrap();
    let b = world.create_entity().unwrap();
    let c = world.create_entity().unwrap();
    world.add_component(a, Position { x: 1, y: 1 }).unwrap();
    world.add_component(b, Position { x: 2, y: 2 }).unwrap();
    world.add_component(c, Position { x: 3, y: 3 }).unwrap();
    world.add_component(c, Velocity { dx: 1, dy: 0 }).unwrap();

    assert_eq!(world.system_entities::<Movers>().unwrap().len(), 3);

    world.remove_component::<Position>(a).unwrap();
    let movers = world.system_entities::<Movers>().unwrap();
    assert_eq!(movers.len(), 2);
    assert!(!movers.contains(&a));

    // Lowest matched entity first, like iterating the live set
    let first = *movers.iter().next().unwrap();
    assert_eq!(
        world.get_component::<Position>(first).unwrap(),
        &Position { x: 2, y: 2 }
    );
}

#[test]
fn first_entity_component_value_is_returned() {
    let mut world = World::with_capacity(8).unwrap();
    world.register_component::<Position>().unwrap();
    world.register_component::<Velocity>().unwrap();
    world.register_system::<Movers>().unwrap();
    let mut required = Signature::EMPTY;
    world.add_component_signature::<Position>(&mut required).unwrap();
    world.set_system_signature::<Movers>(required).unwrap();

    let e1 = world.create_entity().unwrap();
    let e2 = world.create_entity().unwrap();
    let _e3 = world.create_entity().unwrap();
    world.add_component(e1, Position { x: 5, y: 0 }).unwrap();
    world.add_component(e2, Position { x: 6, y: 0 }).unwrap();
    world.add_component(e2, Velocity { dx: 6, dy: 6 }).unwrap();

    let matched = world.system_entities::<Movers>().unwrap();
    assert_eq!(matched.len(), 2);
    let first = *matched.iter().next().unwrap();
    assert_eq!(world.get_component::<Position>(first).unwrap().x, 5);
    assert_eq!(world.get_component::<Velocity>(e2).unwrap().dy, 6);
}

#[test]
fn add_and_remove_keep_signature_in_step() {
    let mut world = World::with_capacity(4).unwrap();
    world.register_component::<Position>().unwrap();
    let bit = world.component_signature::<Position>().unwrap();
    let e = world.create_entity().unwrap();

    world.add_component(e, Position { x: 9, y: -9 }).unwrap();
    assert_eq!(
        *world.get_component::<Position>(e).unwrap(),
        Position { x: 9, y: -9 }
    );
    assert!(world.entity_signature(e).unwrap().contains(bit));

    world.remove_component::<Position>(e).unwrap();
    assert_eq!(
        world.get_component::<Position>(e),
        Err(EcsError::MissingComponent {
            owner: ComponentOwner::Entity(e),
            component: std::any::type_name::<Position>(),
        })
    );
    assert!(!world.entity_signature(e).unwrap().contains(bit));
}

#[test]
fn destroyed_entity_is_scrubbed_and_reusable() {
    let mut world = World::with_capacity(2).unwrap();
    world.register_component::<Position>().unwrap();
    world.register_component::<Velocity>().unwrap();
    world.register_system::<Movers>().unwrap();
    world.register_system::<Drifters>().unwrap();
    let position = world.component_signature::<Position>().unwrap();
    let velocity = world.component_signature::<Velocity>().unwrap();
    world.set_system_signature::<Movers>(position).unwrap();
    world.set_system_signature::<Drifters>(velocity).unwrap();

    let e = world.create_entity().unwrap();
    let keep = world.create_entity().unwrap();
    world.add_component(e, Position { x: 0, y: 0 }).unwrap();
    world.add_component(e, Velocity { dx: 1, dy: 1 }).unwrap();
    world.add_component(keep, Velocity { dx: 2, dy: 2 }).unwrap();

    world.destroy_entity(e).unwrap();
    assert!(!world.is_alive(e));
    assert!(world.system_entities::<Movers>().unwrap().is_empty());
    assert_eq!(
        world
            .system_entities::<Drifters>()
            .unwrap()
            .iter()
            .copied()
            .collect::<Vec<_>>(),
        vec![keep]
    );

    let reused = world.create_entity().unwrap();
    assert_eq!(reused, e);
    assert_eq!(world.entity_signature(reused).unwrap(), Signature::EMPTY);
    assert!(!world.has_component::<Position>(reused));
    assert!(!world.has_component::<Velocity>(reused));
    assert!(!world
        .system_entities::<Drifters>()
        .unwrap()
        .contains(&reused));
}

#[test]
fn capacity_is_a_hard_limit() {
    let mut world = World::with_capacity(3).unwrap();
    for _ in 0..3 {
        world.create_entity().unwrap();
    }
    assert_eq!(
        world.create_entity(),
        Err(EcsError::CapacityExhausted { capacity: 3 })
    );
    assert_eq!(world.alive_count(), 3);
}

#[test]
fn sixty_fifth_component_type_is_rejected() {
    macro_rules! register_arrays {
        ($world:expr, $($n:literal)*) => {
            $( $world.register_component::<[u16; $n]>().unwrap(); )*
        };
    }

    let mut world = World::with_capacity(1).unwrap();
    register_arrays!(world,
        0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
        16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
        32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47
        48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63);
    assert_eq!(MAX_COMPONENT_TYPES, 64);

    assert_eq!(
        world.register_component::<Position>(),
        Err(EcsError::TooManyComponentTypes)
    );
    // Singletons have no bit and are still available
    world.register_singleton_component::<Config>().unwrap();
}

#[test]
fn singleton_config_scenario() {
    let mut world = World::with_capacity(4).unwrap();
    world.register_singleton_component::<Config>().unwrap();
    world.add_singleton_component(Config { value: 5 }).unwrap();
    assert_eq!(world.get_singleton_component::<Config>().unwrap().value, 5);

    assert_eq!(
        world.add_singleton_component(Config { value: 6 }),
        Err(EcsError::DuplicateComponent {
            owner: ComponentOwner::Singleton,
            component: std::any::type_name::<Config>(),
        })
    );

    world.get_singleton_component_mut::<Config>().unwrap().value += 1;
    assert_eq!(
        world.remove_singleton_component::<Config>().unwrap(),
        Config { value: 6 }
    );
    assert!(matches!(
        world.get_singleton_component::<Config>(),
        Err(EcsError::MissingComponent { .. })
    ));
    world.add_singleton_component(Config { value: 7 }).unwrap();
}

#[test]
fn singleton_and_component_namespaces_conflict() {
    let mut world = World::with_capacity(4).unwrap();
    world.register_singleton_component::<Config>().unwrap();
    assert!(matches!(
        world.register_component::<Config>(),
        Err(EcsError::NamespaceConflict(_))
    ));

    world.register_component::<Position>().unwrap();
    assert!(matches!(
        world.register_singleton_component::<Position>(),
        Err(EcsError::NamespaceConflict(_))
    ));

    // Singletons never touch entity signatures or systems
    world.register_system::<Movers>().unwrap();
    let position = world.component_signature::<Position>().unwrap();
    world.set_system_signature::<Movers>(position).unwrap();
    let e = world.create_entity().unwrap();
    world.add_singleton_component(Config { value: 1 }).unwrap();
    assert!(world.entity_signature(e).unwrap().is_empty());
    assert!(world.system_entities::<Movers>().unwrap().is_empty());
}

#[test]
fn registration_errors() {
    let mut world = World::with_capacity(4).unwrap();
    world.register_component::<Position>().unwrap();
    assert!(matches!(
        world.register_component::<Position>(),
        Err(EcsError::AlreadyRegistered(_))
    ));
    assert!(matches!(
        world.component_signature::<Velocity>(),
        Err(EcsError::NotRegistered(_))
    ));

    world.register_system::<Movers>().unwrap();
    assert!(matches!(
        world.register_system::<Movers>(),
        Err(EcsError::AlreadyRegistered(_))
    ));
    assert!(matches!(
        world.set_system_signature::<Drifters>(Signature::EMPTY),
        Err(EcsError::NotRegistered(_))
    ));
}

#[test]
fn set_system_signature_waits_for_next_change() {
    let mut world = World::with_capacity(4).unwrap();
    world.register_component::<Position>().unwrap();
    world.register_component::<Velocity>().unwrap();
    world.register_system::<Movers>().unwrap();
    let position = world.component_signature::<Position>().unwrap();
    let velocity = world.component_signature::<Velocity>().unwrap();
    world.set_system_signature::<Movers>(position).unwrap();

    let e = world.create_entity().unwrap();
    world.add_component(e, Position { x: 0, y: 0 }).unwrap();
    world.set_system_signature::<Movers>(position | velocity).unwrap();

    // Membership is stale until the entity changes again
    assert!(world.system_entities::<Movers>().unwrap().contains(&e));
    world.add_component(e, Velocity { dx: 0, dy: 0 }).unwrap();
    assert!(world.system_entities::<Movers>().unwrap().contains(&e));
    world.remove_component::<Velocity>(e).unwrap();
    assert!(!world.system_entities::<Movers>().unwrap().contains(&e));
}

#[test]
fn random_churn_keeps_ids_unique_and_membership_exact() {
    const CAPACITY: usize = 64;

    let mut world = World::with_capacity(CAPACITY).unwrap();
    world.register_component::<Position>().unwrap();
    world.register_component::<Velocity>().unwrap();
    world.register_system::<Movers>().unwrap();
    world.register_system::<Drifters>().unwrap();
    let position = world.component_signature::<Position>().unwrap();
    let velocity = world.component_signature::<Velocity>().unwrap();
    world.set_system_signature::<Movers>(position | velocity).unwrap();
    world.set_system_signature::<Drifters>(velocity).unwrap();

    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
    let mut alive: Vec<Entity> = Vec::new();

    for step in 0..5_000 {
        match rng.below(5) {
            0 => match world.create_entity() {
                Ok(e) => {
                    assert!(!alive.contains(&e), "id {e} handed out twice");
                    alive.push(e);
                }
                Err(err) => {
                    assert_eq!(alive.len(), CAPACITY);
                    assert_eq!(err, EcsError::CapacityExhausted { capacity: CAPACITY });
                }
            },
            1 if !alive.is_empty() => {
                let e = alive.swap_remove(rng.below(alive.len()));
                world.destroy_entity(e).unwrap();
            }
            2 if !alive.is_empty() => {
                let e = alive[rng.below(alive.len())];
                let added = world.add_component(e, Position { x: step, y: step });
                assert_eq!(
                    added.is_ok(),
                    world.get_component::<Position>(e).unwrap().x == step
                );
            }
            3 if !alive.is_empty() => {
                let e = alive[rng.below(alive.len())];
                if world.has_component::<Velocity>(e) {
                    world.remove_component::<Velocity>(e).unwrap();
                } else {
                    world.add_component(e, Velocity { dx: 1, dy: step }).unwrap();
                }
            }
            _ if !alive.is_empty() => {
                let e = alive[rng.below(alive.len())];
                let _ = world.remove_component::<Position>(e);
            }
            _ => {}
        }

        let unique: HashSet<Entity> = alive.iter().copied().collect();
        assert_eq!(unique.len(), alive.len());
        assert_eq!(world.alive_count(), alive.len());

        for &e in &alive {
            let signature = world.entity_signature(e).unwrap();
            assert_eq!(
                signature.contains(position),
                world.has_component::<Position>(e)
            );
            assert_eq!(
                signature.contains(velocity),
                world.has_component::<Velocity>(e)
            );
        }
        assert_eq!(
            world.system_entities::<Movers>().unwrap(),
            &expected_members(&world, position | velocity)
        );
        assert_eq!(
            world.system_entities::<Drifters>().unwrap(),
            &expected_members(&world, velocity)
        );
    }
}
