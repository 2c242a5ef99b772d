use glam::DVec3;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    PowerUp,
    Item,
}

/// EffectType is the effect a collectible applies when it is used. Speed, Invincibility and
/// Attack belong to power-ups, Catch, Heal and Boost to items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectType {
    Speed,
    Invincibility,
    Attack,
    Catch,
    Heal,
    Boost,
}

pub const POWER_UPS: [EffectType; 3] = [
    EffectType::Speed,
    EffectType::Invincibility,
    EffectType::Attack,
];

pub const ITEMS: [EffectType; 3] = [EffectType::Catch, EffectType::Heal, EffectType::Boost];

impl EffectType {
    pub fn kind(&self) -> CollectibleKind {
        match self {
            EffectType::Speed | EffectType::Invincibility | EffectType::Attack => {
                CollectibleKind::PowerUp
            }
            EffectType::Catch | EffectType::Heal | EffectType::Boost => CollectibleKind::Item,
        }
    }

    /// label returns the name shown to the player.
    pub fn label(&self) -> &'static str {
        match self {
            EffectType::Speed => "Mushroom",
            EffectType::Invincibility => "Star",
            EffectType::Attack => "Thunder",
            EffectType::Catch => "Pokeball",
            EffectType::Heal => "Potion",
            EffectType::Boost => "Berry",
        }
    }
}

impl CollectibleKind {
    pub fn effect_types(&self) -> &'static [EffectType] {
        match self {
            CollectibleKind::PowerUp => &POWER_UPS,
            CollectibleKind::Item => &ITEMS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleState {
    Available,
    Consumed,
}

#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub effect_type: EffectType,
    pub position: DVec3,
    pub state: CollectibleState,
}

impl Collectible {
    pub fn is_available(&self) -> bool {
        self.state == CollectibleState::Available
    }
}

/// CollectibleRegistry holds the collectibles of one kind. Effect types are rolled once on
/// creation and kept across resets.
#[derive(Debug, Clone)]
pub struct CollectibleRegistry {
    collectibles: Vec<Collectible>,
}

impl CollectibleRegistry {
    pub fn new<R: Rng + ?Sized>(
        kind: CollectibleKind,
        positions: &[DVec3],
        id_offset: u32,
        rng: &mut R,
    ) -> CollectibleRegistry {
        let effect_types: Vec<EffectType> = positions
            .iter()
            .filter_map(|_| kind.effect_types().choose(&mut *rng).copied())
            .collect();

        CollectibleRegistry::with_effect_types(kind, positions, &effect_types, id_offset)
    }

    /// with_effect_types creates a registry with fixed effect types. Positions without a
    /// matching effect type of the registry's kind are skipped.
    pub fn with_effect_types(
        kind: CollectibleKind,
        positions: &[DVec3],
        effect_types: &[EffectType],
        id_offset: u32,
    ) -> CollectibleRegistry {
        let collectibles = positions
            .iter()
            .zip(effect_types)
            .filter(|(_, effect_type)| effect_type.kind() == kind)
            .enumerate()
            .map(|(idx, (&position, &effect_type))| Collectible {
                id: id_offset + idx as u32,
                kind,
                effect_type,
                position,
                state: CollectibleState::Available,
            })
            .collect();

        CollectibleRegistry { collectibles }
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    /// check_proximity consumes every available collectible closer than `radius` to `position`
    /// and returns their indices in ascending order.
    pub fn check_proximity(&mut self, position: DVec3, radius: f64) -> Vec<usize> {
        let mut picked = vec![];

        for (idx, collectible) in self.collectibles.iter_mut().enumerate() {
            if collectible.is_available() && collectible.position.distance(position) < radius {
                collectible.state = CollectibleState::Consumed;
                picked.push(idx);
            }
        }

        picked
    }

    /// catch_within consumes every available collectible closer than `radius` without handing it
    /// to anyone and returns the number of consumed collectibles.
    pub fn catch_within(&mut self, position: DVec3, radius: f64) -> usize {
        self.check_proximity(position, radius).len()
    }

    pub fn get(&self, idx: usize) -> Option<&Collectible> {
        self.collectibles.get(idx)
    }

    pub fn reset(&mut self) {
        self.collectibles
            .iter_mut()
            .for_each(|collectible| collectible.state = CollectibleState::Available);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corners(offset: f64) -> Vec<DVec3> {
        vec![
            DVec3::new(offset, 0.5, offset),
            DVec3::new(-offset, 0.5, offset),
            DVec3::new(offset, 0.5, -offset),
            DVec3::new(-offset, 0.5, -offset),
        ]
    }

    #[test]
    fn effect_types_match_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        let power_ups = CollectibleRegistry::new(CollectibleKind::PowerUp, &corners(15.0), 0, &mut rng);
        let items = CollectibleRegistry::new(CollectibleKind::Item, &corners(10.0), 4, &mut rng);

        assert!(power_ups
            .collectibles()
            .iter()
            .all(|c| c.effect_type.kind() == CollectibleKind::PowerUp));
        assert!(items
            .collectibles()
            .iter()
            .all(|c| c.effect_type.kind() == CollectibleKind::Item));
        assert_eq!(items.collectibles()[0].id, 4);
    }

    #[test]
    fn pickup_consumes_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut registry = CollectibleRegistry::new(CollectibleKind::Item, &corners(10.0), 0, &mut rng);
        let position = DVec3::new(10.5, 0.5, 9.5);

        assert_eq!(registry.check_proximity(position, 2.0), vec![0]);
        assert!(registry.check_proximity(position, 2.0).is_empty());
        assert_eq!(registry.collectibles()[0].state, CollectibleState::Consumed);
    }

    #[test]
    fn catch_consumes_everything_in_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let positions = vec![
            DVec3::new(1.0, 0.5, 0.0),
            DVec3::new(0.0, 0.5, 4.0),
            DVec3::new(0.0, 0.5, 6.0),
        ];
        let mut registry = CollectibleRegistry::new(CollectibleKind::Item, &positions, 0, &mut rng);

        assert_eq!(registry.catch_within(DVec3::new(0.0, 0.5, 0.0), 5.0), 2);
        assert!(registry.collectibles()[2].is_available());
    }

    #[test]
    fn reset_keeps_effect_types() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut registry =
            CollectibleRegistry::new(CollectibleKind::PowerUp, &corners(15.0), 0, &mut rng);
        let types: Vec<EffectType> = registry.collectibles().iter().map(|c| c.effect_type).collect();

        registry.catch_within(DVec3::ZERO, 100.0);
        registry.reset();

        assert!(registry.collectibles().iter().all(|c| c.is_available()));
        let types_after: Vec<EffectType> =
            registry.collectibles().iter().map(|c| c.effect_type).collect();
        assert_eq!(types, types_after);
    }

    #[test]
    fn fixed_effect_types_skip_foreign_kinds() {
        let registry = CollectibleRegistry::with_effect_types(
            CollectibleKind::Item,
            &corners(10.0),
            &[EffectType::Boost, EffectType::Speed, EffectType::Heal],
            0,
        );

        let types: Vec<EffectType> = registry.collectibles().iter().map(|c| c.effect_type).collect();
        assert_eq!(types, vec![EffectType::Boost, EffectType::Heal]);
        assert_eq!(registry.collectibles()[1].id, 1);
        assert_eq!(registry.collectibles()[1].position, DVec3::new(10.0, 0.5, -10.0));
    }

    #[test]
    fn empty_registry_is_noop() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut registry = CollectibleRegistry::new(CollectibleKind::Item, &[], 0, &mut rng);
        assert!(registry.check_proximity(DVec3::ZERO, 2.0).is_empty());
    }
}
