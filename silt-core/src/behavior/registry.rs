//! Block rule registry for looking up rules by block id or name.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use silt_utils::BlockId;

use super::PhysicsBlock;
use super::blocks::{
    ACTIVE_WATER_BLOCK, C235_BLOCK, FIREWORK_BLOCK, GRAVEL_BLOCK, LAVA_BLOCK, ROCKET_BLOCK,
    SAND_BLOCK, SHARK_BLOCK, SNOW_BLOCK, SPONGE_AGENT_BLOCK, SPONGE_BLOCK, WATER_BLOCK,
};

/// Rules indexed by block id, plus a name index.
pub struct BlockRegistry {
    by_id: [Option<&'static dyn PhysicsBlock>; 256],
    by_name: FxHashMap<String, &'static dyn PhysicsBlock>,
}

impl BlockRegistry {
    /// Creates a registry with every built-in rule assigned.
    fn new() -> Self {
        let mut registry = Self {
            by_id: [None; 256],
            by_name: FxHashMap::default(),
        };

        registry.register(&SAND_BLOCK);
        registry.register(&GRAVEL_BLOCK);
        registry.register(&SNOW_BLOCK);
        registry.register(&WATER_BLOCK);
        registry.register(&ACTIVE_WATER_BLOCK);
        registry.register(&LAVA_BLOCK);
        registry.register(&SPONGE_BLOCK);
        registry.register(&SPONGE_AGENT_BLOCK);
        registry.register(&C235_BLOCK);
        registry.register(&FIREWORK_BLOCK);
        registry.register(&ROCKET_BLOCK);
        registry.register(&SHARK_BLOCK);

        registry
    }

    fn register(&mut self, block: &'static dyn PhysicsBlock) {
        let slot = &mut self.by_id[usize::from(block.id())];
        if let Some(existing) = slot {
            log::warn!(
                "Block id {} is registered twice ({} and {})",
                block.id(),
                existing.name(),
                block.name()
            );
        }
        *slot = Some(block);
        self.by_name.insert(block.name().to_ascii_lowercase(), block);
    }

    /// Gets the rule for a block id.
    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<&'static dyn PhysicsBlock> {
        self.by_id[usize::from(id)]
    }

    /// Gets a rule by name, ignoring case.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&'static dyn PhysicsBlock> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.iter().flatten().count()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static REGISTRY: OnceLock<BlockRegistry> = OnceLock::new();

/// Builds the global registry. Later calls are no-ops.
pub fn init_blocks() -> &'static BlockRegistry {
    REGISTRY.get_or_init(|| {
        let registry = BlockRegistry::new();
        log::debug!("Registered {} physics blocks", registry.len());
        registry
    })
}

/// Gets the global registry, building it on first use.
#[must_use]
pub fn blocks() -> &'static BlockRegistry {
    init_blocks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::ids;

    #[test]
    fn test_lookup_by_id_and_name() {
        let registry = blocks();
        let sand = registry.get(ids::SAND).expect("sand is registered");
        assert_eq!(sand.name(), "sand");
        assert!(registry.get(ids::STONE).is_none());
        assert!(registry.get(ids::AIR).is_none());

        let by_name = registry.by_name("C235").expect("c235 by name");
        assert_eq!(by_name.id(), ids::C235);
        assert!(registry.by_name("bedrock").is_none());
    }

    #[test]
    fn test_physics_blocks_fall_back_to_classic_ids() {
        let registry = blocks();
        for id in [
            ids::ACTIVE_WATER,
            ids::SPONGE_AGENT,
            ids::C235,
            ids::FIREWORK,
            ids::ROCKET,
            ids::SHARK,
            ids::SNOW,
        ] {
            let block = registry.get(id).expect("registered");
            assert!(block.vanilla_fallback() < ids::ACTIVE_WATER, "{}", block.name());
        }
        assert_eq!(registry.get(ids::SAND).map(|b| b.vanilla_fallback()), Some(ids::SAND));
    }

    #[test]
    fn test_init_is_idempotent() {
        assert!(std::ptr::eq(init_blocks(), init_blocks()));
        assert_eq!(blocks().len(), 12);
    }
}
