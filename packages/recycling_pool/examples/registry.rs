//! Example that demonstrates `PoolRegistry` keeping one pool per prototype.

use recycling_pool::{CreateContext, PoolConfig, PoolRegistry};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Enemy {
    Orc,
    Goblin,
}

#[derive(Debug)]
struct Spawned {
    kind: Enemy,
    serial: usize,
}

fn main() {
    println!("=== Pool Registry Example ===");

    let mut registry = PoolRegistry::builder()
        .default_config(PoolConfig::new(4))
        .destroyer(|kind: &Enemy, spawned: Spawned| {
            println!("Destroying {kind:?} #{}", spawned.serial);
        })
        .build(|kind: &Enemy, ctx: &CreateContext| Spawned {
            kind: *kind,
            serial: ctx.pool().len(),
        });

    let orc = registry.pull(Enemy::Orc).expect("pools are created on demand");
    let goblin = registry
        .pull(Enemy::Goblin)
        .expect("pools are created on demand");

    for (kind, key) in [(Enemy::Orc, orc), (Enemy::Goblin, goblin)] {
        if let Some(spawned) = registry.get(&kind, key) {
            println!("Spawned {:?} #{} as {key}", spawned.kind, spawned.serial);
        }
    }

    registry.push(&Enemy::Orc, orc).expect("the orc is active");
    println!(
        "Orcs stored: {}, goblins active: {}",
        registry.stored_count(&Enemy::Orc),
        registry.active_count(&Enemy::Goblin)
    );

    // A scene unload: return everything, then tear all pools down.
    registry.recall_all();
    registry.destroy_all();

    println!("Registry example completed successfully!");
}
