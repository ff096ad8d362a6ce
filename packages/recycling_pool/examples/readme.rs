//! Example that demonstrates the usage shown in the README.md file.
//!
//! This shows how to use `RecyclingPool` to reuse buffers instead of allocating new ones.

use recycling_pool::{AccessMode, Key, LoadingMode, Poolable, RecyclingPool};

#[derive(Debug, Default)]
struct Buffer {
    bytes: Vec<u8>,
}

impl Poolable for Buffer {
    fn on_pushed(&mut self, _key: Key) {
        // Returned buffers keep their capacity but lose their contents.
        self.bytes.clear();
    }
}

fn main() {
    println!("=== Recycling Pool README Example ===");

    let mut pool = RecyclingPool::builder()
        .size(2)
        .access_mode(AccessMode::LastIn)
        .loading_mode(LoadingMode::Eager)
        .factory(|_| Buffer {
            bytes: Vec::with_capacity(4096),
        })
        .notify_poolable()
        .build()
        .expect("the factory is set");

    // Pulling an item gives you a key that you can later use to access the item.
    let key = pool.pull();
    pool.get_mut(key)
        .expect("pulled items are owned by the pool")
        .bytes
        .extend_from_slice(b"hello");
    println!("Pool owns {} items, {} in use", pool.len(), pool.active_len());

    // Pushing the key back makes the item available for reuse.
    pool.push(key).expect("the item is active");

    // With last-in-first-out access the most recently returned buffer comes back first.
    let again = pool.pull();
    assert_eq!(again, key);
    println!(
        "Reused buffer is empty again: {}",
        pool.get(again).is_some_and(|buffer| buffer.bytes.is_empty())
    );

    // Pushing the same key twice is rejected.
    pool.push(again).expect("the item is active");
    if let Err(error) = pool.push(again) {
        println!("Second push rejected: {error}");
    }

    println!("README example completed successfully!");
}
