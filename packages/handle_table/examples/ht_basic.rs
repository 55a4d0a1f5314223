//! Basic usage of the `handle_table` crate:
//!
//! * Allocating handles for per-connection state.
//! * Freeing handles and using the high-water mark to bound a scan.
//! * Allocating payload entries with a caller-owned maximum.

use std::num::NonZero;

use handle_table::HandleTable;

fn main() {
    let mut connections = HandleTable::<String>::builder()
        .chunk_size(NonZero::new(4).unwrap())
        .build();

    // Each connection gets the lowest free handle.
    let alice = connections.insert("alice:4433".to_string()).unwrap();
    let bob = connections.insert("bob:4433".to_string()).unwrap();
    let carol = connections.insert("carol:4433".to_string()).unwrap();

    println!(
        "Table holds {} connections with a capacity of {}",
        connections.len(),
        connections.capacity()
    );

    // Freeing reports one past the greatest handle still in use.
    let mark = connections.free(bob);
    println!("Freed handle {bob}, live handles are now below {mark}");

    for handle in 0..mark {
        match connections.get(handle) {
            Some(peer) => println!("  {handle}: {peer}"),
            None => println!("  {handle}: (free)"),
        }
    }

    // The hole left by bob is filled first.
    let dave = connections.insert("dave:4433".to_string()).unwrap();
    println!("New connection got handle {dave}");

    connections.free(alice);
    connections.free(carol);
    let mark = connections.free(dave);
    println!(
        "All freed, mark is {mark} and storage allocated: {}",
        connections.is_allocated()
    );

    // Payload entries: a zeroed buffer per handle, plus a maximum the caller keeps for sizing
    // its own arrays.
    let mut buffers = HandleTable::<Vec<u8>>::new();
    let mut max_seen = 0;

    for _ in 0..3 {
        let handle = buffers.allocate_entry(&mut max_seen, 256).unwrap();
        println!("Allocated buffer {handle}, max seen is now {max_seen}");
    }
}
