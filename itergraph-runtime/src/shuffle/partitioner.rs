use std::hash::Hash;

pub fn partition_of<K: Hash + ?Sized>(id: &K, partitions: usize) -> usize {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;
    let mut h = DefaultHasher::new();
    id.hash(&mut h);
    (h.finish() as usize) % partitions.max(1)
}
