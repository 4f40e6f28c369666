use docket_domain::Entity;
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    collection.push(val.clone());
}

pub fn find<I: PartialEq, T: Clone + Entity<I>>(val_id: &I, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = collection.lock().unwrap();
    collection.iter().find(|item| item.id() == *val_id).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    let collection = collection.lock().unwrap();
    let mut items = Vec::new();
    for item in collection.iter() {
        if compare(item) {
            items.push(item.clone());
        }
    }
    items
}

pub fn count_by<T, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> usize {
    let collection = collection.lock().unwrap();
    collection.iter().filter(|item| compare(item)).count()
}

/// Inserts `val` unless some item already matches `conflicts`.
/// Returns whether the value was inserted.
pub fn insert_unless<T: Clone, F: FnMut(&T) -> bool>(
    val: &T,
    collection: &Mutex<Vec<T>>,
    mut conflicts: F,
) -> bool {
    let mut collection = collection.lock().unwrap();
    if collection.iter().any(|item| conflicts(item)) {
        return false;
    }
    collection.push(val.clone());
    true
}
