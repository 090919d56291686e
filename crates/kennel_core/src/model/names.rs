//! Default-name pools for newly created records.
//!
//! The application picks names at random; tests use [`CyclingNames`] so
//! expectations stay deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

pub const PERSON_NAMES: [&str; 10] = [
    "Aoife", "Caoimhe", "Saoirse", "Ciara", "Niamh", "Conor", "Seán", "Oisín", "Patrick", "Cian",
];

pub const DOG_NAMES: [&str; 10] = [
    "Bella", "Charlie", "Luna", "Lucy", "Max", "Bailey", "Cooper", "Daisy", "Sadie", "Molly",
];

/// Supplies default names for records created by a gesture.
pub trait NameSource: Send + Sync {
    fn person_name(&self) -> String;
    fn dog_name(&self) -> String;
}

/// Picks uniformly-ish from the pools using v4 UUID entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNames;

impl NameSource for RandomNames {
    fn person_name(&self) -> String {
        pick_random(&PERSON_NAMES).to_string()
    }

    fn dog_name(&self) -> String {
        pick_random(&DOG_NAMES).to_string()
    }
}

fn pick_random<'a>(pool: &[&'a str]) -> &'a str {
    let entropy = Uuid::new_v4().as_u128();
    pool[(entropy % pool.len() as u128) as usize]
}

/// Walks the pools in order, wrapping around. Independent cursors per pool.
#[derive(Debug, Default)]
pub struct CyclingNames {
    next_person: AtomicUsize,
    next_dog: AtomicUsize,
}

impl CyclingNames {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameSource for CyclingNames {
    fn person_name(&self) -> String {
        let index = self.next_person.fetch_add(1, Ordering::Relaxed);
        PERSON_NAMES[index % PERSON_NAMES.len()].to_string()
    }

    fn dog_name(&self) -> String {
        let index = self.next_dog.fetch_add(1, Ordering::Relaxed);
        DOG_NAMES[index % DOG_NAMES.len()].to_string()
    }
}
