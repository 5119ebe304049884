//! Display name generation
//!
//! A hero gets a generated handle on their first successful score. The handle
//! is assigned once and never regenerated for the same identity.

use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "agile", "brave", "clever", "daring", "eager", "fearless", "gentle",
    "humble", "jolly", "keen", "lucky", "mighty", "nimble", "patient",
    "quick", "rapid", "sly", "tidy", "vivid", "witty",
];

const ANIMALS: &[&str] = &[
    "badger", "civet", "dolphin", "falcon", "gecko", "heron", "ibex",
    "jackal", "kestrel", "lemur", "marmot", "narwhal", "otter", "pangolin",
    "quokka", "raven", "stoat", "tapir", "viper", "wombat",
];

/// Generate a random "adjective animal" display name.
pub fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("brave");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("otter");
    format!("{} {}", adjective, animal)
}
