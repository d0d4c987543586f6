//! Collision-free worktree name generation
//!
//! Names come from fixed word pools so they stay short and memorable. The
//! pool is shuffled and the first unused candidate wins; once a pool is
//! exhausted we fall back to numbered variants (`obsidian-2`, `obsidian-3`,
//! ...). The random source is injected so tests can seed it.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::NamingScheme;

pub const MINERALS: &[&str] = &[
    "obsidian", "quartz", "jasper", "topaz", "onyx", "opal", "amber", "cobalt", "flint", "slate",
    "basalt", "granite", "pyrite", "agate", "beryl", "garnet", "jade", "lapis", "mica", "ruby",
    "zinc", "iron", "copper", "nickel", "chrome", "titan", "bronze", "carbon", "marble", "pumice",
    "shale", "gneiss", "schist", "galena", "zircon", "spinel", "peridot", "feldspar", "calcite",
    "dolomite", "magnetite", "hematite", "malachite", "turquoise", "fluorite", "celestite",
    "rhodonite", "kyanite", "bismuth", "tungsten",
];

pub const CITIES: &[&str] = &[
    "osaka", "porto", "bruges", "kyoto", "zurich", "cusco", "fez", "lagos", "busan", "bergen",
    "tallinn", "dubrovnik", "granada", "hanoi", "cartagena", "halifax", "darwin", "hobart",
    "galway", "sintra", "lucerne", "salzburg", "seville", "valencia", "ghent", "utrecht",
    "krakow", "gdansk", "split", "kotor", "plovdiv", "tbilisi", "yerevan", "muscat", "doha",
    "lima", "quito", "bogota", "havana", "nassau", "kingston", "suva", "apia", "nara", "malmo",
    "turku", "bath",
];

pub const ADJECTIVES: &[&str] = &[
    "swift", "bold", "keen", "wild", "calm", "dark", "bright", "sharp", "deep", "warm", "cold",
    "raw", "red", "pale", "rich", "prime", "rare", "pure", "clear", "stark", "vast", "twin",
    "lone", "true", "wry",
];

fn pool(scheme: NamingScheme) -> Vec<String> {
    match scheme {
        NamingScheme::Minerals => MINERALS.iter().map(|s| s.to_string()).collect(),
        NamingScheme::Cities => CITIES.iter().map(|s| s.to_string()).collect(),
        NamingScheme::Compound => ADJECTIVES
            .iter()
            .flat_map(|adj| MINERALS.iter().map(move |noun| format!("{adj}-{noun}")))
            .collect(),
    }
}

/// Generate a name not present in `existing`.
///
/// Numeric suffixes start at 2 so the first collision of "opal" becomes
/// "opal-2", never "opal-1".
pub fn generate_name<R: Rng + ?Sized>(
    scheme: NamingScheme,
    existing: &HashSet<String>,
    rng: &mut R,
) -> Result<String> {
    let mut candidates = pool(scheme);
    candidates.shuffle(rng);

    for name in &candidates {
        if !existing.contains(name) {
            return Ok(name.clone());
        }
    }

    // Pool exhausted: numbered variants of a random base.
    let mut bases = pool(scheme);
    bases.shuffle(rng);
    let base = &bases[0];
    for i in 2..100 {
        let candidate = format!("{base}-{i}");
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::NameSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_from_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = generate_name(NamingScheme::Minerals, &HashSet::new(), &mut rng).unwrap();
        assert!(MINERALS.contains(&name.as_str()));
    }

    #[test]
    fn never_returns_excluded_name() {
        let mut rng = StdRng::seed_from_u64(7);
        let existing: HashSet<String> = MINERALS[..40].iter().map(|s| s.to_string()).collect();
        for _ in 0..50 {
            let name = generate_name(NamingScheme::Minerals, &existing, &mut rng).unwrap();
            assert!(!existing.contains(&name));
        }
    }

    #[test]
    fn compound_joins_adjective_and_mineral() {
        let mut rng = StdRng::seed_from_u64(1);
        let name = generate_name(NamingScheme::Compound, &HashSet::new(), &mut rng).unwrap();
        let (adj, noun) = name.split_once('-').expect("compound names are hyphenated");
        assert!(ADJECTIVES.contains(&adj));
        assert!(MINERALS.contains(&noun));
    }

    #[test]
    fn exhausted_pool_falls_back_to_numbered_suffix() {
        let mut rng = StdRng::seed_from_u64(3);
        let existing: HashSet<String> = CITIES.iter().map(|s| s.to_string()).collect();
        let name = generate_name(NamingScheme::Cities, &existing, &mut rng).unwrap();
        let (base, n) = name.rsplit_once('-').expect("fallback names carry a suffix");
        assert!(CITIES.contains(&base));
        assert!(n.parse::<u32>().unwrap() >= 2);
    }

    #[test]
    fn fallback_skips_used_suffixes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut existing: HashSet<String> = CITIES.iter().map(|s| s.to_string()).collect();
        for city in CITIES {
            existing.insert(format!("{city}-2"));
        }
        let name = generate_name(NamingScheme::Cities, &existing, &mut rng).unwrap();
        assert!(!existing.contains(&name));
        assert!(name.ends_with("-3"));
    }

    #[test]
    fn deterministic_under_a_fixed_seed() {
        let a = generate_name(
            NamingScheme::Minerals,
            &HashSet::new(),
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        let b = generate_name(
            NamingScheme::Minerals,
            &HashSet::new(),
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        assert_eq!(a, b);
    }
}
