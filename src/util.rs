use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// `0x1234…abcd` style abbreviation; short ids are returned unchanged.
pub fn short_address(id: &str) -> String {
    let chars = id.chars().collect::<Vec<_>>();
    if chars.len() <= 12 {
        return id.to_owned();
    }

    let head = chars[..6].iter().collect::<String>();
    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{head}…{tail}")
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
