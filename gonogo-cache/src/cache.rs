use lazy_static::lazy_static;
use std::sync::RwLock;
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref TEXT_INTERNER: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Intern a label and return its dense id. Ids are stable for the process
/// lifetime, so the renderer can key pixmap caches on them.
pub fn intern_text(s: &str) -> usize {
    let atom = Atom::from(s);
    {
        let v = TEXT_INTERNER.read().unwrap();
        if let Some(idx) = v.iter().position(|a| *a == atom) {
            return idx;
        }
    }
    let mut v = TEXT_INTERNER.write().unwrap();
    // Re-check: another thread may have interned between the locks.
    match v.iter().position(|a| *a == atom) {
        Some(idx) => idx,
        None => {
            v.push(atom);
            v.len() - 1
        }
    }
}

/// Current count of unique texts
pub fn text_count() -> usize {
    TEXT_INTERNER.read().unwrap().len()
}

pub fn get_text(id: usize) -> String {
    TEXT_INTERNER.read().unwrap()[id].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = intern_text("gonogo-cache test label");
        let b = intern_text("gonogo-cache test label");
        assert_eq!(a, b);
        assert_eq!(get_text(a), "gonogo-cache test label");
    }

    #[test]
    fn distinct_labels_get_distinct_ids() {
        let a = intern_text("gonogo-cache label one");
        let b = intern_text("gonogo-cache label two");
        assert_ne!(a, b);
        assert!(text_count() >= 2);
    }
}
