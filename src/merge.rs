// Relationship merging helpers
// Used to seed selection lists (dropdowns, multi-selects) with the entities an
// edited record already points at, without duplicating what the server returned.

use crate::models::{EntityId, Identified};

/// Compare two optional references by key.
///
/// Two references are the same iff both are absent, or both are present and
/// carry equal keys.
pub fn same_by<T, K, F>(a: Option<&T>, b: Option<&T>, key: F) -> bool
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    match (a, b) {
        (Some(a), Some(b)) => key(a) == key(b),
        (None, None) => true,
        _ => false,
    }
}

/// Keyed set union.
///
/// Every present candidate whose key is not already in `collection` (or was not
/// already taken earlier in the same call) is kept; kept candidates come first,
/// in order, followed by the existing collection.
pub fn add_if_missing_by<T, K, F, I>(collection: Vec<T>, candidates: I, key: F) -> Vec<T>
where
    K: PartialEq,
    F: Fn(&T) -> K,
    I: IntoIterator<Item = Option<T>>,
{
    let candidates: Vec<T> = candidates.into_iter().flatten().collect();
    if candidates.is_empty() {
        return collection;
    }

    let mut seen: Vec<K> = collection.iter().map(&key).collect();
    let mut merged = Vec::with_capacity(candidates.len() + collection.len());
    for candidate in candidates {
        let candidate_key = key(&candidate);
        if seen.contains(&candidate_key) {
            continue;
        }
        seen.push(candidate_key);
        merged.push(candidate);
    }
    merged.extend(collection);
    merged
}

/// `same_by` keyed on the backend id
pub fn same_entity<T: Identified>(a: Option<&T>, b: Option<&T>) -> bool {
    same_by(a, b, |e: &T| e.id())
}

/// `add_if_missing_by` keyed on the backend id
pub fn add_to_collection_if_missing<T, I>(collection: Vec<T>, candidates: I) -> Vec<T>
where
    T: Identified,
    I: IntoIterator<Item = Option<T>>,
{
    add_if_missing_by(collection, candidates, |e: &T| e.id())
}

/// Collect the ids of a collection, skipping entities that were never persisted
pub fn ids_of<T: Identified>(collection: &[T]) -> Vec<EntityId> {
    collection.iter().filter_map(Identified::id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, UserRef};

    fn profile(id: i64) -> Profile {
        Profile { id: Some(id), ..Default::default() }
    }

    #[test]
    fn test_same_entity() {
        let a = profile(123);
        let b = profile(123);
        let c = profile(456);

        assert!(same_entity::<Profile>(None, None));
        assert!(same_entity(Some(&a), Some(&b)));
        assert!(!same_entity(Some(&a), Some(&c)));
        assert!(!same_entity(Some(&a), None));
        assert!(!same_entity(None, Some(&a)));
    }

    #[test]
    fn test_add_missing_candidate_goes_first() {
        let collection = vec![profile(1), profile(2)];
        let merged = add_to_collection_if_missing(collection, [Some(profile(3))]);
        assert_eq!(ids_of(&merged), vec![3, 1, 2]);
    }

    #[test]
    fn test_existing_and_absent_candidates_are_skipped() {
        let collection = vec![profile(1), profile(2)];
        let merged = add_to_collection_if_missing(collection, [None, Some(profile(2)), None]);
        assert_eq!(ids_of(&merged), vec![1, 2]);
    }

    #[test]
    fn test_duplicate_candidates_within_one_call() {
        let merged = add_to_collection_if_missing(
            Vec::new(),
            [Some(profile(5)), Some(profile(6)), Some(profile(5))],
        );
        assert_eq!(ids_of(&merged), vec![5, 6]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let collection = vec![profile(1)];
        let once = add_to_collection_if_missing(collection, [Some(profile(9))]);
        let twice = add_to_collection_if_missing(once.clone(), [Some(profile(9))]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_key() {
        let users = vec![UserRef { id: Some(1), login: Some("admin".into()) }];
        let merged = add_if_missing_by(
            users,
            [Some(UserRef { id: Some(2), login: Some("admin".into()) })],
            |u: &UserRef| u.login.clone(),
        );
        assert_eq!(merged.len(), 1);
        assert!(same_by(Some(&merged[0]), Some(&merged[0]), |u: &UserRef| u.id));
    }
}
