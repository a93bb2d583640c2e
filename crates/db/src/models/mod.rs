pub mod card;
pub mod collection;
pub mod deck;
pub mod folder;
pub mod recommendation;
pub mod tag;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicit null".
///
/// Combined with `#[serde(default)]`, an absent field stays `None` and a
/// present field (including JSON `null`) becomes `Some(inner)`, so updates
/// can clear nullable columns without clobbering omitted ones.
pub fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::collection::UpdateCollectionEntry;

    #[test]
    fn absent_field_is_distinct_from_explicit_null() {
        let absent: UpdateCollectionEntry = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.folder_id, None);

        let cleared: UpdateCollectionEntry =
            serde_json::from_str(r#"{"folderId": null}"#).unwrap();
        assert_eq!(cleared.folder_id, Some(None));

        let set: UpdateCollectionEntry = serde_json::from_str(r#"{"folderId": 7}"#).unwrap();
        assert_eq!(set.folder_id, Some(Some(7)));
    }
}
