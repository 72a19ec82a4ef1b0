use indexmap::map::Entry;

use crate::prefs::PreferenceMap;
use crate::value::Value;

/// Merge `new` on top of `old`. Values in `new` take precedence.
///
/// For each key present in both maps:
///
/// ```text
/// Old value   New value   Merged value
/// ---------   ---------   ------------
/// <any>       scalar N    scalar N
/// <any>       array N     array N
/// dict O      dict N      dict O updated with dict N (one level, N wins)
/// <other>     dict N      dict N
/// ```
///
/// Keys only in `old` are kept, keys only in `new` are appended. This matches
/// `defaults write` with `-array` (not `-array-add`) and `-dict-add` (not
/// `-dict`), so a merged map round-trips through the OS store.
pub fn merge(old: PreferenceMap, new: PreferenceMap) -> PreferenceMap {
    let mut merged = old.into_dictionary();
    for (key, new_val) in new {
        match merged.entry(key) {
            Entry::Occupied(mut slot) => match (slot.get_mut(), new_val) {
                (Value::Dictionary(old_dict), Value::Dictionary(new_dict)) => {
                    old_dict.extend(new_dict);
                }
                (old_val, new_val) => *old_val = new_val,
            },
            Entry::Vacant(slot) => {
                slot.insert(new_val);
            }
        }
    }
    PreferenceMap::from_validated(merged)
}

/// Like [`merge`], where `old` may not exist yet (a domain with no stored state).
pub fn merge_optional(old: Option<PreferenceMap>, new: PreferenceMap) -> PreferenceMap {
    match old {
        Some(old) => merge(old, new),
        None => new,
    }
}
