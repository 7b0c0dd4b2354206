//! Logical-asset grouping for streamed files.

use crate::domain::constants::{ASSET_EXTENSIONS, HI_SUFFIXES};

/// Returns the logical asset name a file belongs to, or `None` when the file
/// is not subject to grouping (unrecognized extension, or nothing left after
/// stripping). High-detail markers (`_hi`, `+hi`) ahead of a recognized
/// extension map to the same group as their base variant.
pub fn logical_asset_name(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if !ASSET_EXTENSIONS.contains(&ext) {
        return None;
    }
    let mut name = stem;
    for suffix in HI_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
            break;
        }
    }
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::logical_asset_name;

    #[test]
    fn variants_share_one_group() {
        assert_eq!(logical_asset_name("car_hi.yft").as_deref(), Some("car"));
        assert_eq!(logical_asset_name("car+hi.yft").as_deref(), Some("car"));
        assert_eq!(logical_asset_name("car.yft").as_deref(), Some("car"));
        assert_eq!(logical_asset_name("car.ytd").as_deref(), Some("car"));
        assert_eq!(logical_asset_name("car_hi.ytd").as_deref(), Some("car"));
    }

    #[test]
    fn unrecognized_extensions_are_not_grouped() {
        assert_eq!(logical_asset_name("readme.txt"), None);
        assert_eq!(logical_asset_name("car"), None);
        assert_eq!(logical_asset_name("car.yft.bak"), None);
    }

    #[test]
    fn degenerate_names_are_not_grouped() {
        assert_eq!(logical_asset_name("_hi.yft"), None);
        assert_eq!(logical_asset_name(".yft"), None);
    }

    #[test]
    fn hi_marker_only_strips_before_the_extension() {
        assert_eq!(
            logical_asset_name("car_hi_wheels.yft").as_deref(),
            Some("car_hi_wheels")
        );
    }
}
