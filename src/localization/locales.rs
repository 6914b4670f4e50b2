//! Locale set builder: which locale variants of a page family are shown, in
//! which order.

use crate::model::{Locale, Page};
use crate::store::PermissionChecker;
use std::collections::{HashMap, HashSet};

/// Pages taking part in localization: not soft-deleted and outside the
/// administrative subtree.
pub(crate) fn localizable_pages(all: &[Page], admin_tab_id: Option<i32>) -> Vec<Page> {
    let by_id: HashMap<i32, &Page> = all.iter().map(|p| (p.tab_id, p)).collect();
    all.iter()
        .filter(|p| !p.is_deleted)
        .filter(|p| match admin_tab_id {
            Some(admin) => !in_subtree(p, admin, &by_id),
            None => true,
        })
        .cloned()
        .collect()
}

fn in_subtree(page: &Page, root: i32, by_id: &HashMap<i32, &Page>) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(page);
    while let Some(p) = current {
        if p.tab_id == root {
            return true;
        }
        if !seen.insert(p.tab_id) {
            break;
        }
        current = p.parent_id.and_then(|id| by_id.get(&id).copied());
    }
    false
}

/// Every variant of `page`'s family, the default-language member first.
pub(crate) fn family_of(page: &Page, pages: &[Page]) -> Vec<Page> {
    let family_id = page.family_id();
    let mut family: Vec<Page> = pages
        .iter()
        .filter(|p| p.unique_id == family_id || p.default_language_guid == Some(family_id))
        .cloned()
        .collect();
    family.sort_by_key(|p| p.default_language_guid.is_some());
    family
}

/// Ordered locales to show for a family.
///
/// Locales of variants the caller cannot view are left out silently.
pub(crate) fn build_locale_set(
    family: &[Page],
    portal_locales: &[Locale],
    default_locale: &Locale,
    permissions: &dyn PermissionChecker,
) -> Vec<Locale> {
    if portal_locales.is_empty() {
        return vec![Locale::neutral()];
    }

    if let [only] = family {
        if only.is_neutral() {
            return vec![Locale::neutral()];
        }
        if only.culture_code != default_locale.culture_code {
            return vec![Locale::new(only.culture_code.as_str())];
        }
    }

    let mut locales = vec![default_locale.clone()];

    let Some(default_page) = family.iter().find(|p| p.is_default_language()) else {
        return locales;
    };
    let family_id = default_page.unique_id;

    for locale in portal_locales {
        if locale.culture_code == default_locale.culture_code {
            continue;
        }
        let variant = family.iter().find(|p| {
            p.default_language_guid == Some(family_id) && p.culture_code == locale.culture_code
        });
        if let Some(variant) = variant {
            if permissions.can_view_page(variant) {
                locales.push(locale.clone());
            }
        }
    }

    locales
}

/// True when some enabled portal locale has no variant in the family.
pub(crate) fn has_missing_languages(family: &[Page], portal_locales: &[Locale]) -> bool {
    if portal_locales.is_empty() || family.iter().all(Page::is_neutral) {
        return false;
    }
    portal_locales
        .iter()
        .any(|locale| !family.iter().any(|p| p.culture_code == locale.culture_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Module;
    use proptest::prelude::*;
    use uuid::Uuid;

    struct Allow(HashSet<i32>);

    impl PermissionChecker for Allow {
        fn can_view_page(&self, page: &Page) -> bool {
            !self.0.contains(&page.tab_id)
        }
        fn can_admin_page(&self, _page: &Page) -> bool {
            true
        }
        fn can_view_module(&self, _module: &Module) -> bool {
            true
        }
        fn can_admin_module(&self, _module: &Module) -> bool {
            true
        }
    }

    fn allow_all() -> Allow {
        Allow(HashSet::new())
    }

    fn page(tab_id: i32, culture: &str, default: Option<Uuid>) -> Page {
        Page {
            tab_id,
            parent_id: None,
            name: format!("Page {}", tab_id),
            title: String::new(),
            description: String::new(),
            tab_path: format!("//Page{}", tab_id),
            culture_code: culture.to_string(),
            unique_id: Uuid::new_v4(),
            default_language_guid: default,
            is_translated: true,
            is_published: true,
            tab_order: tab_id,
            is_deleted: false,
        }
    }

    fn codes(locales: &[Locale]) -> Vec<&str> {
        locales.iter().map(|l| l.culture_code.as_str()).collect()
    }

    fn portal() -> Vec<Locale> {
        vec![Locale::new("en-US"), Locale::new("fr-FR"), Locale::new("de-DE")]
    }

    /// en-US default with fr-FR and de-DE variants
    fn family() -> Vec<Page> {
        let default = page(1, "en-US", None);
        let id = default.unique_id;
        vec![default, page(2, "fr-FR", Some(id)), page(3, "de-DE", Some(id))]
    }

    // ==================== Filtering Tests ====================

    #[test]
    fn test_localizable_pages_skips_deleted_and_admin_subtree() {
        let mut admin = page(10, "", None);
        admin.parent_id = None;
        let mut admin_child = page(11, "", None);
        admin_child.parent_id = Some(10);
        let mut admin_grandchild = page(12, "", None);
        admin_grandchild.parent_id = Some(11);
        let mut deleted = page(13, "", None);
        deleted.is_deleted = true;
        let normal = page(14, "", None);

        let all = vec![admin, admin_child, admin_grandchild, deleted, normal];
        let kept: Vec<i32> = localizable_pages(&all, Some(10)).iter().map(|p| p.tab_id).collect();

        assert_eq!(kept, vec![14]);
    }

    #[test]
    fn test_localizable_pages_survives_parent_cycle() {
        let mut a = page(1, "", None);
        a.parent_id = Some(2);
        let mut b = page(2, "", None);
        b.parent_id = Some(1);

        assert_eq!(localizable_pages(&[a, b], Some(99)).len(), 2);
    }

    #[test]
    fn test_family_of_puts_default_first() {
        let mut pages = family();
        pages.reverse();
        pages.push(page(9, "en-US", None));

        let family = family_of(&pages[0], &pages);

        assert_eq!(family.len(), 3);
        assert_eq!(family[0].tab_id, 1);
    }

    // ==================== Locale Set Tests ====================

    #[test]
    fn test_no_portal_locales_gives_neutral_entry() {
        let locales = build_locale_set(&family(), &[], &Locale::new("en-US"), &allow_all());
        assert_eq!(locales, vec![Locale::neutral()]);
    }

    #[test]
    fn test_single_neutral_page_gives_neutral_entry() {
        let family = vec![page(1, "", None)];
        let locales = build_locale_set(&family, &portal(), &Locale::new("en-US"), &allow_all());
        assert_eq!(codes(&locales), vec![""]);
    }

    #[test]
    fn test_single_non_default_page_gives_only_its_locale() {
        let family = vec![page(1, "fr-FR", None)];
        let locales = build_locale_set(&family, &portal(), &Locale::new("en-US"), &allow_all());
        assert_eq!(codes(&locales), vec!["fr-FR"]);
    }

    #[test]
    fn test_default_first_then_portal_order() {
        let mut family = family();
        family.swap(1, 2);
        let locales = build_locale_set(&family, &portal(), &Locale::new("en-US"), &allow_all());
        assert_eq!(codes(&locales), vec!["en-US", "fr-FR", "de-DE"]);
    }

    #[test]
    fn test_unviewable_variant_is_excluded() {
        let locales = build_locale_set(
            &family(),
            &portal(),
            &Locale::new("en-US"),
            &Allow([2].into_iter().collect()),
        );
        assert_eq!(codes(&locales), vec!["en-US", "de-DE"]);
    }

    #[test]
    fn test_family_without_default_page_gets_default_locale_only() {
        let orphan_ref = Uuid::new_v4();
        let family = vec![page(2, "fr-FR", Some(orphan_ref)), page(3, "de-DE", Some(orphan_ref))];
        let locales = build_locale_set(&family, &portal(), &Locale::new("en-US"), &allow_all());
        assert_eq!(codes(&locales), vec!["en-US"]);
    }

    // ==================== Missing Languages Tests ====================

    #[test]
    fn test_has_missing_languages() {
        let mut family = family();
        assert!(!has_missing_languages(&family, &portal()));

        family.pop();
        assert!(has_missing_languages(&family, &portal()));
    }

    #[test]
    fn test_neutral_family_never_misses_languages() {
        assert!(!has_missing_languages(&[page(1, "", None)], &portal()));
        assert!(!has_missing_languages(&family(), &[]));
    }

    // ==================== Properties ====================

    proptest! {
        #[test]
        fn prop_empty_portal_always_neutral(cultures in proptest::collection::vec("[a-z]{2}-[A-Z]{2}", 0..5)) {
            let default = page(1, "en-US", None);
            let id = default.unique_id;
            let mut family = vec![default];
            family.extend(cultures.iter().enumerate().map(|(i, c)| page(i as i32 + 2, c, Some(id))));

            let locales = build_locale_set(&family, &[], &Locale::new("en-US"), &allow_all());
            prop_assert_eq!(locales, vec![Locale::neutral()]);
        }

        #[test]
        fn prop_default_locale_first_for_multi_variant_family(denied in proptest::collection::hash_set(1..4i32, 0..3)) {
            let locales = build_locale_set(&family(), &portal(), &Locale::new("en-US"), &Allow(denied));
            prop_assert_eq!(locales[0].culture_code.as_str(), "en-US");
            let unique: HashSet<_> = locales.iter().collect();
            prop_assert_eq!(unique.len(), locales.len());
        }
    }
}
