//! Fixed category tree used by the seeder.

/// Top-level categories, in creation order.
pub const TOP_LEVEL: [&str; 10] = [
    "Electronics",
    "Clothing",
    "Home & Garden",
    "Sports",
    "Books",
    "Toys",
    "Food & Beverages",
    "Health",
    "Automotive",
    "Office",
];

/// Subcategories keyed by their top-level parent.
pub const SUBCATEGORIES: [(&str, &[&str]); 4] = [
    (
        "Electronics",
        &["Phones", "Laptops", "Tablets", "Cameras", "Audio"],
    ),
    (
        "Clothing",
        &["Men", "Women", "Kids", "Shoes", "Accessories"],
    ),
    (
        "Home & Garden",
        &["Furniture", "Kitchen", "Decor", "Garden Tools"],
    ),
    (
        "Sports",
        &["Fitness", "Outdoor", "Team Sports", "Water Sports"],
    ),
];

/// Number of categories the tree describes.
#[must_use]
pub fn category_count() -> usize {
    TOP_LEVEL.len() + SUBCATEGORIES.iter().map(|(_, subs)| subs.len()).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_count() {
        assert_eq!(category_count(), 28);
    }

    #[test]
    fn test_every_parent_is_top_level() {
        for (parent, _) in SUBCATEGORIES {
            assert!(TOP_LEVEL.contains(&parent), "{parent} is not top-level");
        }
    }
}
