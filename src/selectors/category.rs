use std::collections::BTreeMap;

use super::resource::group_by;
use crate::model::{Category, CategoryType};

pub fn of_type(categories: &[Category], category_type: CategoryType) -> Vec<Category> {
    categories
        .iter()
        .filter(|c| c.category_type == category_type)
        .cloned()
        .collect()
}

pub fn grouped_by_type(categories: &[Category]) -> BTreeMap<CategoryType, Vec<Category>> {
    group_by(categories, |c| c.category_type)
}

pub fn active(categories: &[Category]) -> Vec<Category> {
    categories.iter().filter(|c| c.is_active).cloned().collect()
}

/// Category name for `id`, if the category is loaded.
pub fn name_of<'a>(categories: &'a [Category], id: &str) -> Option<&'a str> {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
}
