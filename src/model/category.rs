use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The identifier of a Splitwise category.
pub type CategoryId = u64;

/// A top-level Splitwise category and the subcategories beneath it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TopLevelCategory {
    pub(crate) id: CategoryId,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) subcategories: Vec<Subcategory>,
}

impl TopLevelCategory {
    pub fn new(id: CategoryId, name: impl Into<String>, subcategories: Vec<Subcategory>) -> Self {
        Self {
            id,
            name: name.into(),
            subcategories,
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }
}

/// A Splitwise category that lives beneath a `TopLevelCategory`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub(crate) id: CategoryId,
    pub(crate) name: String,
}

impl Subcategory {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The full two-level Splitwise category tree.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy(Vec<TopLevelCategory>);

impl Taxonomy {
    pub fn new(categories: Vec<TopLevelCategory>) -> Self {
        Self(categories)
    }

    pub fn categories(&self) -> &[TopLevelCategory] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattens the tree into the list an operator picks from: each top-level category followed
    /// by its subcategories, which are labeled `Parent > Child`.
    pub fn flatten(&self) -> Vec<CategoryChoice> {
        let mut choices = Vec::new();
        for top in &self.0 {
            choices.push(CategoryChoice::new(top.id, top.name.clone()));
            for sub in &top.subcategories {
                choices.push(CategoryChoice::new(
                    sub.id,
                    format!("{} > {}", top.name, sub.name),
                ));
            }
        }
        choices
    }
}

/// A single pickable Splitwise category with the label shown to the operator.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryChoice {
    id: CategoryId,
    label: String,
}

impl CategoryChoice {
    pub fn new(id: CategoryId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Display for CategoryChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}
