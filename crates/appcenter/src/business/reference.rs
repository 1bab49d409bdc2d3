use serde::{Deserialize, Serialize};

/// One `(code, name)` entry of a selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub code: String,
    pub name: String,
}

/// Ordered list of reference items, as consumed by selection widgets and permission screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceList(Vec<ReferenceItem>);

impl ReferenceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, code: impl ToString, name: impl Into<String>) {
        self.0.push(ReferenceItem {
            code: code.to_string(),
            name: name.into(),
        });
    }

    pub fn items(&self) -> &[ReferenceItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|item| item.code == code)
            .map(|item| item.name.as_str())
    }
}

impl IntoIterator for ReferenceList {
    type Item = ReferenceItem;
    type IntoIter = std::vec::IntoIter<ReferenceItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
