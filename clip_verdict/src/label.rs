use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelSetError {
    #[error("label set must not be empty")]
    Empty,
    #[error("duplicate label in set: {0}")]
    Duplicate(String),
}

/// One category name from the closed set, together with the class index
/// the classifier reports it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub index: usize,
    pub name: String,
}

/// Ordered, duplicate-free set of category names. The classifier's output
/// domain and the aggregator's counting domain are both this set, so it is
/// validated once at construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new(names: Vec<String>) -> Result<Self, LabelSetError> {
        if names.is_empty() {
            return Err(LabelSetError::Empty);
        }
        let mut labels: Vec<Label> = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            if labels.iter().any(|l| l.name == name) {
                return Err(LabelSetError::Duplicate(name));
            }
            labels.push(Label { index, name });
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }
}

impl TryFrom<Vec<String>> for LabelSet {
    type Error = LabelSetError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        LabelSet::new(names)
    }
}

/// Outcome of one pipeline invocation. `NoVerdict` is a distinguished
/// empty result, never to be confused with any member of the label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Label(Label),
    NoVerdict,
}
