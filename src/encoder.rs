//! Label encoding for categorical features.

/// Maps category labels to dense integer codes.
///
/// Classes are stored sorted, so a code is the label's rank in the trained
/// vocabulary. Lookups are exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
