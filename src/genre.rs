use ndarray::Array1;

/// Genre labels fixed at configuration time. A song's genre is its index here.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GenreTable {
    labels: Vec<String>,
}

impl GenreTable {
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        GenreTable {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn one_hot(&self, index: usize) -> Array1<f32> {
        one_hot(index, self.len())
    }
}

/// Vector of `len` zeros with a one at `index`; all zeros when `index` is out of range.
pub fn one_hot(index: usize, len: usize) -> Array1<f32> {
    let mut vector = Array1::zeros(len);
    if let Some(value) = vector.get_mut(index) {
        *value = 1.0;
    }
    vector
}
