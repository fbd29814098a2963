/// A boolean selection over the nodes of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    selected: Vec<bool>,
}

impl Mask {
    /// Creates a new `Mask` from one flag per node.
    pub fn new(selected: Vec<bool>) -> Self {
        Self { selected }
    }

    /// Creates a mask of `len` nodes selecting only `indices`.
    ///
    /// # Returns
    /// `None` if any index is out of bounds.
    pub fn from_indices<I>(len: usize, indices: I) -> Option<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut selected = vec![false; len];

        for i in indices {
            *selected.get_mut(i)? = true;
        }

        Some(Self { selected })
    }

    /// The amount of nodes the mask is defined over.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The amount of selected nodes.
    pub fn count(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.selected.get(node).copied().unwrap_or(false)
    }

    /// The selected node indices in increasing order.
    pub fn indices(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
            .collect()
    }
}
