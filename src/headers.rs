use std::collections::HashMap;

/// Header names and a lookup from name to column position.
///
/// When a name appears more than once, lookups find its last position.
#[derive(Clone, Debug, Default)]
pub(crate) struct HeaderIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    case_sensitive: bool,
}

impl HeaderIndex {
    pub(crate) fn new(names: Vec<String>, case_sensitive: bool) -> HeaderIndex {
        let mut index = HeaderIndex {
            names: names,
            positions: HashMap::new(),
            case_sensitive: case_sensitive,
        };
        index.rebuild();
        index
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn get(&self, i: usize) -> Option<&str> {
        self.names.get(i).map(|s| &**s)
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        if self.case_sensitive {
            self.positions.get(name).cloned()
        } else {
            self.positions.get(&name.to_lowercase()).cloned()
        }
    }

    pub(crate) fn set_names(&mut self, names: Vec<String>) {
        self.names = names;
        self.rebuild();
    }

    pub(crate) fn set_case_sensitive(&mut self, yes: bool) {
        if self.case_sensitive != yes {
            self.case_sensitive = yes;
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        self.positions.clear();
        for (i, name) in self.names.iter().enumerate() {
            let key = if self.case_sensitive {
                name.clone()
            } else {
                name.to_lowercase()
            };
            self.positions.insert(key, i);
        }
    }
}
