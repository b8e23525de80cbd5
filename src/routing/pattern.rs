//! Path template helpers.
//!
//! A resource pattern is a list of literal groups joined by the wildcard
//! marker `/*/`, e.g. `grandparents/*/parents/*/children`.

/// Separator standing for "a parent identifier goes here".
pub const WILDCARD: &str = "/*/";

/// Split a pattern into its literal groups.
///
/// Groups are not split any further, so `a/*/b/c` yields `["a", "b/c"]`.
pub fn literal_groups(pattern: &str) -> Vec<&str> {
    pattern.split(WILDCARD).collect()
}

/// Normalize an API prefix to `/` or `/segment(s)/`.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// A pattern rendered with named parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPath {
    /// Collection route, e.g. `parents/:id1/children`.
    pub collection: String,
    /// Parameter names standing for parent ids, outer to inner.
    pub parent_params: Vec<String>,
    /// Parameter name for the leaf id.
    pub id_param: String,
}

impl ExpandedPath {
    /// Route naming a single item: the collection followed by the leaf parameter.
    pub fn item(&self, id_template: &str) -> String {
        format!(
            "{}/{}",
            self.collection,
            id_template.replace("{}", &self.id_param)
        )
    }
}

/// Render a wildcard pattern with named parameters.
///
/// `id_template` must contain `{}`, which is replaced by `id1`, `id2`, ...
/// For example `expand_path("a/*/b", ":{}")` gives collection `a/:id1/b`,
/// parent params `["id1"]` and leaf param `id2`.
pub fn expand_path(pattern: &str, id_template: &str) -> ExpandedPath {
    let groups = literal_groups(pattern);
    let mut collection = groups[0].to_string();
    let mut parent_params = Vec::with_capacity(groups.len() - 1);

    for (i, group) in groups.iter().enumerate().skip(1) {
        let param = format!("id{}", i);
        collection.push('/');
        collection.push_str(&id_template.replace("{}", &param));
        collection.push('/');
        collection.push_str(group);
        parent_params.push(param);
    }

    ExpandedPath {
        collection,
        id_param: format!("id{}", groups.len()),
        parent_params,
    }
}
