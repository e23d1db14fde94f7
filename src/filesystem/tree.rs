use std::collections::BTreeMap;

/// A directory and the names listed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryGroup {
    pub dir: String,
    pub entries: Vec<String>,
}

/// Group `(path, is_dir)` pairs by their parent directory for a tree view.
///
/// Directories open a (possibly empty) group of their own; files are listed by
/// name under their parent. Groups and entries come out sorted by path.
pub fn group_by_directory<'a, I>(paths: I) -> Vec<DirectoryGroup>
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    let mut sorted: Vec<(&str, bool)> = paths.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (path, is_dir) in sorted {
        if is_dir {
            groups.entry(path.to_string()).or_default();
            continue;
        }
        let (dir, name) = match path.rfind('/') {
            Some(0) => ("/", &path[1..]),
            Some(index) => (&path[..index], &path[index + 1..]),
            None => (".", path),
        };
        groups.entry(dir.to_string()).or_default().push(name.to_string());
    }

    groups
        .into_iter()
        .map(|(dir, entries)| DirectoryGroup { dir, entries })
        .collect()
}
