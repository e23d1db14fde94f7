use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::MenuAction;

pub const PATH_SEPARATOR: char = '/';

/// One executable leaf.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub path: String,
    pub order: i32,
    /// Ask "continue?" after each successful run and run again on yes
    pub auto_confirm: bool,
    /// Skipped by unattended batch runs
    pub ci_excluded: bool,
    pub action: Arc<dyn MenuAction>,
}

impl CommandDescriptor {
    pub fn new(path: impl Into<String>, action: Arc<dyn MenuAction>) -> Self {
        Self {
            path: path.into(),
            order: 1,
            auto_confirm: false,
            ci_excluded: false,
            action,
        }
    }

    pub fn order(self, order: i32) -> Self {
        Self { order, ..self }
    }

    pub fn auto_confirm(self) -> Self {
        Self {
            auto_confirm: true,
            ..self
        }
    }

    pub fn ci_excluded(self) -> Self {
        Self {
            ci_excluded: true,
            ..self
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("path", &self.path)
            .field("order", &self.order)
            .field("auto_confirm", &self.auto_confirm)
            .field("ci_excluded", &self.ci_excluded)
            .finish()
    }
}

/// Action fired when the navigator enters `path`.
#[derive(Clone)]
pub struct EntryHook {
    pub path: String,
    pub execute_once: bool,
    pub action: Arc<dyn MenuAction>,
}

impl EntryHook {
    pub fn new(path: impl Into<String>, action: Arc<dyn MenuAction>) -> Self {
        Self {
            path: path.into(),
            execute_once: false,
            action,
        }
    }

    pub fn once(self) -> Self {
        Self {
            execute_once: true,
            ..self
        }
    }
}

impl fmt::Debug for EntryHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryHook")
            .field("path", &self.path)
            .field("execute_once", &self.execute_once)
            .finish()
    }
}

/// An entry of a displayed menu. The first entry is always the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    Back,
    Child(String),
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::Exit => write!(f, "exit"),
            MenuChoice::Back => write!(f, "back"),
            MenuChoice::Child(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Default)]
struct MenuNode {
    name: String,
    /// Insertion order is display order
    children: Vec<MenuNode>,
}

impl MenuNode {
    fn child(&self, name: &str) -> Option<&MenuNode> {
        self.children.iter().find(|child| child.name == name)
    }

    fn insert(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let index = match self.children.iter().position(|child| child.name == *first) {
            Some(index) => index,
            None => {
                self.children.push(MenuNode {
                    name: first.to_string(),
                    children: Vec::new(),
                });
                self.children.len() - 1
            }
        };
        self.children[index].insert(rest);
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Canonical key of a path: `"/Tools//a/"` and `"Tools/a"` are the same entry.
fn normalize(path: &str) -> String {
    segments(path).join("/")
}

/// Collects descriptors and hooks before the trie is built.
#[derive(Default)]
pub struct MenuRegistryBuilder {
    commands: Vec<CommandDescriptor>,
    hooks: Vec<EntryHook>,
}

impl MenuRegistryBuilder {
    /// Add a leaf. A path that is already registered keeps its first action.
    pub fn register(mut self, mut descriptor: CommandDescriptor) -> Self {
        descriptor.path = normalize(&descriptor.path);
        if descriptor.path.is_empty() {
            warn!("Ignoring menu command with an empty path");
            return self;
        }
        if self.commands.iter().any(|known| known.path == descriptor.path) {
            debug!("Duplicate menu path {}, keeping the first", descriptor.path);
            return self;
        }
        self.commands.push(descriptor);
        self
    }

    pub fn register_hook(mut self, mut hook: EntryHook) -> Self {
        hook.path = normalize(&hook.path);
        self.hooks.push(hook);
        self
    }

    /// Freeze the registrations. Children are laid out by `(order, path)`.
    pub fn build(mut self) -> MenuRegistry {
        self.commands
            .sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.path.cmp(&b.path)));

        let mut root = MenuNode::default();
        for command in &self.commands {
            root.insert(&segments(&command.path));
        }

        let index = self
            .commands
            .iter()
            .enumerate()
            .map(|(i, command)| (command.path.clone(), i))
            .collect();

        MenuRegistry {
            root,
            commands: self.commands,
            index,
            hooks: self.hooks,
        }
    }
}

/// Read-only menu tree.
#[derive(Default)]
pub struct MenuRegistry {
    root: MenuNode,
    commands: Vec<CommandDescriptor>,
    index: HashMap<String, usize>,
    hooks: Vec<EntryHook>,
}

impl MenuRegistry {
    pub fn builder() -> MenuRegistryBuilder {
        MenuRegistryBuilder::default()
    }

    /// Deepest node reached by following `path`; stops at the first segment
    /// that has no matching child.
    fn resolve(&self, path: &str) -> &MenuNode {
        let mut node = &self.root;
        for segment in segments(path) {
            match node.child(segment) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    /// The sentinel followed by the names of the children of `path`.
    pub fn children_of(&self, path: &str) -> Vec<MenuChoice> {
        let node = self.resolve(path);
        let sentinel = if std::ptr::eq(node, &self.root) {
            MenuChoice::Exit
        } else {
            MenuChoice::Back
        };

        std::iter::once(sentinel)
            .chain(
                node.children
                    .iter()
                    .map(|child| MenuChoice::Child(child.name.clone())),
            )
            .collect()
    }

    pub fn is_leaf(&self, path: &str) -> bool {
        self.resolve(path).children.is_empty()
    }

    pub fn command(&self, path: &str) -> Option<&CommandDescriptor> {
        self.index.get(&normalize(path)).map(|&i| &self.commands[i])
    }

    /// Every leaf path in display order, optionally without CI-excluded ones.
    pub fn command_paths(&self, skip_ci_excluded: bool) -> Vec<String> {
        self.commands
            .iter()
            .filter(|command| !(skip_ci_excluded && command.ci_excluded))
            .map(|command| command.path.clone())
            .collect()
    }

    /// Hooks in registration order.
    pub fn hooks(&self) -> &[EntryHook] {
        &self.hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::testing::Recorder;

    fn leaf(path: &str) -> CommandDescriptor {
        CommandDescriptor::new(path, Recorder::new())
    }

    fn names(choices: &[MenuChoice]) -> Vec<String> {
        choices.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_duplicate_path_keeps_first() {
        let registry = MenuRegistry::builder()
            .register(leaf("Tools/a").order(5))
            .register(leaf("Tools/a").order(1).auto_confirm())
            .build();

        let command = registry.command("Tools/a").unwrap();
        assert_eq!(command.order, 5);
        assert!(!command.auto_confirm);
        assert_eq!(names(&registry.children_of("Tools")), vec!["back", "a"]);
        assert!(registry.is_leaf("Tools/a"));
    }

    #[test]
    fn test_trailing_separator_is_same_path() {
        let registry = MenuRegistry::builder()
            .register(leaf("Tools/a/").order(1))
            .register(leaf("Tools/a").order(9))
            .register(leaf("/Tools//b"))
            .register_hook(EntryHook::new("Tools/", Recorder::new()))
            .build();

        assert_eq!(registry.command_paths(false), vec!["Tools/a", "Tools/b"]);
        assert_eq!(registry.command("Tools/a").unwrap().order, 1);
        assert_eq!(registry.command("Tools/a/").unwrap().order, 1);
        assert!(registry.command("Tools/b").is_some());
        assert_eq!(names(&registry.children_of("Tools")), vec!["back", "a", "b"]);
        assert_eq!(registry.hooks()[0].path, "Tools");
    }

    #[test]
    fn test_first_choice_is_sentinel() {
        let registry = MenuRegistry::builder()
            .register(leaf("A/x"))
            .register(leaf("B"))
            .build();

        assert_eq!(registry.children_of("")[0], MenuChoice::Exit);
        assert_eq!(registry.children_of("A")[0], MenuChoice::Back);
        assert_eq!(registry.children_of("A/x")[0], MenuChoice::Back);
        assert_eq!(registry.children_of("B")[0], MenuChoice::Back);
    }

    #[test]
    fn test_leaf_iff_no_children() {
        let registry = MenuRegistry::builder()
            .register(leaf("A/x"))
            .register(leaf("A/y/z"))
            .build();

        for path in ["", "A", "A/x", "A/y", "A/y/z"] {
            let has_children = registry.children_of(path).len() > 1;
            assert_eq!(registry.is_leaf(path), !has_children, "{path}");
        }
        assert!(!registry.is_leaf(""));
        assert!(!registry.is_leaf("A/y"));
        assert!(registry.is_leaf("A/y/z"));
    }

    #[test]
    fn test_children_sorted_by_order_then_path() {
        let registry = MenuRegistry::builder()
            .register(leaf("Profiles/rm").order(i32::MAX))
            .register(leaf("Sftp/upload"))
            .register(leaf("Sftp/cat"))
            .register(leaf("Sftp/sync").order(0))
            .build();

        assert_eq!(names(&registry.children_of("")), vec!["exit", "Sftp", "Profiles"]);
        assert_eq!(
            names(&registry.children_of("Sftp")),
            vec!["back", "sync", "cat", "upload"]
        );
        assert_eq!(
            registry.command_paths(false),
            vec!["Sftp/sync", "Sftp/cat", "Sftp/upload", "Profiles/rm"]
        );
    }

    #[test]
    fn test_unknown_segment_stops_resolution() {
        let registry = MenuRegistry::builder().register(leaf("A/x")).build();
        assert_eq!(names(&registry.children_of("A/nope")), vec!["back", "x"]);
        assert_eq!(names(&registry.children_of("nope")), vec!["exit", "A"]);
        assert!(registry.command("A/nope").is_none());
    }

    #[test]
    fn test_command_paths_skip_ci_excluded() {
        let registry = MenuRegistry::builder()
            .register(leaf("A/x"))
            .register(leaf("A/y").ci_excluded())
            .build();
        assert_eq!(registry.command_paths(true), vec!["A/x"]);
        assert_eq!(registry.command_paths(false), vec!["A/x", "A/y"]);
    }

    #[test]
    fn test_empty_path_ignored() {
        let registry = MenuRegistry::builder().register(leaf("")).build();
        assert!(registry.command_paths(false).is_empty());
        assert_eq!(registry.children_of(""), vec![MenuChoice::Exit]);
    }
}
