//! Built-in menu leaves and hooks.

pub mod profiles;
pub mod sftp;

use std::sync::Arc;

use crate::menu::{CommandDescriptor, EntryHook, MenuRegistry};

/// The menu tree shipped with the console.
pub fn builtin_registry() -> MenuRegistry {
    MenuRegistry::builder()
        .register_hook(EntryHook::new("Sftp", Arc::new(sftp::EnsureSftpProfiles)).once())
        .register(CommandDescriptor::new("Sftp/sync", Arc::new(sftp::SyncCommand)))
        .register(CommandDescriptor::new("Sftp/ls", Arc::new(sftp::ListCommand)).ci_excluded())
        .register(
            CommandDescriptor::new("Sftp/ls-r", Arc::new(sftp::ListRecursiveCommand)).ci_excluded(),
        )
        .register(CommandDescriptor::new("Sftp/cat", Arc::new(sftp::CatCommand)))
        .register(CommandDescriptor::new("Sftp/upload", Arc::new(sftp::UploadCommand)).ci_excluded())
        .register(CommandDescriptor::new("Sftp/rm", Arc::new(sftp::RemoveCommand)).ci_excluded())
        .register(
            CommandDescriptor::new("Profiles/rm", Arc::new(profiles::RemoveProfiles))
                .order(i32::MAX)
                .ci_excluded(),
        )
        .register(
            CommandDescriptor::new("Profiles/cat", Arc::new(profiles::ShowProfile))
                .order(i32::MAX)
                .ci_excluded(),
        )
        .register(
            CommandDescriptor::new("Profiles/touch", Arc::new(profiles::TouchProfiles))
                .order(i32::MAX)
                .ci_excluded(),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuChoice;

    #[test]
    fn test_builtin_tree_layout() {
        let registry = builtin_registry();

        let root: Vec<String> = registry.children_of("").iter().map(ToString::to_string).collect();
        assert_eq!(root, vec!["exit", "Sftp", "Profiles"]);

        let sftp: Vec<String> = registry.children_of("Sftp").iter().map(ToString::to_string).collect();
        assert_eq!(sftp, vec!["back", "cat", "ls", "ls-r", "rm", "sync", "upload"]);

        assert_eq!(registry.children_of("Profiles")[0], MenuChoice::Back);
        assert_eq!(registry.command_paths(true), vec!["Sftp/cat", "Sftp/sync"]);
        assert!(!registry.command("Sftp/rm").unwrap().auto_confirm);
        assert_eq!(registry.hooks().len(), 1);
        assert!(registry.hooks()[0].execute_once);
    }
}
