// Re-applies the stored wallpaper to themeable surfaces that appear after
// the last projection. Pages are rebuilt on navigation and the fresh
// surfaces don't inherit per-element overrides; only the root variable
// survives on its own.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::environment::{Mutation, StyleEnvironment};
use crate::store::KeyValueStore;
use crate::theme::{SharedTheme, ThemeManager};

pub struct PresenceWatcher;

impl PresenceWatcher {
    /// Theme whatever surfaces a mutation batch added. Returns the number of
    /// surfaces that received the override.
    pub fn handle_mutation<S, E>(theme: &mut ThemeManager<S, E>, mutation: &Mutation) -> usize
    where
        S: KeyValueStore,
        E: StyleEnvironment,
    {
        let Mutation::Added(nodes) = mutation else {
            return 0;
        };
        let surfaces = theme.surfaces_in(nodes);
        if surfaces.is_empty() {
            return 0;
        }
        let themed = theme.reapply_surfaces(&surfaces);
        if themed > 0 {
            tracing::debug!(themed, "applied wallpaper to new surfaces");
        }
        themed
    }

    /// Consume mutation batches until every sender is gone.
    ///
    /// The document publishing the batches usually lives inside `theme`, so
    /// the task only keeps a weak handle; once the last strong handle is
    /// dropped the document and its senders go with it and the task ends.
    pub fn spawn<S, E>(
        theme: SharedTheme<S, E>,
        mut rx: mpsc::UnboundedReceiver<Mutation>,
    ) -> JoinHandle<()>
    where
        S: KeyValueStore + Send + 'static,
        E: StyleEnvironment + Send + 'static,
    {
        let theme = Arc::downgrade(&theme);
        tokio::spawn(async move {
            while let Some(mutation) = rx.recv().await {
                let Some(theme) = theme.upgrade() else { break };
                let mut guard = theme.lock().await;
                Self::handle_mutation(&mut *guard, &mutation);
            }
            tracing::debug!("presence watcher stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Document, Element, NodeId};
    use crate::projector::ThemeVars;
    use crate::store::MemoryStore;

    #[test]
    fn removals_are_ignored() {
        let mut theme =
            ThemeManager::new(MemoryStore::new(), Document::new(), ThemeVars::default());
        theme.set_wallpaper(Some("data:image/png;base64,AAAA"));
        let removed = Mutation::Removed(vec![NodeId(0)]);
        assert_eq!(PresenceWatcher::handle_mutation(&mut theme, &removed), 0);
    }

    #[test]
    fn nested_surfaces_in_added_subtree_are_themed() {
        let mut theme =
            ThemeManager::new(MemoryStore::new(), Document::new(), ThemeVars::default());
        theme.set_wallpaper(Some("data:image/png;base64,AAAA"));
        let page = theme
            .environment_mut()
            .append(
                None,
                Element::new("page")
                    .child(Element::new("content").class("wallpaper-surface"))
                    .child(Element::new("footer")),
            )
            .unwrap();
        let added = Mutation::Added(vec![page]);
        let themed = PresenceWatcher::handle_mutation(&mut theme, &added);
        assert_eq!(themed, 1);
    }
}
