//! Bounded, recipe-driven undo/redo engine
//!
//! A [`HistoryEngine`] wraps an application's action-dispatch boundary. It is
//! configured once at construction with a [`RecipeTable`]: for each undoable
//! action kind, how to project the "before" state it needs
//! (`project_before`) and how to build the action that restores that
//! projection (`invert`). The engine itself knows nothing about the domain;
//! state, action, and snapshot types are all supplied by the caller.
//!
//! Both stacks are capped at [`HISTORY_DEPTH`] entries; the oldest entry is
//! silently dropped on overflow. Destructive lifecycle events (new/open/clear
//! project) bypass recording entirely via [`HistoryEngine::clear`].

use log::debug;
use std::collections::{HashMap, VecDeque};

/// Maximum entries retained per stack.
pub const HISTORY_DEPTH: usize = 10;

/// Implemented by the application's action type.
pub trait HistoryAction {
    /// Stable identifier tying an action to its configured recipe.
    fn kind(&self) -> &'static str;
}

/// How to capture and restore the state one action kind depends on.
pub struct Recipe<S, A, B> {
    /// Projects the slice of state this action kind needs to invert,
    /// captured immediately before the action's effect.
    pub project_before: Box<dyn Fn(&S) -> B + Send + Sync>,
    /// Builds the action that restores the captured projection.
    pub invert: Box<dyn Fn(&A, &B) -> A + Send + Sync>,
}

/// Action-kind to recipe mapping, supplied once at engine construction.
pub struct RecipeTable<S, A, B> {
    recipes: HashMap<&'static str, Recipe<S, A, B>>,
}

impl<S, A, B> Default for RecipeTable<S, A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A, B> RecipeTable<S, A, B> {
    pub fn new() -> Self {
        Self {
            recipes: HashMap::new(),
        }
    }

    /// Register the recipe for one action kind. Only registered kinds are
    /// recorded; everything else passes through dispatch untouched.
    pub fn register(
        mut self,
        kind: &'static str,
        project_before: impl Fn(&S) -> B + Send + Sync + 'static,
        invert: impl Fn(&A, &B) -> A + Send + Sync + 'static,
    ) -> Self {
        self.recipes.insert(
            kind,
            Recipe {
                project_before: Box::new(project_before),
                invert: Box::new(invert),
            },
        );
        self
    }

    fn get(&self, kind: &str) -> Option<&Recipe<S, A, B>> {
        self.recipes.get(kind)
    }
}

struct Entry<A, B> {
    action: A,
    before: B,
}

/// Undo/redo engine owning two bounded stacks and the recipe table.
pub struct HistoryEngine<S, A, B> {
    recipes: RecipeTable<S, A, B>,
    undo: VecDeque<Entry<A, B>>,
    redo: VecDeque<Entry<A, B>>,
    acting: bool,
}

impl<S, A: HistoryAction + Clone, B> HistoryEngine<S, A, B> {
    pub fn new(recipes: RecipeTable<S, A, B>) -> Self {
        Self {
            recipes,
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            acting: false,
        }
    }

    /// Apply `action` to `state` through `apply`, recording it first when its
    /// kind has a recipe and the engine is not replaying history.
    ///
    /// Recording captures `project_before(state)` ahead of the effect, pushes
    /// the entry on the undo stack, and clears the redo stack.
    pub fn dispatch(&mut self, state: &mut S, action: A, apply: impl FnOnce(&mut S, &A)) {
        if !self.acting {
            if let Some(recipe) = self.recipes.get(action.kind()) {
                let before = (recipe.project_before)(state);
                Self::push_capped(
                    &mut self.undo,
                    Entry {
                        action: action.clone(),
                        before,
                    },
                );
                self.redo.clear();
                debug!("recorded `{}` ({} undoable)", action.kind(), self.undo.len());
            }
        }
        apply(state, &action);
    }

    /// Restore the state prior to the most recent recorded action.
    ///
    /// Returns `false` when the undo stack is empty.
    ///
    /// # Panics
    ///
    /// Panics if the entry's kind has no recipe. A recorded entry that cannot
    /// be inverted means the configuration table changed underneath the
    /// engine; proceeding would corrupt the stack invariant that every pushed
    /// entry is invertible.
    pub fn undo(&mut self, state: &mut S, apply: impl FnOnce(&mut S, &A)) -> bool {
        let Some(entry) = self.undo.pop_back() else {
            return false;
        };
        let recipe = self.recipe_or_panic(entry.action.kind());
        let inverse = (recipe.invert)(&entry.action, &entry.before);
        self.acting = true;
        apply(state, &inverse);
        self.acting = false;
        Self::push_capped(&mut self.redo, entry);
        true
    }

    /// Re-apply the most recently undone action.
    ///
    /// The entry's `before` baseline is re-projected from the current state
    /// before the action runs again, so a following undo restores exactly
    /// this state. Returns `false` when the redo stack is empty.
    ///
    /// # Panics
    ///
    /// Panics if the entry's kind has no recipe, as for
    /// [`HistoryEngine::undo`].
    pub fn redo(&mut self, state: &mut S, apply: impl FnOnce(&mut S, &A)) -> bool {
        let Some(mut entry) = self.redo.pop_back() else {
            return false;
        };
        let recipe = self.recipe_or_panic(entry.action.kind());
        entry.before = (recipe.project_before)(state);
        self.acting = true;
        apply(state, &entry.action);
        self.acting = false;
        Self::push_capped(&mut self.undo, entry);
        true
    }

    /// Hard-reset both stacks. New/open/clear project lifecycles call this
    /// instead of recording anything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// True while the engine is replaying history (the re-entrancy guard
    /// that suppresses recursive capture).
    pub fn is_acting(&self) -> bool {
        self.acting
    }

    fn recipe_or_panic(&self, kind: &'static str) -> &Recipe<S, A, B> {
        self.recipes.get(kind).unwrap_or_else(|| {
            panic!("no history recipe registered for recorded action kind `{kind}`")
        })
    }

    fn push_capped(stack: &mut VecDeque<Entry<A, B>>, entry: Entry<A, B>) {
        if stack.len() == HISTORY_DEPTH {
            stack.pop_front();
        }
        stack.push_back(entry);
    }
}
