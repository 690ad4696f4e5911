// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Name-based command dispatch.
//!
//! A [`CommandSet`] maps keys to callbacks. It does not constrain the callback
//! signature: callers look a callback up and invoke it themselves through
//! [`CommandSet::invoke_with`], which keeps the set usable for plain function
//! pointers, boxed closures and shared `Arc<dyn Fn>` handles alike.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{CoreError, CoreResult};

/// A set of callbacks addressed by key.
#[derive(Debug, Clone)]
pub struct CommandSet<C, K = String> {
    commands: HashMap<K, C>,
}

impl<C, K> Default for CommandSet<C, K> {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }
}

impl<C, K: Eq + Hash> CommandSet<C, K> {
    /// Creates an empty command set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `key`, returning the callback it replaced.
    pub fn insert(&mut self, key: impl Into<K>, callback: C) -> Option<C> {
        self.commands.insert(key.into(), callback)
    }

    /// Returns `true` if a callback is registered under `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.commands.contains_key(key)
    }

    /// Removes and returns the callback under `key`.
    pub fn erase<Q>(&mut self, key: &Q) -> Option<C>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.commands.remove(key)
    }

    /// Removes every callback.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns the callback under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&C>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.commands.get(key)
    }

    /// Returns the callback under `key` mutably.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut C>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.commands.get_mut(key)
    }

    /// Like [`get`](Self::get) but reports a missing key as an error.
    pub fn at<Q>(&self, key: &Q) -> CoreResult<&C>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + std::fmt::Debug + ?Sized,
    {
        self.get(key).ok_or_else(|| CoreError::key_not_found(key))
    }

    /// Runs `invoke` with the callback under `key`.
    ///
    /// Returns `None` when no callback is registered, which is how callers
    /// tell "unknown command" apart from whatever the callback returned.
    pub fn invoke_with<Q, R>(&self, key: &Q, invoke: impl FnOnce(&C) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.get(key).map(invoke)
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates `(key, callback)` pairs in hash order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &C)> {
        self.commands.iter()
    }

    /// Returns the registered keys, sorted.
    pub fn names(&self) -> Vec<&K>
    where
        K: Ord,
    {
        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();
        names
    }
}

impl<C, K: Eq + Hash> FromIterator<(K, C)> for CommandSet<C, K> {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Callback type used for process command lines.
pub type CommandCallback = Box<dyn Fn(&[String]) + Send + Sync>;

/// Collects process arguments into owned strings.
pub fn parse_command_line<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}

/// Runs the command named by the first argument with the remaining arguments.
///
/// Returns `true` if a command was found and invoked. Arguments keep their order.
pub fn dispatch_command_line<I, S>(args: I, commands: &CommandSet<CommandCallback>) -> bool
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens = parse_command_line(args);
    let Some((name, rest)) = tokens.split_first() else {
        return false;
    };
    let ran = commands.invoke_with(name.as_str(), |cb| cb(rest)).is_some();
    if !ran {
        log::debug!("No command registered under '{name}'.");
    }
    ran
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn double(x: i32) -> i32 {
        x * 2
    }

    fn negate(x: i32) -> i32 {
        -x
    }

    fn math_set() -> CommandSet<fn(i32) -> i32> {
        let mut set = CommandSet::new();
        set.insert("double", double as fn(i32) -> i32);
        set.insert("negate", negate as fn(i32) -> i32);
        set
    }

    #[test]
    fn invoke_with_runs_registered_callback() {
        let set = math_set();
        assert_eq!(set.invoke_with("double", |f| f(21)), Some(42));
        assert_eq!(set.invoke_with("negate", |f| f(3)), Some(-3));
    }

    #[test]
    fn invoke_with_unknown_key_is_none() {
        let set = math_set();
        assert_eq!(set.invoke_with("triple", |f| f(1)), None);
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut set = math_set();
        let old = set.insert("double", negate as fn(i32) -> i32);
        assert!(old.is_some());
        assert_eq!(set.invoke_with("double", |f| f(2)), Some(-2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn erase_and_clear() {
        let mut set = math_set();
        assert!(set.erase("double").is_some());
        assert!(!set.contains("double"));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let set = math_set();
        let names: Vec<&str> = set.names().into_iter().map(String::as_str).collect();
        assert_eq!(names, vec!["double", "negate"]);
    }

    #[test]
    fn at_reports_missing_key() {
        let set = math_set();
        assert!(set.at("double").is_ok());
        assert!(matches!(set.at("halve"), Err(CoreError::KeyNotFound(_))));
    }

    #[test]
    fn dispatch_command_line_passes_remaining_args_in_order() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);

        let mut set: CommandSet<CommandCallback> = CommandSet::new();
        set.insert(
            "build",
            Box::new(move |args: &[String]| sink.lock().unwrap().extend_from_slice(args))
                as CommandCallback,
        );

        assert!(dispatch_command_line(["build", "--release", "-v", "core"], &set));
        assert_eq!(*seen.lock().unwrap(), vec!["--release", "-v", "core"]);
    }

    #[test]
    fn dispatch_command_line_without_match() {
        let set: CommandSet<CommandCallback> = CommandSet::new();
        assert!(!dispatch_command_line(["missing"], &set));
        assert!(!dispatch_command_line(Vec::<String>::new(), &set));
    }
}
