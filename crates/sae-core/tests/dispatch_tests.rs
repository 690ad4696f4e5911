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

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sae_core::{
    split_not_empty, CommandSet, DualMap, Identifiable, Receiver, RequestHub, ResponseParser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verb {
    Get,
    Set,
}

fn verbs() -> DualMap<String, Verb> {
    [("get".to_string(), Verb::Get), ("set".to_string(), Verb::Set)]
        .into_iter()
        .collect()
}

type Handler = fn(&mut HashMap<String, String>, &[&str]) -> Option<String>;

fn get(store: &mut HashMap<String, String>, args: &[&str]) -> Option<String> {
    args.first().and_then(|k| store.get(*k).cloned())
}

fn set(store: &mut HashMap<String, String>, args: &[&str]) -> Option<String> {
    match args {
        [key, value] => store.insert(key.to_string(), value.to_string()),
        _ => None,
    }
}

#[test]
fn tokenized_lines_drive_a_command_set() {
    // --- 1. ARRANGE ---
    let mut commands: CommandSet<Handler> = CommandSet::new();
    commands.insert("get", get as Handler);
    commands.insert("set", set as Handler);
    let mut store = HashMap::new();

    // --- 2. ACT ---
    let mut answers = Vec::new();
    for line in ["set  color   blue", "get color", "  get missing", "drop color"] {
        let tokens = split_not_empty(line, ' ');
        let (name, args) = tokens.split_first().expect("line has a command");
        answers.push(commands.invoke_with(*name, |handler| handler(&mut store, args)));
    }

    // --- 3. ASSERT ---
    assert_eq!(answers[0], Some(None), "first set returns no previous value");
    assert_eq!(answers[1], Some(Some("blue".to_string())));
    assert_eq!(answers[2], Some(None), "unknown key is a miss, not an unknown command");
    assert_eq!(answers[3], None, "'drop' is not registered");
}

#[test]
fn dual_map_backs_a_string_enum() {
    let verbs = verbs();

    let parsed: Vec<Verb> = ["set", "get", "set"]
        .iter()
        .map(|s| *verbs.ltor(&s.to_string()).expect("known verb"))
        .collect();
    assert_eq!(parsed, vec![Verb::Set, Verb::Get, Verb::Set]);

    let printed: Vec<&str> = parsed
        .iter()
        .map(|v| verbs.rtol(v).expect("every verb has a name").as_str())
        .collect();
    assert_eq!(printed, vec!["set", "get", "set"]);

    assert!(verbs.ltor(&"GET".to_string()).is_err());
}

struct Upper;

impl ResponseParser<String> for Upper {
    type Output = String;
    type Error = ();

    fn parse(&self, message: &String) -> Result<String, ()> {
        if message.is_empty() {
            Err(())
        } else {
            Ok(message.to_uppercase())
        }
    }
}

#[test]
fn responses_arriving_from_another_thread_reach_their_requesters() {
    // --- 1. ARRANGE ---
    let receiver = Arc::new(Receiver::new(Upper));
    let hub = Arc::new(Mutex::new(RequestHub::new()));

    let first = hub.lock().unwrap().request(&receiver);
    let second = hub.lock().unwrap().request(&receiver);
    let ids = (first.id(), second.id());

    // --- 2. ACT ---
    // Answer out of order from a "network" thread.
    let network_hub = Arc::clone(&hub);
    let network = thread::spawn(move || {
        let mut hub = network_hub.lock().unwrap();
        assert!(hub.handle(Identifiable::new(ids.1, "second".to_string())));
        assert!(hub.handle(Identifiable::new(ids.0, String::new())));
    });

    // --- 3. ASSERT ---
    let second = second
        .wait_timeout(Duration::from_secs(1))
        .expect("second response arrives");
    assert_eq!(second, Ok("SECOND".to_string()));

    let first = first
        .wait_timeout(Duration::from_secs(1))
        .expect("first response arrives");
    assert_eq!(first, Err(()), "empty payload fails to parse");

    network.join().expect("network thread");
    assert_eq!(hub.lock().unwrap().pending(), 0);
    assert_eq!(receiver.pending(), 0);
}
