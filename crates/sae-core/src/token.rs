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

//! Splitting strings into borrowed tokens.
//!
//! Tokens borrow from the input, so a [`TokenList`] is cheap to build and
//! lives no longer than the string it was split from.

/// A list of tokens borrowed from a source string.
pub type TokenList<'a> = Vec<&'a str>;

/// Something a string can be split on.
///
/// Implemented for `char`, `&str` and `&String`.
pub trait Delimiter {
    /// Splits `source` on every occurrence of `self`.
    fn split_source<'a>(&self, source: &'a str) -> TokenList<'a>;
}

impl Delimiter for char {
    fn split_source<'a>(&self, source: &'a str) -> TokenList<'a> {
        source.split(*self).collect()
    }
}

impl Delimiter for &str {
    fn split_source<'a>(&self, source: &'a str) -> TokenList<'a> {
        // An empty pattern would match between every char.
        if self.is_empty() {
            return vec![source];
        }
        source.split(*self).collect()
    }
}

impl Delimiter for &String {
    fn split_source<'a>(&self, source: &'a str) -> TokenList<'a> {
        self.as_str().split_source(source)
    }
}

/// Splits `source` on `delimiter`, keeping empty tokens.
///
/// The remainder after the last delimiter is always emitted, so the result
/// holds one more token than there are delimiter occurrences.
///
/// ```rust
/// use sae_core::token::split;
///
/// assert_eq!(split("a,,b", ','), vec!["a", "", "b"]);
/// assert_eq!(split("", ','), vec![""]);
/// ```
pub fn split<D: Delimiter>(source: &str, delimiter: D) -> TokenList<'_> {
    delimiter.split_source(source)
}

/// Removes every empty token in place and returns how many were removed.
pub fn erase_empty(tokens: &mut TokenList<'_>) -> usize {
    let before = tokens.len();
    tokens.retain(|t| !t.is_empty());
    before - tokens.len()
}

/// Splits `source` on `delimiter` and drops empty tokens.
pub fn split_not_empty<D: Delimiter>(source: &str, delimiter: D) -> TokenList<'_> {
    let mut tokens = split(source, delimiter);
    erase_empty(&mut tokens);
    tokens
}
