//! Identifier normalizer
//!
//! Converts native catalog identifiers between `snake_case` and `CamelCase`
//! while keeping registered initialisms (`ID`, `HTTP`, `UUID`, ...) together
//! as one uppercase unit in both directions.

use crate::error::{Error, Result};
use std::collections::HashSet;

/// Initialisms recognized by default.
pub const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTPS", "HTTP", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL",
    "UDP", "UID", "UI", "URI", "URL", "UTC", "UTF8", "UUID", "VM", "XML", "XMPP", "XSRF", "XSS",
    "YAML",
];

/// A set of initialisms plus the case conversions that honour it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initialisms {
    set: HashSet<String>,
    max: usize,
}

impl Default for Initialisms {
    fn default() -> Self {
        let mut ini = Self::empty();
        for s in COMMON_INITIALISMS {
            ini.insert(s);
        }
        ini
    }
}

impl Initialisms {
    /// A set with no initialisms at all.
    pub fn empty() -> Self {
        Self {
            set: HashSet::new(),
            max: 0,
        }
    }

    /// Build a set from `items`, rejecting any shorter than two characters.
    pub fn new<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ini = Self::empty();
        ini.extend(items)?;
        Ok(ini)
    }

    pub fn add(&mut self, initialism: &str) -> Result<()> {
        if initialism.chars().count() < 2 {
            return Err(Error::InvalidInitialism(initialism.to_string()));
        }
        self.insert(initialism);
        Ok(())
    }

    pub fn extend<I, S>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items.into_iter().try_for_each(|s| self.add(s.as_ref()))
    }

    fn insert(&mut self, initialism: &str) {
        let upper = initialism.to_uppercase();
        self.max = self.max.max(upper.chars().count());
        self.set.insert(upper);
    }

    pub fn is_initialism(&self, s: &str) -> bool {
        self.set.contains(&s.to_uppercase())
    }

    /// The longest registered initialism at the start of `chars`.
    ///
    /// Only a leading run of at least two uppercase characters is considered.
    pub fn peek(&self, chars: &[char]) -> Option<String> {
        let run: Vec<char> = chars
            .iter()
            .take(self.max)
            .take_while(|c| c.is_uppercase())
            .copied()
            .collect();

        (2..=run.len())
            .rev()
            .map(|n| run[..n].iter().collect::<String>())
            .find(|candidate| self.set.contains(candidate))
    }

    /// `AnIdentifier` → `an_identifier`, `UserID` → `user_id`, `XMLHttp` → `xml_http`.
    pub fn to_snake(&self, name: &str) -> String {
        let chars: Vec<char> = name.chars().collect();
        let mut out = String::with_capacity(name.len() + 4);

        let mut last_lower_or_digit = false;
        let mut last_upper = false;
        let mut last_initialism = false;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if (last_lower_or_digit && c.is_uppercase()) || (last_initialism && c.is_alphabetic()) {
                out.push('_');
            }

            // an initialism may only start a new uppercase run
            let initialism = if !last_upper || last_initialism {
                self.peek(&chars[i..])
            } else {
                None
            };

            match initialism {
                Some(run) => {
                    i += run.chars().count();
                    out.push_str(&run);
                    last_initialism = true;
                    last_upper = true;
                    last_lower_or_digit = false;
                }
                None => {
                    i += 1;
                    out.push(c);
                    last_initialism = false;
                    last_upper = c.is_uppercase();
                    last_lower_or_digit = c.is_lowercase() || c.is_numeric();
                }
            }
        }

        collapse_underscores(&out.to_lowercase())
    }

    /// `an_identifier` → `AnIdentifier`, `user_id` → `UserID`.
    ///
    /// The input is cleaned with [`to_identifier`] first, so leading digits,
    /// stray punctuation and repeated separators never reach the output.
    pub fn to_camel(&self, name: &str) -> String {
        to_identifier(name)
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let upper = word.to_uppercase();
                if self.set.contains(&upper) {
                    upper
                } else {
                    title_case(word)
                }
            })
            .collect()
    }

    /// Re-case an identifier that may already be camel-cased.
    pub fn force_camel(&self, name: &str) -> String {
        self.to_camel(&self.to_snake(name))
    }

    /// Like [`force_camel`](Self::force_camel) but with a lowercase first word
    /// (`AnIdentifier` → `anIdentifier`).
    pub fn force_lower_camel(&self, name: &str) -> String {
        let snake = self.to_snake(name);
        let camel = self.to_camel(&snake);
        let first = to_identifier(&snake)
            .split('_')
            .next()
            .map(str::len)
            .unwrap_or(0);
        match camel.get(..first) {
            Some(head) => format!("{}{}", head.to_lowercase(), &camel[first..]),
            None => camel,
        }
    }

    /// Singularize the last `_` segment, then camel-case: `user_accounts` → `UserAccount`.
    pub fn singularize(&self, name: &str) -> String {
        let singular = match name.rsplit_once('_') {
            Some((head, last)) => format!("{head}_{}", singular(last)),
            None => singular(name),
        };
        self.to_camel(&singular)
    }
}

/// Clean `s` so it is usable as an identifier.
///
/// Invalid characters become `_`, underscore runs collapse to one, leading
/// digits/underscores and trailing underscores are removed. Case is untouched.
pub fn to_identifier(s: &str) -> String {
    let replaced: String = s
        .trim()
        .chars()
        .map(|c| {
            if c == '_' || c.is_alphanumeric() {
                c
            } else {
                '_'
            }
        })
        .collect();

    collapse_underscores(&replaced)
        .trim_start_matches(|c: char| c == '_' || c.is_ascii_digit())
        .trim_end_matches('_')
        .to_string()
}

/// Plural form of an English word, preserving its case: `Author` → `Authors`.
pub fn plural(word: &str) -> String {
    pluralizer::pluralize(word, 2, false)
}

/// Singular form of an English word, preserving its case: `books` → `book`.
pub fn singular(word: &str) -> String {
    pluralizer::pluralize(word, 1, false)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if !(c == '_' && out.ends_with('_')) {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ini() -> Initialisms {
        Initialisms::default()
    }

    #[test]
    fn camel_to_snake() {
        let ini = ini();
        assert_eq!(ini.to_snake(""), "");
        assert_eq!(ini.to_snake("AnIdentifier"), "an_identifier");
        assert_eq!(ini.to_snake("UserID"), "user_id");
        assert_eq!(ini.to_snake("XMLHttpRequest"), "xml_http_request");
        assert_eq!(ini.to_snake("APIKey"), "api_key");
        assert_eq!(ini.to_snake("userAPI"), "user_api");
        assert_eq!(ini.to_snake("Order2Item"), "order2_item");
        assert_eq!(ini.to_snake("already_snake"), "already_snake");
        assert_eq!(ini.to_snake("Double__Underscore"), "double_underscore");
    }

    #[test]
    fn longest_initialism_wins() {
        let ini = ini();
        let chars: Vec<char> = "HTTPSConn".chars().collect();
        assert_eq!(ini.peek(&chars).as_deref(), Some("HTTPS"));
        let chars: Vec<char> = "HTTPServer".chars().collect();
        // HTTPS is registered and the run is uppercase through the S
        assert_eq!(ini.peek(&chars).as_deref(), Some("HTTPS"));
        let chars: Vec<char> = "Id".chars().collect();
        assert_eq!(ini.peek(&chars), None);
    }

    #[test]
    fn snake_to_camel() {
        let ini = ini();
        assert_eq!(ini.to_camel(""), "");
        assert_eq!(ini.to_camel("an_identifier"), "AnIdentifier");
        assert_eq!(ini.to_camel("user_id"), "UserID");
        assert_eq!(ini.to_camel("api_url"), "APIURL");
        assert_eq!(ini.to_camel("SHOUTING_NAME"), "ShoutingName");
        assert_eq!(ini.to_camel("__2fa__secret__"), "FaSecret");
        assert_eq!(ini.to_camel("first name"), "FirstName");
    }

    #[test]
    fn snake_is_stable_and_camel_round_trips() {
        let ini = ini();
        for name in ["UserID", "XMLHttpRequest", "createdAt", "order_items", "HTTPSProxy"] {
            let once = ini.to_snake(name);
            assert_eq!(ini.to_snake(&once), once, "to_snake not stable for {name}");
        }
        for name in ["UserID", "CreatedAt", "APIKey", "OrderItem"] {
            assert_eq!(ini.to_camel(&ini.to_snake(name)), name);
        }
    }

    #[test]
    fn custom_initialisms() {
        let mut ini = Initialisms::empty();
        assert_eq!(ini.to_camel("user_id"), "UserId");
        ini.add("id").unwrap();
        assert_eq!(ini.to_camel("user_id"), "UserID");
        assert_eq!(ini.to_snake("UserID"), "user_id");

        let ini = Initialisms::new(["SKU", "EAN"]).unwrap();
        assert_eq!(ini.to_camel("product_sku"), "ProductSKU");
    }

    #[test]
    fn short_initialism_is_rejected() {
        let mut ini = ini();
        assert!(matches!(ini.add("X"), Err(Error::InvalidInitialism(s)) if s == "X"));
        assert!(Initialisms::new(["OK", ""]).is_err());
    }

    #[test]
    fn identifiers() {
        assert_eq!(to_identifier("  9lives "), "lives");
        assert_eq!(to_identifier("a--b"), "a_b");
        assert_eq!(to_identifier("_x_"), "x");
        assert_eq!(to_identifier("Mixed.Case"), "Mixed_Case");
    }

    #[test]
    fn force_camel_variants() {
        let ini = ini();
        assert_eq!(ini.force_camel("userId"), "UserID");
        assert_eq!(ini.force_lower_camel("UserAccount"), "userAccount");
        assert_eq!(ini.force_lower_camel("IDToken"), "idToken");
    }

    #[test]
    fn singularize_last_segment() {
        let ini = ini();
        assert_eq!(ini.singularize("books"), "Book");
        assert_eq!(ini.singularize("book_tags"), "BookTag");
        assert_eq!(ini.singularize("user_accounts"), "UserAccount");
        assert_eq!(plural("Author"), "Authors");
    }
}
