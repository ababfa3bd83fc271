use std::collections::HashMap;

/// Maps caller-facing product aliases to the ids the store knows.
#[derive(Debug, Clone, Default)]
pub struct ProductIdMapper {
    aliases: HashMap<String, String>,
}

impl ProductIdMapper {
    /// Replaces the whole alias table; earlier aliases are forgotten.
    pub fn set_aliases(&mut self, aliases: HashMap<String, String>) {
        self.aliases = aliases;
    }

    /// Returns the real id for `product_id`, or `product_id` itself when it is
    /// not an alias.
    pub fn resolve<'a>(&'a self, product_id: &'a str) -> &'a str {
        self.aliases
            .get(product_id)
            .map(String::as_str)
            .unwrap_or(product_id)
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }
}
